//! Link detection and per-platform media resolution.
//!
//! [`LinkMatcher`] finds post links in free-form text, [`ResolverFactory`]
//! turns each [`DetectedLink`] into a platform resolver, and the resolver
//! produces a [`Resolution`] describing the caption and media to deliver.

pub mod config;
pub mod extractor;
pub mod matcher;
pub mod media;

pub use config::{Endpoints, FeatureFlags, PlatformFlags};
pub use extractor::default::{DEFAULT_TIMEOUT, DEFAULT_UA, build_client, default_client};
pub use extractor::error::ResolveError;
pub use extractor::factory::{REDDIT_USER_AGENT, ResolverFactory};
pub use extractor::platform_extractor::PlatformResolver;
pub use matcher::{DetectedLink, LinkMatcher, LinkTarget, Platform};
pub use media::{Caption, MediaKind, MediaSource, Resolution, ResolvedMedia};
