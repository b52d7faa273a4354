//! Message relay: finds post links in inbound text, resolves them and hands
//! captions and media to a [`MediaSink`].

pub mod config;
pub mod error;
pub mod logging;
pub mod message;
pub mod pipeline;
pub mod sink;

pub use config::{HlsSettings, HttpSettings, RelayConfig};
pub use error::RelayError;
pub use message::{InboundMessage, MessageKind};
pub use pipeline::{MessageReport, Relay};
pub use sink::{MediaLocator, MediaSink, PostContent, SinkError};
