use super::platform_extractor::PlatformResolver;
use crate::config::Endpoints;
use crate::extractor::platforms::{
    bluesky::Bluesky, instagram::Instagram, reddit::Reddit, tiktok::TikTok, youtube::YouTube,
};
use crate::matcher::{DetectedLink, LinkTarget};
use reqwest::Client;

/// Default user-agent for Reddit's JSON API, which rejects browser-like agents
/// from unauthenticated clients more aggressively than descriptive ones.
pub const REDDIT_USER_AGENT: &str = "mediagrab/0.1 (link preview relay)";

/// Creates the platform-specific resolver for a detected link.
///
/// Dispatch is a closed match over [`LinkTarget`], so every platform the
/// matcher can produce has exactly one resolver.
#[derive(Debug, Clone)]
pub struct ResolverFactory {
    client: Client,
    endpoints: Endpoints,
    reddit_user_agent: String,
}

impl ResolverFactory {
    pub fn new(client: Client, endpoints: Endpoints) -> Self {
        Self {
            client,
            endpoints,
            reddit_user_agent: REDDIT_USER_AGENT.to_string(),
        }
    }

    pub fn with_reddit_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.reddit_user_agent = user_agent.into();
        self
    }

    pub fn create_resolver(&self, link: &DetectedLink) -> Box<dyn PlatformResolver> {
        let client = self.client.clone();
        match &link.target {
            LinkTarget::Reddit { .. } => Box::new(Reddit::new(
                link,
                client,
                &self.endpoints,
                &self.reddit_user_agent,
            )),
            LinkTarget::Instagram { .. } => {
                Box::new(Instagram::new(link, client, &self.endpoints))
            }
            LinkTarget::YouTube { .. } => Box::new(YouTube::new(link, client, &self.endpoints)),
            LinkTarget::TikTok(_) => Box::new(TikTok::new(link, client, &self.endpoints)),
            LinkTarget::Bluesky { .. } => Box::new(Bluesky::new(link, client, &self.endpoints)),
        }
    }
}
