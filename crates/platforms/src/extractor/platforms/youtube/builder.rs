use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::{
    config::{Endpoints, PlatformFlags},
    extractor::{
        error::ResolveError,
        platform_extractor::{Extractor, PlatformResolver},
        platforms::youtube::models::OEmbed,
        utils::{ensure_success, escape_html},
    },
    matcher::{DetectedLink, LinkTarget, Platform},
    media::{Caption, Resolution, ResolvedMedia},
};

pub struct YouTube {
    extractor: Extractor,
    video_id: String,
    oembed_endpoint: String,
    thumbnail_base: String,
}

impl YouTube {
    pub fn new(link: &DetectedLink, client: Client, endpoints: &Endpoints) -> Self {
        let video_id = match &link.target {
            LinkTarget::YouTube { video_id } => video_id.clone(),
            _ => String::new(),
        };
        let mut extractor = Extractor::new(Platform::YouTube, link.normalized_url.clone(), client);
        extractor.add_header_typed(reqwest::header::ACCEPT, "application/json");

        Self {
            extractor,
            video_id,
            oembed_endpoint: endpoints.youtube_oembed.clone(),
            thumbnail_base: endpoints.youtube_thumbnail_base.clone(),
        }
    }

    /// Fetches the oEmbed document. This doubles as an existence check: private
    /// and removed videos answer with 401/404.
    async fn fetch_oembed(&self) -> Result<OEmbed, ResolveError> {
        let response = self
            .extractor
            .get(&self.oembed_endpoint)
            .query(&[("format", "json"), ("url", self.extractor.url.as_str())])
            .send()
            .await?;
        let body = ensure_success(response)?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn thumbnail(&self) -> ResolvedMedia {
        ResolvedMedia::image(
            format!("{}/vi/{}/hqdefault.jpg", self.thumbnail_base, self.video_id),
            "image/jpeg",
            format!("{}.jpg", self.video_id),
        )
    }
}

#[async_trait]
impl PlatformResolver for YouTube {
    fn get_extractor(&self) -> &Extractor {
        &self.extractor
    }

    async fn resolve(&self, flags: &PlatformFlags) -> Result<Resolution, ResolveError> {
        if self.video_id.is_empty() {
            return Err(ResolveError::InvalidUrl(self.extractor.url.clone()));
        }

        let oembed = self.fetch_oembed().await?;
        debug!(video_id = %self.video_id, title = %oembed.title, author = ?oembed.author_name, "YouTube oEmbed fetched");

        let caption = flags.info.then(|| {
            Caption::with_html(
                oembed.title.clone(),
                format!("<p><b>{}</b></p>", escape_html(&oembed.title)),
            )
        });
        let media = if flags.thumbnail {
            vec![self.thumbnail()]
        } else {
            Vec::new()
        };

        Ok(Resolution::new(caption, media))
    }
}
