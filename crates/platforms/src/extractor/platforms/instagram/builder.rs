use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tracing::debug;

use crate::{
    config::{Endpoints, PlatformFlags},
    extractor::{
        error::ResolveError,
        platform_extractor::{Extractor, PlatformResolver},
        platforms::instagram::models::{GraphQlResponse, ShortcodeMedia},
        utils::{ensure_success, escape_html},
    },
    matcher::{DetectedLink, InstagramKind, LinkTarget, Platform},
    media::{Caption, Resolution, ResolvedMedia},
};

static HASHTAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^\w&])#(\w+)").unwrap());
static MENTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^\w])@(\w(?:[\w.]{0,28}\w)?)").unwrap());

/// Persisted query returning a single post by shortcode.
const POST_DOC_ID: &str = "8845758582119845";
const IG_APP_ID: &str = "936619743392459";

pub struct Instagram {
    extractor: Extractor,
    kind: Option<InstagramKind>,
    shortcode: String,
    graphql_url: String,
}

impl Instagram {
    pub fn new(link: &DetectedLink, client: Client, endpoints: &Endpoints) -> Self {
        let (kind, shortcode) = match &link.target {
            LinkTarget::Instagram {
                kind, shortcode, ..
            } => (Some(*kind), shortcode.clone()),
            _ => (None, String::new()),
        };

        let mut extractor =
            Extractor::new(Platform::Instagram, link.normalized_url.clone(), client);
        extractor.set_origin_and_referer(&endpoints.instagram_base);
        extractor.add_header_str("X-IG-App-ID", IG_APP_ID);
        extractor.add_header_typed(reqwest::header::ACCEPT, "*/*");

        Self {
            extractor,
            kind,
            shortcode,
            graphql_url: format!("{}/graphql/query", endpoints.instagram_base),
        }
    }

    async fn fetch_post(&self) -> Result<ShortcodeMedia, ResolveError> {
        let variables = serde_json::json!({ "shortcode": self.shortcode }).to_string();
        let form = [
            ("doc_id", POST_DOC_ID),
            ("variables", variables.as_str()),
            ("server_timestamps", "true"),
        ];

        let response = self
            .extractor
            .post(&self.graphql_url)
            .form(&form)
            .send()
            .await?;
        let body = ensure_success(response)?.text().await?;
        let response: GraphQlResponse = serde_json::from_str(&body)?;

        response.into_media().ok_or_else(|| {
            ResolveError::EmptyResult(format!(
                "instagram post {} not found or not public",
                self.shortcode
            ))
        })
    }

    /// Hashtags of a caption, lowercased, every occurrence in order.
    fn hashtags(text: &str) -> Vec<String> {
        HASHTAG_REGEX
            .captures_iter(text)
            .map(|caps| caps[1].to_lowercase())
            .collect()
    }

    fn mentions(text: &str) -> Vec<String> {
        MENTION_REGEX
            .captures_iter(text)
            .map(|caps| caps[1].to_lowercase())
            .collect()
    }

    fn caption(post: &ShortcodeMedia) -> Caption {
        let text = post.caption_text();
        let lines = [
            ("Username", post.owner.username.clone()),
            ("Caption", text.to_string()),
            ("Hashtags", Self::hashtags(text).join(", ")),
            ("Mentions", Self::mentions(text).join(", ")),
            ("Likes", post.likes().to_string()),
            ("Comments", post.comments().to_string()),
        ];

        let body = lines
            .iter()
            .map(|(label, value)| format!("{label}: {value}"))
            .collect::<Vec<_>>()
            .join("\n");
        let html = lines
            .iter()
            .map(|(label, value)| format!("{label}: {}", escape_html(value).replace('\n', "<br>")))
            .collect::<Vec<_>>()
            .join("<br>");

        Caption::with_html(body, format!("<p>{html}</p>"))
    }

    fn media_for_post(post: &ShortcodeMedia, flags: &PlatformFlags) -> Vec<ResolvedMedia> {
        let mut media = Vec::new();

        if (post.is_video && flags.thumbnail) || (!post.is_video && flags.image) {
            media.push(ResolvedMedia::image(
                post.display_url.as_str(),
                "image/jpeg",
                format!("{}.jpg", post.shortcode),
            ));
        }

        if post.is_video && flags.video {
            match &post.video_url {
                Some(video_url) => media.push(ResolvedMedia::video(
                    video_url.as_str(),
                    "video/mp4",
                    format!("{}.mp4", post.shortcode),
                )),
                None => debug!(shortcode = %post.shortcode, "Video post without video_url"),
            }
        }

        media
    }
}

#[async_trait]
impl PlatformResolver for Instagram {
    fn get_extractor(&self) -> &Extractor {
        &self.extractor
    }

    async fn resolve(&self, flags: &PlatformFlags) -> Result<Resolution, ResolveError> {
        match self.kind {
            None => return Err(ResolveError::InvalidUrl(self.extractor.url.clone())),
            Some(InstagramKind::Story) => {
                return Err(ResolveError::Unsupported(format!(
                    "instagram stories ({})",
                    self.extractor.url
                )));
            }
            Some(_) => {}
        }

        let post = self.fetch_post().await?;
        debug!(shortcode = %post.shortcode, is_video = post.is_video, "Instagram post fetched");

        let caption = flags.info.then(|| Self::caption(&post));
        Ok(Resolution::new(caption, Self::media_for_post(&post, flags)))
    }
}
