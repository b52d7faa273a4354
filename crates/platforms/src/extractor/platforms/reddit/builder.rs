use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::{
    config::{Endpoints, PlatformFlags},
    extractor::{
        error::ResolveError,
        platform_extractor::{Extractor, PlatformResolver},
        platforms::reddit::models::{Listing, PostData},
        utils::{ensure_success, escape_html, strip_query},
    },
    matcher::{DetectedLink, Platform},
    media::{Caption, MediaKind, Resolution, ResolvedMedia, extension_for_mime, mime_from_url},
};

/// Resolution token of a DASH rendition, e.g. `DASH_720` in `.../DASH_720.mp4`.
static DASH_TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"DASH_\d+").unwrap());

const DASH_AUDIO_TOKEN: &str = "DASH_audio";
const DEFAULT_GALLERY_MIME: &str = "image/jpeg";

pub struct Reddit {
    extractor: Extractor,
    remux_endpoint: String,
}

impl Reddit {
    pub fn new(
        link: &DetectedLink,
        client: Client,
        endpoints: &Endpoints,
        user_agent: &str,
    ) -> Self {
        let url = format!("{}{}", endpoints.reddit_base, link.target.reddit_path());
        let mut extractor = Extractor::new(Platform::Reddit, url, client);
        extractor.add_header_typed(reqwest::header::USER_AGENT, user_agent);
        extractor.add_header_typed(reqwest::header::ACCEPT, "application/json, text/html;q=0.9");

        Self {
            extractor,
            remux_endpoint: endpoints.reddit_remux.clone(),
        }
    }

    /// Follows redirects from the link (share links only resolve this way) and
    /// returns the final permalink.
    async fn resolve_permalink(&self) -> Result<Url, ResolveError> {
        let redirect_error = |reason: String| ResolveError::RedirectResolution {
            url: self.extractor.url.clone(),
            reason,
        };

        let response = self
            .extractor
            .get(&self.extractor.url)
            .send()
            .await
            .map_err(|e| redirect_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(redirect_error(format!("HTTP {status}")));
        }

        let permalink = response.url().clone();
        debug!(from = %self.extractor.url, to = %permalink, "Reddit permalink resolved");
        Ok(permalink)
    }

    /// `<permalink>.json?limit=1`, with the permalink's own query and trailing
    /// slash dropped.
    fn listing_url(permalink: &Url) -> Url {
        let mut url = permalink.clone();
        url.set_query(None);
        url.set_fragment(None);
        let path = format!("{}.json", url.path().trim_end_matches('/'));
        url.set_path(&path);
        url.query_pairs_mut()
            .append_pair("limit", "1")
            .append_pair("raw_json", "1");
        url
    }

    async fn fetch_post(&self, listing_url: &Url) -> Result<PostData, ResolveError> {
        let response = self.extractor.get(listing_url.as_str()).send().await?;
        let body = ensure_success(response)?.text().await?;
        let listings: Vec<Listing> = serde_json::from_str(&body)?;

        listings
            .into_iter()
            .next()
            .and_then(|listing| listing.data.children.into_iter().next())
            .map(|thing| thing.data)
            .ok_or_else(|| ResolveError::missing("data.children[0]"))
    }

    fn caption(post: &PostData) -> Caption {
        let body = format!("{}: {}", post.subreddit_name_prefixed, post.title);
        let html = format!("<p><b>{}</b></p>", escape_html(&body));
        Caption::with_html(body, html)
    }

    /// Remux service URL combining a video track with its audio sibling.
    fn remux_url(remux_endpoint: &str, permalink: &str, video_url: &str) -> String {
        let audio_url = DASH_TOKEN_REGEX.replacen(video_url, 1, DASH_AUDIO_TOKEN);
        format!(
            "{remux_endpoint}?permalink={}&video_url={video_url}?source=fallback&audio_url={audio_url}?source=fallback",
            urlencoding::encode(permalink)
        )
    }

    fn gallery_media(post: &PostData) -> Result<Vec<ResolvedMedia>, ResolveError> {
        let metadata = post
            .media_metadata
            .as_ref()
            .ok_or_else(|| ResolveError::missing("media_metadata"))?;

        let mut media = Vec::new();
        for media_id in post.gallery_media_ids() {
            let Some(item) = metadata.get(media_id) else {
                warn!(media_id, "Gallery item has no metadata, skipping");
                continue;
            };
            if item.status.as_deref().is_some_and(|s| s != "valid") {
                debug!(media_id, status = ?item.status, "Gallery item not ready, skipping");
                continue;
            }
            let Some(source_url) = item.source.as_ref().and_then(|s| s.url()) else {
                warn!(media_id, "Gallery item has no source url, skipping");
                continue;
            };

            let url = source_url.replacen("preview", "i", 1);
            let mime = match item.mime.as_deref() {
                Some("image/jpg") => "image/jpeg".to_string(),
                Some(mime) => mime.to_string(),
                None => mime_from_url(&url)
                    .unwrap_or(DEFAULT_GALLERY_MIME)
                    .to_string(),
            };
            let ext = extension_for_mime(&mime).unwrap_or(".jpg");
            media.push(ResolvedMedia::image(url, mime, format!("{media_id}{ext}")));
        }

        if media.is_empty() {
            return Err(ResolveError::EmptyResult(format!(
                "gallery {} has no usable items",
                post.name
            )));
        }
        Ok(media)
    }

    /// Media descriptors for a post, gated by `flags`.
    ///
    /// Tried in order: a destination URL with a recognisable extension, a
    /// gallery, then a native video (remuxed with its audio track).
    fn media_for_post(
        post: &PostData,
        permalink: &str,
        flags: &PlatformFlags,
        remux_endpoint: &str,
    ) -> Result<Vec<ResolvedMedia>, ResolveError> {
        let Some(dest) = post.url_overridden_by_dest.as_deref() else {
            return Ok(Vec::new());
        };
        if !flags.image && !flags.video {
            return Ok(Vec::new());
        }

        if let Some(mime) = mime_from_url(dest) {
            let ext = extension_for_mime(mime).unwrap_or_default();
            let file_name = format!("{}{ext}", post.name);
            return Ok(match MediaKind::from_mime(mime) {
                Some(MediaKind::Image) if flags.image => {
                    vec![ResolvedMedia::image(dest, mime, file_name)]
                }
                Some(MediaKind::Video) if flags.video => {
                    vec![ResolvedMedia::video(dest, mime, file_name)]
                }
                Some(MediaKind::Image | MediaKind::Video) => Vec::new(),
                _ => {
                    return Err(ResolveError::UnknownMediaType {
                        url: dest.to_string(),
                        mime: mime.to_string(),
                    });
                }
            });
        }

        if post.is_gallery() {
            return if flags.image {
                Self::gallery_media(post)
            } else {
                Ok(Vec::new())
            };
        }

        let Some(fallback_url) = post.video_fallback_url() else {
            return Err(ResolveError::UnknownMediaType {
                url: dest.to_string(),
                mime: "unknown".to_string(),
            });
        };
        if !flags.video {
            return Ok(Vec::new());
        }

        let video_url = strip_query(fallback_url);
        let remuxed = Self::remux_url(remux_endpoint, permalink, video_url);
        debug!(video_url, remuxed = %remuxed, "Reddit video routed through remux service");
        Ok(vec![ResolvedMedia::video(
            remuxed,
            "video/mp4",
            format!("{}.mp4", post.name),
        )])
    }
}

#[async_trait]
impl PlatformResolver for Reddit {
    fn get_extractor(&self) -> &Extractor {
        &self.extractor
    }

    async fn resolve(&self, flags: &PlatformFlags) -> Result<Resolution, ResolveError> {
        let permalink = self.resolve_permalink().await?;
        let listing_url = Self::listing_url(&permalink);
        let post = self.fetch_post(&listing_url).await?;
        debug!(name = %post.name, subreddit = %post.subreddit_name_prefixed, "Reddit post fetched");

        let caption = flags.info.then(|| Self::caption(&post));
        let permalink = strip_query(permalink.as_str()).trim_end_matches('/');
        let media = Self::media_for_post(&post, permalink, flags, &self.remux_endpoint)?;

        Ok(Resolution::new(caption, media))
    }
}
