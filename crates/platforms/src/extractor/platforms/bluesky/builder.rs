use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::{
    config::{Endpoints, PlatformFlags},
    extractor::{
        error::ResolveError,
        platform_extractor::{Extractor, PlatformResolver},
        platforms::bluesky::models::{EmbedView, GetPostsResponse, PostView, ResolveHandleResponse},
        utils::ensure_success,
    },
    matcher::{DetectedLink, LinkTarget, Platform},
    media::{Caption, Resolution, ResolvedMedia, extension_for_mime, mime_from_url},
};

const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

pub struct Bluesky {
    extractor: Extractor,
    handle: String,
    post_id: String,
    api_base: String,
}

impl Bluesky {
    pub fn new(link: &DetectedLink, client: Client, endpoints: &Endpoints) -> Self {
        let (handle, post_id) = match &link.target {
            LinkTarget::Bluesky { handle, post_id } => (handle.clone(), post_id.clone()),
            _ => (String::new(), String::new()),
        };
        let mut extractor = Extractor::new(Platform::Bluesky, link.normalized_url.clone(), client);
        extractor.add_header_typed(reqwest::header::ACCEPT, "application/json");

        Self {
            extractor,
            handle,
            post_id,
            api_base: endpoints.bluesky_api.clone(),
        }
    }

    async fn resolve_did(&self) -> Result<String, ResolveError> {
        if self.handle.starts_with("did:") {
            return Ok(self.handle.clone());
        }

        let url = format!("{}/xrpc/com.atproto.identity.resolveHandle", self.api_base);
        let response = self
            .extractor
            .get(&url)
            .query(&[("handle", self.handle.as_str())])
            .send()
            .await?;
        let body = ensure_success(response)?.text().await?;
        let resolved: ResolveHandleResponse = serde_json::from_str(&body)?;
        if resolved.did.is_empty() {
            return Err(ResolveError::missing("did"));
        }

        info!(handle = %self.handle, did = %resolved.did, "Resolved Bluesky handle");
        Ok(resolved.did)
    }

    async fn fetch_post(&self, did: &str) -> Result<PostView, ResolveError> {
        let url = format!("{}/xrpc/app.bsky.feed.getPosts", self.api_base);
        let uri = format!("at://{did}/app.bsky.feed.post/{}", self.post_id);
        let response = self
            .extractor
            .get(&url)
            .query(&[("uris", uri.as_str())])
            .send()
            .await?;
        let body = ensure_success(response)?.text().await?;
        let posts: GetPostsResponse = serde_json::from_str(&body)?;

        posts
            .posts
            .into_iter()
            .next()
            .ok_or_else(|| ResolveError::EmptyResult(format!("no post found for {uri}")))
    }

    fn image_mime(url: &str) -> &'static str {
        mime_from_url(url).unwrap_or(DEFAULT_IMAGE_MIME)
    }

    fn media_for_embed(
        post_id: &str,
        embed: &EmbedView,
        flags: &PlatformFlags,
    ) -> Vec<ResolvedMedia> {
        let mut media = Vec::new();

        match embed.media() {
            EmbedView::Images { images } if flags.image => {
                for (index, image) in images.iter().enumerate() {
                    let Some(url) = image.best_url() else {
                        debug!(post_id, index, "Bluesky image has no url, skipping");
                        continue;
                    };
                    let mime = Self::image_mime(url);
                    let ext = extension_for_mime(mime).unwrap_or(".jpg");
                    debug!(post_id, index, alt = ?image.alt, "Bluesky image");
                    media.push(ResolvedMedia::image(
                        url,
                        mime,
                        format!("{post_id}_image_{}{ext}", index + 1),
                    ));
                }
            }
            EmbedView::Video {
                playlist,
                thumbnail,
                alt,
            } => {
                debug!(post_id, playlist = %playlist, thumbnail = ?thumbnail, alt = ?alt, "Bluesky video");
                if flags.video {
                    media.push(ResolvedMedia::hls_video(
                        playlist.as_str(),
                        format!("{post_id}_video.mp4"),
                    ));
                }
                if flags.thumbnail
                    && let Some(thumbnail) = thumbnail
                {
                    media.push(ResolvedMedia::image(
                        thumbnail.as_str(),
                        Self::image_mime(thumbnail),
                        format!("{post_id}_thumbnail.jpg"),
                    ));
                }
            }
            _ => {}
        }

        media
    }
}

#[async_trait]
impl PlatformResolver for Bluesky {
    fn get_extractor(&self) -> &Extractor {
        &self.extractor
    }

    async fn resolve(&self, flags: &PlatformFlags) -> Result<Resolution, ResolveError> {
        if self.handle.is_empty() || self.post_id.is_empty() {
            return Err(ResolveError::InvalidUrl(self.extractor.url.clone()));
        }

        let did = self.resolve_did().await?;
        let post = self.fetch_post(&did).await?;

        let text = post.record.text.trim();
        let caption = (flags.info && !text.is_empty()).then(|| Caption::plain(text));
        let media = post
            .embed
            .as_ref()
            .map(|embed| Self::media_for_embed(&self.post_id, embed, flags))
            .unwrap_or_default();

        Ok(Resolution::new(caption, media))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::LinkMatcher;
    use crate::media::{MediaKind, MediaSource};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VIDEO_POST: &str = r#"{ "posts": [ {
        "uri": "at://did:plc:abc123/app.bsky.feed.post/3kvideo",
        "record": { "$type": "app.bsky.feed.post", "text": "look at this" },
        "embed": {
            "$type": "app.bsky.embed.video#view",
            "cid": "bafyvideo",
            "playlist": "https://video.bsky.app/watch/did%3Aplc%3Aabc123/bafyvideo/playlist.m3u8",
            "thumbnail": "https://video.bsky.app/watch/did%3Aplc%3Aabc123/bafyvideo/thumbnail.jpg",
            "alt": "a clip"
        }
    } ] }"#;

    fn link(text: &str) -> DetectedLink {
        LinkMatcher::new().find_links(text).remove(0)
    }

    #[test]
    fn video_and_thumbnail_are_separate_media() {
        let post: GetPostsResponse = serde_json::from_str(VIDEO_POST).unwrap();
        let embed = post.posts[0].embed.as_ref().unwrap();

        let media = Bluesky::media_for_embed("3kvideo", embed, &PlatformFlags::all());

        assert_eq!(media.len(), 2);
        assert_eq!(media[0].kind, MediaKind::Video);
        assert!(matches!(media[0].source, MediaSource::HlsManifest(_)));
        assert_eq!(media[0].file_name, "3kvideo_video.mp4");
        assert_eq!(media[1].kind, MediaKind::Image);
        assert!(matches!(media[1].source, MediaSource::DirectUrl(_)));
        assert_eq!(media[1].mime_type, "image/jpeg");
        assert_eq!(media[1].file_name, "3kvideo_thumbnail.jpg");
    }

    #[test]
    fn images_prefer_fullsize_and_get_distinct_names() {
        let embed: EmbedView = serde_json::from_str(
            r#"{ "$type": "app.bsky.embed.images#view", "images": [
                { "thumb": "https://cdn.bsky.app/img/feed_thumbnail/plain/d/a@jpeg",
                  "fullsize": "https://cdn.bsky.app/img/feed_fullsize/plain/d/a@jpeg", "alt": "" },
                { "thumb": "https://cdn.bsky.app/img/feed_thumbnail/plain/d/b@png" },
                { "alt": "nothing here" }
            ] }"#,
        )
        .unwrap();

        let media = Bluesky::media_for_embed("3kimg", &embed, &PlatformFlags::default());

        assert_eq!(media.len(), 2);
        assert_eq!(
            media[0].source.url(),
            "https://cdn.bsky.app/img/feed_fullsize/plain/d/a@jpeg"
        );
        assert_eq!(media[0].file_name, "3kimg_image_1.jpg");
        assert_eq!(media[1].mime_type, "image/png");
        assert_eq!(media[1].file_name, "3kimg_image_2.png");
    }

    #[tokio::test]
    async fn resolves_handle_then_fetches_post() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/xrpc/com.atproto.identity.resolveHandle"))
            .and(query_param("handle", "alice.bsky.social"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{ "did": "did:plc:abc123" }"#),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/xrpc/app.bsky.feed.getPosts"))
            .and(query_param(
                "uris",
                "at://did:plc:abc123/app.bsky.feed.post/3kvideo",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string(VIDEO_POST))
            .expect(1)
            .mount(&server)
            .await;

        let bluesky = Bluesky::new(
            &link("https://bsky.app/profile/alice.bsky.social/post/3kvideo"),
            Client::new(),
            &Endpoints::rooted_at(&server.uri()),
        );
        let resolution = bluesky.resolve(&PlatformFlags::default()).await.unwrap();

        assert_eq!(resolution.caption, Some(Caption::plain("look at this")));
        // thumbnail is off by default
        assert_eq!(resolution.media.len(), 1);
        assert!(resolution.media[0].source.is_hls());
    }

    #[tokio::test]
    async fn did_handles_skip_resolution() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/xrpc/com.atproto.identity.resolveHandle"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/xrpc/app.bsky.feed.getPosts"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{ "posts": [ { "record": { "text": "" } } ] }"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let bluesky = Bluesky::new(
            &link("https://bsky.app/profile/did:plc:abc123/post/3ktext"),
            Client::new(),
            &Endpoints::rooted_at(&server.uri()),
        );
        let resolution = bluesky.resolve(&PlatformFlags::all()).await.unwrap();
        assert!(resolution.is_empty());
    }

    #[tokio::test]
    async fn missing_post_is_an_empty_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/xrpc/app.bsky.feed.getPosts"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{ "posts": [] }"#))
            .mount(&server)
            .await;

        let bluesky = Bluesky::new(
            &link("https://bsky.app/profile/did:plc:abc123/post/3kgone"),
            Client::new(),
            &Endpoints::rooted_at(&server.uri()),
        );
        let err = bluesky.resolve(&PlatformFlags::all()).await.unwrap_err();
        assert!(matches!(err, ResolveError::EmptyResult(_)));
    }
}
