use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ResolveHandleResponse {
    pub did: String,
}

#[derive(Debug, Deserialize)]
pub struct GetPostsResponse {
    #[serde(default)]
    pub posts: Vec<PostView>,
}

#[derive(Debug, Deserialize)]
pub struct PostView {
    #[serde(default)]
    pub record: PostRecord,
    #[serde(default)]
    pub embed: Option<EmbedView>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PostRecord {
    #[serde(default)]
    pub text: String,
}

/// Hydrated embed of a post, discriminated by its lexicon `$type`.
#[derive(Debug, Deserialize)]
#[serde(tag = "$type")]
pub enum EmbedView {
    #[serde(rename = "app.bsky.embed.images#view")]
    Images { images: Vec<ImageView> },
    #[serde(rename = "app.bsky.embed.video#view")]
    Video {
        playlist: String,
        #[serde(default)]
        thumbnail: Option<String>,
        #[serde(default)]
        alt: Option<String>,
    },
    /// A quote post carrying its own media; only the media part is used.
    #[serde(rename = "app.bsky.embed.recordWithMedia#view")]
    RecordWithMedia { media: Box<EmbedView> },
    /// External cards, plain quotes and anything newer.
    #[serde(other)]
    Other,
}

impl EmbedView {
    /// The embed that actually carries media, unwrapping quote posts.
    pub fn media(&self) -> &EmbedView {
        match self {
            EmbedView::RecordWithMedia { media } => media.media(),
            other => other,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ImageView {
    #[serde(default)]
    pub fullsize: Option<String>,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

impl ImageView {
    pub fn best_url(&self) -> Option<&str> {
        self.fullsize.as_deref().or(self.thumb.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_embed_types_are_tolerated() {
        let json = r#"{ "record": { "text": "hi" }, "embed": {
            "$type": "app.bsky.embed.external#view",
            "external": { "uri": "https://example.com", "title": "t", "description": "d" }
        } }"#;
        let post: PostView = serde_json::from_str(json).unwrap();
        assert!(matches!(post.embed, Some(EmbedView::Other)));
    }

    #[test]
    fn record_with_media_unwraps_to_images() {
        let json = r#"{
            "$type": "app.bsky.embed.recordWithMedia#view",
            "record": { "record": {} },
            "media": {
                "$type": "app.bsky.embed.images#view",
                "images": [ { "thumb": "https://cdn.bsky.app/t@jpeg" } ]
            }
        }"#;
        let embed: EmbedView = serde_json::from_str(json).unwrap();
        match embed.media() {
            EmbedView::Images { images } => {
                assert_eq!(images[0].best_url(), Some("https://cdn.bsky.app/t@jpeg"))
            }
            other => panic!("unexpected embed {other:?}"),
        }
    }
}
