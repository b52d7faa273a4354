use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

/// One element of the array returned by `<permalink>.json`; the first element
/// holds the post, the second its comments.
#[derive(Debug, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
pub struct Thing {
    pub data: PostData,
}

#[derive(Debug, Deserialize)]
pub struct PostData {
    pub subreddit_name_prefixed: String,
    pub title: String,
    /// Fullname of the post, e.g. `t3_1abcdef`.
    pub name: String,
    #[serde(default)]
    pub url_overridden_by_dest: Option<String>,
    #[serde(default)]
    pub is_gallery: Option<bool>,
    #[serde(default)]
    pub media_metadata: Option<MediaMetadataMap>,
    #[serde(default)]
    pub gallery_data: Option<GalleryData>,
    #[serde(default)]
    pub secure_media: Option<SecureMedia>,
    #[serde(default)]
    pub preview: Option<Preview>,
}

impl PostData {
    pub fn is_gallery(&self) -> bool {
        self.is_gallery.unwrap_or(false)
    }

    /// Video fallback URL, preferring the hosted video over the preview clip.
    pub fn video_fallback_url(&self) -> Option<&str> {
        self.secure_media
            .as_ref()
            .and_then(|m| m.reddit_video.as_ref())
            .or_else(|| {
                self.preview
                    .as_ref()
                    .and_then(|p| p.reddit_video_preview.as_ref())
            })
            .map(|v| v.fallback_url.as_str())
    }

    /// Gallery media ids in display order. Falls back to the order of the
    /// `media_metadata` object when `gallery_data` is missing.
    pub fn gallery_media_ids(&self) -> Vec<&str> {
        match (&self.gallery_data, &self.media_metadata) {
            (Some(gallery), _) => gallery
                .items
                .iter()
                .map(|item| item.media_id.as_str())
                .collect(),
            (None, Some(metadata)) => metadata.ids().collect(),
            (None, None) => Vec::new(),
        }
    }
}

/// `media_metadata` entries, kept in document order.
#[derive(Debug, Default)]
pub struct MediaMetadataMap(Vec<(String, MediaMetadata)>);

impl MediaMetadataMap {
    pub fn get(&self, media_id: &str) -> Option<&MediaMetadata> {
        self.0
            .iter()
            .find(|(id, _)| id == media_id)
            .map(|(_, metadata)| metadata)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(id, _)| id.as_str())
    }
}

impl<'de> Deserialize<'de> for MediaMetadataMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = MediaMetadataMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of media id to metadata")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, MediaMetadata>()? {
                    entries.push(entry);
                }
                Ok(MediaMetadataMap(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

#[derive(Debug, Deserialize)]
pub struct MediaMetadata {
    #[serde(default)]
    pub status: Option<String>,
    /// MIME type, e.g. `image/jpg`.
    #[serde(rename = "m", default)]
    pub mime: Option<String>,
    /// Largest available rendition.
    #[serde(rename = "s", default)]
    pub source: Option<MediaMetadataSource>,
}

#[derive(Debug, Deserialize)]
pub struct MediaMetadataSource {
    #[serde(default)]
    pub u: Option<String>,
    #[serde(default)]
    pub gif: Option<String>,
}

impl MediaMetadataSource {
    pub fn url(&self) -> Option<&str> {
        self.u.as_deref().or(self.gif.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct GalleryData {
    #[serde(default)]
    pub items: Vec<GalleryItem>,
}

#[derive(Debug, Deserialize)]
pub struct GalleryItem {
    pub media_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SecureMedia {
    #[serde(default)]
    pub reddit_video: Option<RedditVideo>,
}

#[derive(Debug, Deserialize)]
pub struct Preview {
    #[serde(default)]
    pub reddit_video_preview: Option<RedditVideo>,
}

#[derive(Debug, Deserialize)]
pub struct RedditVideo {
    pub fallback_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_clip_is_used_when_secure_media_is_null() {
        let json = r#"{
            "subreddit_name_prefixed": "r/gifs",
            "title": "t",
            "name": "t3_aaaaaaa",
            "secure_media": null,
            "preview": {
                "images": [],
                "reddit_video_preview": { "fallback_url": "https://v.redd.it/p/DASH_480.mp4" }
            }
        }"#;
        let post: PostData = serde_json::from_str(json).unwrap();
        assert_eq!(
            post.video_fallback_url(),
            Some("https://v.redd.it/p/DASH_480.mp4")
        );
        assert!(!post.is_gallery());
    }

    #[test]
    fn gallery_ids_follow_gallery_data_order() {
        let json = r#"{
            "subreddit_name_prefixed": "r/pics",
            "title": "t",
            "name": "t3_bbbbbbb",
            "is_gallery": true,
            "gallery_data": { "items": [ { "media_id": "zz" }, { "media_id": "aa" } ] },
            "media_metadata": { "aa": {}, "zz": {} }
        }"#;
        let post: PostData = serde_json::from_str(json).unwrap();
        assert_eq!(post.gallery_media_ids(), vec!["zz", "aa"]);
    }

    #[test]
    fn gallery_ids_without_gallery_data_keep_metadata_order() {
        let json = r#"{
            "subreddit_name_prefixed": "r/pics",
            "title": "t",
            "name": "t3_ccccccc",
            "is_gallery": true,
            "media_metadata": {
                "zz": { "status": "valid" },
                "mm": { "status": "valid" },
                "aa": { "status": "failed" }
            }
        }"#;
        let post: PostData = serde_json::from_str(json).unwrap();
        assert_eq!(post.gallery_media_ids(), vec!["zz", "mm", "aa"]);

        let metadata = post.media_metadata.as_ref().unwrap();
        assert_eq!(metadata.get("aa").unwrap().status.as_deref(), Some("failed"));
        assert!(metadata.get("missing").is_none());
    }
}
