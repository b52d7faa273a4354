use serde::{Deserialize, Serialize};

use crate::matcher::Platform;

/// Per-platform switches. `enabled` gates resolution entirely; the others
/// select which kinds of output a resolver produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformFlags {
    pub enabled: bool,
    /// Caption / post information.
    pub info: bool,
    pub image: bool,
    pub video: bool,
    pub thumbnail: bool,
}

impl Default for PlatformFlags {
    fn default() -> Self {
        Self {
            enabled: true,
            info: true,
            image: true,
            video: true,
            thumbnail: false,
        }
    }
}

impl PlatformFlags {
    pub fn all() -> Self {
        Self {
            enabled: true,
            info: true,
            image: true,
            video: true,
            thumbnail: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub reddit: PlatformFlags,
    pub instagram: PlatformFlags,
    pub youtube: PlatformFlags,
    pub tiktok: PlatformFlags,
    pub bluesky: PlatformFlags,
}

impl FeatureFlags {
    pub fn for_platform(&self, platform: Platform) -> &PlatformFlags {
        match platform {
            Platform::Reddit => &self.reddit,
            Platform::Instagram => &self.instagram,
            Platform::YouTube => &self.youtube,
            Platform::TikTok => &self.tiktok,
            Platform::Bluesky => &self.bluesky,
        }
    }

    pub fn uniform(flags: PlatformFlags) -> Self {
        Self {
            reddit: flags,
            instagram: flags,
            youtube: flags,
            tiktok: flags,
            bluesky: flags,
        }
    }
}

/// Base URLs of every service the resolvers talk to.
///
/// All values are stored without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub reddit_base: String,
    /// Third-party service muxing Reddit's separate audio and video tracks.
    pub reddit_remux: String,
    pub youtube_oembed: String,
    pub youtube_thumbnail_base: String,
    pub instagram_base: String,
    /// Third-party TikTok download service (token page at `/`, search at `/search/`).
    pub tiktok_service: String,
    pub bluesky_api: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            reddit_base: "https://www.reddit.com".to_string(),
            reddit_remux: "https://sd.rapidsave.com/download.php".to_string(),
            youtube_oembed: "https://www.youtube.com/oembed".to_string(),
            youtube_thumbnail_base: "https://img.youtube.com".to_string(),
            instagram_base: "https://www.instagram.com".to_string(),
            tiktok_service: "https://ttdownloader.com".to_string(),
            bluesky_api: "https://public.api.bsky.app".to_string(),
        }
    }
}

impl Endpoints {
    /// Every endpoint rooted at `base`, for pointing the resolvers at a local server.
    pub fn rooted_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            reddit_base: base.to_string(),
            reddit_remux: format!("{base}/remux/download.php"),
            youtube_oembed: format!("{base}/oembed"),
            youtube_thumbnail_base: base.to_string(),
            instagram_base: base.to_string(),
            tiktok_service: format!("{base}/ttdownloader"),
            bluesky_api: base.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_flags_fall_back_to_defaults() {
        let flags: FeatureFlags =
            serde_json::from_str(r#"{ "reddit": { "video": false }, "tiktok": { "enabled": false } }"#)
                .unwrap();
        assert!(!flags.reddit.video);
        assert!(flags.reddit.image);
        assert!(!flags.for_platform(Platform::TikTok).enabled);
        assert_eq!(flags.bluesky, PlatformFlags::default());
    }

    #[test]
    fn rooted_endpoints_strip_trailing_slash() {
        let endpoints = Endpoints::rooted_at("http://127.0.0.1:9000/");
        assert_eq!(endpoints.bluesky_api, "http://127.0.0.1:9000");
        assert_eq!(endpoints.youtube_oembed, "http://127.0.0.1:9000/oembed");
    }
}
