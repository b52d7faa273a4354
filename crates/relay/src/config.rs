use std::fs;
use std::path::Path;
use std::time::Duration;

use hls_stitch::StitchConfig;
use mediagrab_platforms::{DEFAULT_UA, Endpoints, FeatureFlags, REDDIT_USER_AGENT};
use serde::{Deserialize, Serialize};

use crate::error::RelayError;

/// Everything the relay needs, typically read from a `config.toml` owned by
/// the host. Every field has a default, so a partial file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Also handle notices (bot-style messages), not only plain text.
    pub respond_to_notice: bool,
    /// Messages starting with this prefix are commands and are ignored.
    pub command_prefix: String,
    pub flags: FeatureFlags,
    pub endpoints: Endpoints,
    pub http: HttpSettings,
    pub hls: HlsSettings,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            respond_to_notice: false,
            command_prefix: "!".to_string(),
            flags: FeatureFlags::default(),
            endpoints: Endpoints::default(),
            http: HttpSettings::default(),
            hls: HlsSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub reddit_user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: DEFAULT_UA.to_string(),
            reddit_user_agent: REDDIT_USER_AGENT.to_string(),
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HlsSettings {
    pub max_playlist_hops: usize,
    pub segment_concurrency: usize,
}

impl Default for HlsSettings {
    fn default() -> Self {
        let stitch = StitchConfig::default();
        Self {
            max_playlist_hops: stitch.max_playlist_hops,
            segment_concurrency: stitch.segment_concurrency,
        }
    }
}

impl HlsSettings {
    pub fn stitch_config(&self) -> StitchConfig {
        StitchConfig::default()
            .with_max_playlist_hops(self.max_playlist_hops)
            .with_segment_concurrency(self.segment_concurrency)
    }
}

impl RelayConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, RelayError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RelayError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediagrab_platforms::{Platform, PlatformFlags};

    #[test]
    fn empty_file_is_all_defaults() {
        let config = RelayConfig::from_toml_str("").unwrap();
        assert_eq!(config, RelayConfig::default());
        assert_eq!(config.command_prefix, "!");
        assert!(!config.flags.youtube.thumbnail);
    }

    #[test]
    fn partial_tables_override_only_what_they_name() {
        let config = RelayConfig::from_toml_str(
            r#"
            respond_to_notice = true

            [flags.reddit]
            video = false

            [flags.tiktok]
            enabled = false

            [endpoints]
            bluesky_api = "https://bsky.example"

            [hls]
            segment_concurrency = 8
            "#,
        )
        .unwrap();

        assert!(config.respond_to_notice);
        assert!(!config.flags.reddit.video);
        assert!(config.flags.reddit.image);
        assert!(!config.flags.for_platform(Platform::TikTok).enabled);
        assert_eq!(config.flags.instagram, PlatformFlags::default());
        assert_eq!(config.endpoints.bluesky_api, "https://bsky.example");
        assert_eq!(
            config.endpoints.reddit_base,
            Endpoints::default().reddit_base
        );
        assert_eq!(config.hls.stitch_config().segment_concurrency, 8);
        assert_eq!(config.hls.max_playlist_hops, 8);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = RelayConfig::from_toml_str("respond_to_notice = \"yes\"").unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = RelayConfig::load("/nonexistent/mediagrab/config.toml").unwrap_err();
        assert!(matches!(err, RelayError::Io(_)));
    }
}
