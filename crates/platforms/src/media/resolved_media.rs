use std::fmt;

use serde::{Deserialize, Serialize};

use super::MediaKind;

/// Where the bytes of a [`ResolvedMedia`] come from.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// A single GET returns the complete asset.
    DirectUrl(String),
    /// An HLS playlist that must be reconstructed before delivery.
    HlsManifest(String),
}

impl MediaSource {
    pub fn url(&self) -> &str {
        match self {
            MediaSource::DirectUrl(url) | MediaSource::HlsManifest(url) => url,
        }
    }

    pub fn is_hls(&self) -> bool {
        matches!(self, MediaSource::HlsManifest(_))
    }
}

/// A media asset a resolver found for a link.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
    pub kind: MediaKind,
    pub mime_type: String,
    pub source: MediaSource,
    // suggested file name, including extension
    pub file_name: String,
}

impl ResolvedMedia {
    pub fn new(
        kind: MediaKind,
        mime_type: impl Into<String>,
        source: MediaSource,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            mime_type: mime_type.into(),
            source,
            file_name: file_name.into(),
        }
    }

    pub fn image(
        url: impl Into<String>,
        mime_type: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self::new(
            MediaKind::Image,
            mime_type,
            MediaSource::DirectUrl(url.into()),
            file_name,
        )
    }

    pub fn video(
        url: impl Into<String>,
        mime_type: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self::new(
            MediaKind::Video,
            mime_type,
            MediaSource::DirectUrl(url.into()),
            file_name,
        )
    }

    /// A video published as an HLS playlist; the reconstructed file is MPEG-TS/MP4
    /// segments concatenated, announced as `video/mp4`.
    pub fn hls_video(playlist_url: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self::new(
            MediaKind::Video,
            "video/mp4",
            MediaSource::HlsManifest(playlist_url.into()),
            file_name,
        )
    }
}

impl fmt::Display for ResolvedMedia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let via = if self.source.is_hls() { " (hls)" } else { "" };
        write!(
            f,
            "{} {} [{}]{} <- {}",
            self.kind.as_str(),
            self.file_name,
            self.mime_type,
            via,
            self.source.url()
        )
    }
}
