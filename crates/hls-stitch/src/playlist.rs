// Playlist classification: master playlists point at variants, media
// playlists list segments.

use m3u8_rs::{Playlist, parse_playlist_res};
use tracing::debug;
use url::Url;

use crate::error::StitchError;

/// A segment of a media playlist, resolved to an absolute URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentRef {
    pub url: Url,
    /// Playback position, `0..N-1` in playlist order.
    pub ordinal: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Manifest {
    /// Playable (non I-frame) variants in listed order.
    Master { variants: Vec<Url> },
    Media { segments: Vec<SegmentRef> },
}

impl Manifest {
    /// Parses a playlist fetched from `manifest_url`. Relative URIs are
    /// resolved against that URL.
    pub fn parse(bytes: &[u8], manifest_url: &Url) -> Result<Self, StitchError> {
        match parse_playlist_res(bytes) {
            Ok(Playlist::MasterPlaylist(master)) => {
                let variants = master
                    .variants
                    .iter()
                    .filter(|variant| !variant.is_i_frame)
                    .map(|variant| resolve(manifest_url, &variant.uri))
                    .collect::<Result<Vec<_>, _>>()?;
                if variants.is_empty() {
                    return Err(StitchError::Playlist {
                        url: manifest_url.to_string(),
                        reason: "master playlist has no playable variants".to_string(),
                    });
                }
                Ok(Manifest::Master { variants })
            }
            Ok(Playlist::MediaPlaylist(media)) => {
                let segments = media
                    .segments
                    .iter()
                    .enumerate()
                    .map(|(ordinal, segment)| {
                        Ok(SegmentRef {
                            url: resolve(manifest_url, &segment.uri)?,
                            ordinal,
                        })
                    })
                    .collect::<Result<Vec<_>, StitchError>>()?;
                Ok(Manifest::Media { segments })
            }
            Err(_) => {
                debug!(url = %manifest_url, len = bytes.len(), "Body is not an M3U8 playlist");
                Err(StitchError::Playlist {
                    url: manifest_url.to_string(),
                    reason: "not a valid M3U8 playlist".to_string(),
                })
            }
        }
    }
}

fn resolve(base: &Url, uri: &str) -> Result<Url, StitchError> {
    base.join(uri.trim())
        .map_err(|e| StitchError::invalid_url(uri, e))
}
