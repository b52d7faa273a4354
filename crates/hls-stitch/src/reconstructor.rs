use std::collections::HashSet;

use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::config::StitchConfig;
use crate::error::StitchError;
use crate::fetcher::{SegmentDownloader, SegmentFetcher, concatenate_segments};
use crate::playlist::{Manifest, SegmentRef};

/// A reconstructed stream.
#[derive(Debug, Clone)]
pub struct Stitched {
    pub bytes: Bytes,
    /// The media playlist the segments came from.
    pub media_playlist: Url,
    pub segment_count: usize,
    pub fetched: usize,
    pub dropped: usize,
}

impl Stitched {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

pub struct StreamReconstructor<D = SegmentFetcher> {
    http_client: Client,
    downloader: D,
    config: StitchConfig,
}

impl StreamReconstructor<SegmentFetcher> {
    pub fn new(http_client: Client, config: StitchConfig) -> Self {
        let downloader = SegmentFetcher::new(http_client.clone());
        Self::with_downloader(http_client, downloader, config)
    }
}

impl<D: SegmentDownloader> StreamReconstructor<D> {
    pub fn with_downloader(http_client: Client, downloader: D, config: StitchConfig) -> Self {
        Self {
            http_client,
            downloader,
            config,
        }
    }

    pub fn config(&self) -> &StitchConfig {
        &self.config
    }

    async fn fetch_manifest(&self, url: &Url) -> Result<Manifest, StitchError> {
        let response = self.http_client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StitchError::http_status(status, url.as_str(), "playlist fetch"));
        }
        let body = response.bytes().await?;
        Manifest::parse(&body, url)
    }

    /// Follows master playlists down to a media playlist and returns its URL
    /// with the segment list.
    ///
    /// The first playable variant of every master is taken. Each URL may be
    /// visited once, and at most `max_playlist_hops` masters are crossed.
    pub async fn resolve_segments(
        &self,
        manifest_url: &str,
    ) -> Result<(Url, Vec<SegmentRef>), StitchError> {
        let mut current =
            Url::parse(manifest_url).map_err(|e| StitchError::invalid_url(manifest_url, e))?;
        let mut visited: HashSet<Url> = HashSet::new();
        let mut hops = 0;

        loop {
            if !visited.insert(current.clone()) {
                return Err(StitchError::CyclicPlaylist {
                    url: current.to_string(),
                });
            }

            match self.fetch_manifest(&current).await? {
                Manifest::Media { segments } => {
                    debug!(url = %current, segments = segments.len(), hops, "Media playlist reached");
                    return Ok((current, segments));
                }
                Manifest::Master { variants } => {
                    if hops == self.config.max_playlist_hops {
                        return Err(StitchError::TooManyHops {
                            hops,
                            url: current.to_string(),
                        });
                    }
                    hops += 1;

                    let Some(next) = variants.into_iter().next() else {
                        return Err(StitchError::Playlist {
                            url: current.to_string(),
                            reason: "master playlist has no playable variants".to_string(),
                        });
                    };
                    debug!(master = %current, variant = %next, "Following first variant");
                    current = next;
                }
            }
        }
    }

    /// Downloads every segment reachable from `manifest_url` and concatenates
    /// them in playback order.
    pub async fn reconstruct(&self, manifest_url: &str) -> Result<Stitched, StitchError> {
        let (media_playlist, segments) = self.resolve_segments(manifest_url).await?;
        if segments.is_empty() {
            return Err(StitchError::EmptyManifest {
                url: media_playlist.to_string(),
            });
        }

        let assembled = concatenate_segments(
            &self.downloader,
            &segments,
            self.config.segment_concurrency,
        )
        .await;
        if assembled.fetched == 0 {
            return Err(StitchError::EmptyManifest {
                url: media_playlist.to_string(),
            });
        }

        info!(
            url = %media_playlist,
            segments = segments.len(),
            dropped = assembled.dropped,
            len = assembled.bytes.len(),
            "HLS stream reconstructed"
        );
        Ok(Stitched {
            bytes: assembled.bytes,
            media_playlist,
            segment_count: segments.len(),
            fetched: assembled.fetched,
            dropped: assembled.dropped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn serve(server: &MockServer, at: &str, status: u16, body: &'static str) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    fn reconstructor() -> StreamReconstructor {
        StreamReconstructor::new(Client::new(), StitchConfig::default())
    }

    const MASTER: &str = "#EXTM3U\n\
        #EXT-X-STREAM-INF:BANDWIDTH=1500000,RESOLUTION=1280x720\n\
        720p/video.m3u8\n\
        #EXT-X-STREAM-INF:BANDWIDTH=600000,RESOLUTION=640x360\n\
        360p/video.m3u8\n";

    const MEDIA: &str = "#EXTM3U\n#EXT-X-TARGETDURATION:4\n\
        #EXTINF:4.0,\nseg0.ts\n#EXTINF:4.0,\nseg1.ts\n#EXTINF:4.0,\nseg2.ts\n#EXTINF:4.0,\nseg3.ts\n\
        #EXT-X-ENDLIST\n";

    #[tokio::test]
    async fn master_to_media_drops_failed_segments() {
        let server = MockServer::start().await;
        serve(&server, "/v/playlist.m3u8", 200, MASTER).await;
        serve(&server, "/v/720p/video.m3u8", 200, MEDIA).await;
        serve(&server, "/v/720p/seg0.ts", 200, "AAAA").await;
        serve(&server, "/v/720p/seg1.ts", 500, "").await;
        serve(&server, "/v/720p/seg2.ts", 200, "CCCC").await;
        serve(&server, "/v/720p/seg3.ts", 200, "DDDD").await;

        let stitched = reconstructor()
            .reconstruct(&format!("{}/v/playlist.m3u8", server.uri()))
            .await
            .unwrap();

        assert_eq!(stitched.bytes, Bytes::from_static(b"AAAACCCCDDDD"));
        assert_eq!(stitched.segment_count, 4);
        assert_eq!(stitched.fetched, 3);
        assert_eq!(stitched.dropped, 1);
        assert!(stitched.media_playlist.path().ends_with("/v/720p/video.m3u8"));
    }

    #[tokio::test]
    async fn every_segment_failing_is_an_empty_manifest() {
        let server = MockServer::start().await;
        serve(&server, "/v/720p/video.m3u8", 200, MEDIA).await;

        let err = reconstructor()
            .reconstruct(&format!("{}/v/720p/video.m3u8", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, StitchError::EmptyManifest { .. }));
    }

    #[tokio::test]
    async fn media_playlist_without_segments_is_an_empty_manifest() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/empty.m3u8",
            200,
            "#EXTM3U\n#EXT-X-TARGETDURATION:4\n#EXT-X-ENDLIST\n",
        )
        .await;

        let err = reconstructor()
            .reconstruct(&format!("{}/empty.m3u8", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, StitchError::EmptyManifest { .. }));
    }

    #[tokio::test]
    async fn masters_pointing_at_each_other_are_cyclic() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/a.m3u8",
            200,
            "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=1\nb.m3u8\n",
        )
        .await;
        serve(
            &server,
            "/b.m3u8",
            200,
            "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=1\na.m3u8\n",
        )
        .await;

        let err = reconstructor()
            .reconstruct(&format!("{}/a.m3u8", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, StitchError::CyclicPlaylist { .. }));
    }

    #[tokio::test]
    async fn hop_limit_is_enforced() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/a.m3u8",
            200,
            "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=1\nb.m3u8\n",
        )
        .await;
        serve(&server, "/b.m3u8", 200, MEDIA).await;

        let strict = StreamReconstructor::new(
            Client::new(),
            StitchConfig::default().with_max_playlist_hops(0),
        );
        let err = strict
            .resolve_segments(&format!("{}/a.m3u8", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, StitchError::TooManyHops { hops: 0, .. }));

        let (_, segments) = reconstructor()
            .resolve_segments(&format!("{}/a.m3u8", server.uri()))
            .await
            .unwrap();
        assert_eq!(segments.len(), 4);
    }

    #[tokio::test]
    async fn playlist_http_error_is_terminal() {
        let server = MockServer::start().await;
        serve(&server, "/gone.m3u8", 404, "").await;

        let err = reconstructor()
            .reconstruct(&format!("{}/gone.m3u8", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, StitchError::UpstreamHttp { .. }));
    }
}
