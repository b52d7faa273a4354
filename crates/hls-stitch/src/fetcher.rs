// Segment download and in-order concatenation.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{StreamExt, stream};
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::StitchError;
use crate::playlist::SegmentRef;

#[async_trait]
pub trait SegmentDownloader: Send + Sync {
    /// Returns the raw bytes of one segment. Every failure is reported as
    /// [`StitchError::SegmentFetch`].
    async fn download_segment(&self, segment: &SegmentRef) -> Result<Bytes, StitchError>;
}

pub struct SegmentFetcher {
    http_client: Client,
}

impl SegmentFetcher {
    pub fn new(http_client: Client) -> Self {
        Self { http_client }
    }

    fn segment_error(segment: &SegmentRef, reason: impl ToString) -> StitchError {
        StitchError::SegmentFetch {
            ordinal: segment.ordinal,
            url: segment.url.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl SegmentDownloader for SegmentFetcher {
    async fn download_segment(&self, segment: &SegmentRef) -> Result<Bytes, StitchError> {
        let response = self
            .http_client
            .get(segment.url.clone())
            .send()
            .await
            .map_err(|e| Self::segment_error(segment, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::segment_error(segment, format!("HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Self::segment_error(segment, e))?;
        debug!(ordinal = segment.ordinal, len = bytes.len(), "Segment downloaded");
        Ok(bytes)
    }
}

/// Result of downloading and joining a segment list.
#[derive(Debug, Clone, Default)]
pub struct Assembled {
    pub bytes: Bytes,
    pub fetched: usize,
    pub dropped: usize,
}

/// Downloads `segments` with at most `concurrency` requests in flight and
/// joins the successful ones in ordinal order.
///
/// `buffered` yields results in submission order, so the output does not
/// depend on which download finishes first. Failed segments are logged and
/// left out.
pub async fn concatenate_segments<D>(
    downloader: &D,
    segments: &[SegmentRef],
    concurrency: usize,
) -> Assembled
where
    D: SegmentDownloader + ?Sized,
{
    let mut ordered: Vec<&SegmentRef> = segments.iter().collect();
    ordered.sort_by_key(|segment| segment.ordinal);

    let mut results = stream::iter(ordered)
        .map(|segment| async move { (segment, downloader.download_segment(segment).await) })
        .buffered(concurrency.max(1));

    let mut buffer = BytesMut::new();
    let mut fetched = 0;
    let mut dropped = 0;
    while let Some((segment, result)) = results.next().await {
        match result {
            Ok(bytes) => {
                buffer.extend_from_slice(&bytes);
                fetched += 1;
            }
            Err(e) => {
                warn!(ordinal = segment.ordinal, url = %segment.url, error = %e, "Dropping segment");
                dropped += 1;
            }
        }
    }

    Assembled {
        bytes: buffer.freeze(),
        fetched,
        dropped,
    }
}
