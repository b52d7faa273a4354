use async_trait::async_trait;
use bytes::Bytes;
use mediagrab_platforms::{Caption, MediaKind};
use thiserror::Error;

/// Handle the sink hands back for uploaded bytes (e.g. an `mxc://` URI).
/// Never interpreted by the relay.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaLocator(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostContent {
    Caption(Caption),
    Media {
        locator: MediaLocator,
        kind: MediaKind,
        mime_type: String,
        file_name: String,
        size: usize,
    },
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("upload of {file_name} failed: {reason}")]
    Upload { file_name: String, reason: String },
    #[error("post failed: {0}")]
    Post(String),
}

/// Destination for captions and media, implemented by the host (chat client).
#[async_trait]
pub trait MediaSink: Send + Sync {
    async fn upload(
        &self,
        data: Bytes,
        mime_type: &str,
        file_name: &str,
    ) -> Result<MediaLocator, SinkError>;

    async fn post(&self, content: PostContent) -> Result<(), SinkError>;
}
