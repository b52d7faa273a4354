use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("failed to resolve redirects for {url}: {reason}")]
    RedirectResolution { url: String, reason: String },
    #[error("request to {url} failed with HTTP {status}")]
    UpstreamHttp { status: StatusCode, url: String },
    #[error("missing field: {0}")]
    MissingField(String),
    #[error("unknown media type for {url}: {mime}")]
    UnknownMediaType { url: String, mime: String },
    #[error("empty result: {0}")]
    EmptyResult(String),
    #[error("unsupported link: {0}")]
    Unsupported(String),
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ResolveError {
    pub fn upstream(status: StatusCode, url: impl Into<String>) -> Self {
        Self::UpstreamHttp {
            status,
            url: url.into(),
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }
}
