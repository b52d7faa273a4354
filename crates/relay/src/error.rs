use hls_stitch::StitchError;
use mediagrab_platforms::ResolveError;
use reqwest::StatusCode;
use thiserror::Error;

use crate::sink::SinkError;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Stitch(#[from] StitchError),

    #[error("media request to {url} failed with HTTP {status}")]
    UpstreamHttp { status: StatusCode, url: String },

    #[error("media at {url} has an empty body")]
    EmptyBody { url: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to install tracing subscriber: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),
}
