use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum StitchError {
    /// A single segment could not be downloaded. Logged and skipped, never
    /// returned from a reconstruction.
    #[error("segment {ordinal} ({url}) could not be fetched: {reason}")]
    SegmentFetch {
        ordinal: usize,
        url: String,
        reason: String,
    },

    #[error("manifest {url} produced no playable segments")]
    EmptyManifest { url: String },

    #[error("playlist {url} was already visited")]
    CyclicPlaylist { url: String },

    #[error("gave up after {hops} playlist hops at {url}")]
    TooManyHops { hops: usize, url: String },

    #[error("request failed with HTTP {status} during {operation} for {url}")]
    UpstreamHttp {
        status: StatusCode,
        url: String,
        operation: &'static str,
    },

    #[error("playlist error for {url}: {reason}")]
    Playlist { url: String, reason: String },

    #[error("invalid URL `{input}`: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("HTTP request failed: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },
}

impl StitchError {
    pub fn http_status(status: StatusCode, url: impl Into<String>, operation: &'static str) -> Self {
        Self::UpstreamHttp {
            status,
            url: url.into(),
            operation,
        }
    }

    pub fn invalid_url(input: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            input: input.into(),
            reason: reason.to_string(),
        }
    }
}
