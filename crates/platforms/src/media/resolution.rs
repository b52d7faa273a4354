use serde::{Deserialize, Serialize};

use super::ResolvedMedia;

/// Text posted alongside the media of a link.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Caption {
    pub body: String,
    /// Optional HTML rendering of `body`.
    pub html: Option<String>,
}

impl Caption {
    pub fn plain(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            html: None,
        }
    }

    pub fn with_html(body: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            html: Some(html.into()),
        }
    }
}

/// Everything a resolver produced for one link.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub caption: Option<Caption>,
    pub media: Vec<ResolvedMedia>,
}

impl Resolution {
    pub fn new(caption: Option<Caption>, media: Vec<ResolvedMedia>) -> Self {
        Self { caption, media }
    }

    pub fn is_empty(&self) -> bool {
        self.caption.is_none() && self.media.is_empty()
    }
}
