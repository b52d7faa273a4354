use serde::Deserialize;

/// oEmbed response for a watch URL.
#[derive(Debug, Deserialize)]
pub struct OEmbed {
    pub title: String,
    #[serde(default)]
    pub author_name: Option<String>,
}
