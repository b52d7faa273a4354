use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<GraphQlData>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlData {
    #[serde(default)]
    pub xdt_shortcode_media: Option<ShortcodeMedia>,
    /// Older name of the same object, still returned by some doc ids.
    #[serde(default)]
    pub shortcode_media: Option<ShortcodeMedia>,
}

impl GraphQlResponse {
    pub fn into_media(self) -> Option<ShortcodeMedia> {
        let data = self.data?;
        data.xdt_shortcode_media.or(data.shortcode_media)
    }
}

#[derive(Debug, Deserialize)]
pub struct ShortcodeMedia {
    pub shortcode: String,
    #[serde(default)]
    pub is_video: bool,
    pub display_url: String,
    #[serde(default)]
    pub video_url: Option<String>,
    pub owner: Owner,
    #[serde(default)]
    pub edge_media_to_caption: CaptionEdges,
    #[serde(default)]
    pub edge_media_preview_like: Option<Count>,
    #[serde(default)]
    pub edge_liked_by: Option<Count>,
    #[serde(default)]
    pub edge_media_to_parent_comment: Option<Count>,
    #[serde(default)]
    pub edge_media_to_comment: Option<Count>,
}

impl ShortcodeMedia {
    pub fn caption_text(&self) -> &str {
        self.edge_media_to_caption
            .edges
            .first()
            .map(|edge| edge.node.text.as_str())
            .unwrap_or_default()
    }

    pub fn likes(&self) -> u64 {
        self.edge_media_preview_like
            .as_ref()
            .or(self.edge_liked_by.as_ref())
            .map(|c| c.count)
            .unwrap_or(0)
    }

    pub fn comments(&self) -> u64 {
        self.edge_media_to_parent_comment
            .as_ref()
            .or(self.edge_media_to_comment.as_ref())
            .map(|c| c.count)
            .unwrap_or(0)
    }
}

#[derive(Debug, Deserialize)]
pub struct Owner {
    pub username: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CaptionEdges {
    #[serde(default)]
    pub edges: Vec<CaptionEdge>,
}

#[derive(Debug, Deserialize)]
pub struct CaptionEdge {
    pub node: CaptionNode,
}

#[derive(Debug, Deserialize)]
pub struct CaptionNode {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct Count {
    #[serde(default)]
    pub count: u64,
}
