use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// Platforms a link can be resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Reddit,
    Instagram,
    YouTube,
    TikTok,
    Bluesky,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::YouTube,
        Platform::Instagram,
        Platform::Reddit,
        Platform::TikTok,
        Platform::Bluesky,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Reddit => "reddit",
            Platform::Instagram => "instagram",
            Platform::YouTube => "youtube",
            Platform::TikTok => "tiktok",
            Platform::Bluesky => "bluesky",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedditPathKind {
    /// `/r/<sub>/comments/<id>`
    Comments,
    /// `/r/<sub>/s/<id>` share links, which only resolve through a redirect.
    Share,
}

impl RedditPathKind {
    fn as_path_segment(&self) -> &'static str {
        match self {
            RedditPathKind::Comments => "comments",
            RedditPathKind::Share => "s",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstagramKind {
    Post,
    Reel,
    Tv,
    Story,
}

impl InstagramKind {
    fn from_path_segment(segment: &str) -> Option<Self> {
        match segment {
            "p" => Some(InstagramKind::Post),
            "reel" | "reels" => Some(InstagramKind::Reel),
            "tv" => Some(InstagramKind::Tv),
            "stories" => Some(InstagramKind::Story),
            _ => None,
        }
    }

    fn as_path_segment(&self) -> &'static str {
        match self {
            InstagramKind::Post => "p",
            InstagramKind::Reel => "reel",
            InstagramKind::Tv => "tv",
            InstagramKind::Story => "stories",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TikTokLink {
    /// `tiktok.com/@handle/video/<digits>`
    Video { handle: String, video_id: String },
    /// `vm.tiktok.com/<code>`, `vt.tiktok.com/<code>` and `tiktok.com/t/<code>`
    /// share links. `share_base` is the link up to the code, e.g.
    /// `https://vt.tiktok.com`.
    Short { share_base: String, code: String },
}

/// The structured fields captured from a link, one shape per platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    Reddit {
        subreddit: String,
        kind: RedditPathKind,
        id: String,
    },
    Instagram {
        owner: Option<String>,
        kind: InstagramKind,
        shortcode: String,
        story_id: Option<String>,
    },
    YouTube {
        video_id: String,
    },
    TikTok(TikTokLink),
    Bluesky {
        handle: String,
        post_id: String,
    },
}

impl LinkTarget {
    pub fn platform(&self) -> Platform {
        match self {
            LinkTarget::Reddit { .. } => Platform::Reddit,
            LinkTarget::Instagram { .. } => Platform::Instagram,
            LinkTarget::YouTube { .. } => Platform::YouTube,
            LinkTarget::TikTok(_) => Platform::TikTok,
            LinkTarget::Bluesky { .. } => Platform::Bluesky,
        }
    }

    /// Canonical https URL for the target, without any query string.
    pub fn canonical_url(&self) -> String {
        match self {
            LinkTarget::Reddit { .. } => format!("https://www.reddit.com{}", self.reddit_path()),
            LinkTarget::Instagram {
                kind: InstagramKind::Story,
                shortcode,
                story_id: Some(story_id),
                ..
            } => format!("https://www.instagram.com/stories/{shortcode}/{story_id}/"),
            LinkTarget::Instagram {
                kind, shortcode, ..
            } => format!(
                "https://www.instagram.com/{}/{shortcode}/",
                kind.as_path_segment()
            ),
            LinkTarget::YouTube { video_id } => {
                format!("https://www.youtube.com/watch?v={video_id}")
            }
            LinkTarget::TikTok(TikTokLink::Video { handle, video_id }) => {
                format!("https://www.tiktok.com/{handle}/video/{video_id}")
            }
            LinkTarget::TikTok(TikTokLink::Short { share_base, code }) => {
                format!("{share_base}/{code}/")
            }
            LinkTarget::Bluesky { handle, post_id } => {
                format!("https://bsky.app/profile/{handle}/post/{post_id}")
            }
        }
    }

    /// Path component of a Reddit link (`/r/<sub>/comments/<id>`); empty for other platforms.
    pub fn reddit_path(&self) -> String {
        match self {
            LinkTarget::Reddit {
                subreddit,
                kind,
                id,
            } => format!("/r/{subreddit}/{}/{id}", kind.as_path_segment()),
            _ => String::new(),
        }
    }
}

/// A link found in a message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedLink {
    pub target: LinkTarget,
    /// The exact text the pattern matched.
    pub matched: String,
    pub normalized_url: String,
}

impl DetectedLink {
    fn new(target: LinkTarget, matched: &str) -> Self {
        let normalized_url = target.canonical_url();
        Self {
            target,
            matched: matched.to_string(),
            normalized_url,
        }
    }

    pub fn platform(&self) -> Platform {
        self.target.platform()
    }
}

static REDDIT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:(?:https?:)?//)?(?:(?:www|m|old|nm|new)\.)?(?:reddit\.com|redd\.it)/r/([^/\s?#]+)/(comments|s)/([A-Za-z0-9_-]+)",
    )
    .unwrap()
});

static INSTAGRAM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:https?://)?(?:www\.)?instagram\.com/(?:([A-Za-z0-9._-]+)/)?(p|reels?|tv|stories)/([A-Za-z0-9_.-]+)/?(\d+)?",
    )
    .unwrap()
});

static YOUTUBE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:(?:https?:)?//)?(?:(?:www|m|music)\.)?(?:youtube\.com/(?:watch\?(?:[^\s#]*?&)?v=|embed/|v/|shorts/|live/)|youtu\.be/)([A-Za-z0-9_-]+)",
    )
    .unwrap()
});

static TIKTOK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:(?:https?:)?//)?(?:(?:(?:www|m)\.)?tiktok\.com/(@[A-Za-z0-9._-]+)/video/(\d+)|(vm|vt)\.tiktok\.com/([A-Za-z0-9_-]+)|(?:www\.)?tiktok\.com/t/([A-Za-z0-9_-]+))",
    )
    .unwrap()
});

static BLUESKY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:(?:https?:)?//)?(?:(?:www|bsky)\.)?bsky\.app/profile/([A-Za-z0-9._:-]+)/post/([A-Za-z0-9_-]+)",
    )
    .unwrap()
});

type TargetParser = fn(&Captures<'_>) -> Option<LinkTarget>;

struct PatternEntry {
    platform: Platform,
    regex: &'static LazyLock<Regex>,
    parse: TargetParser,
}

// Order matches `Platform::ALL`.
static PATTERNS: &[PatternEntry] = &[
    PatternEntry {
        platform: Platform::YouTube,
        regex: &YOUTUBE_REGEX,
        parse: parse_youtube,
    },
    PatternEntry {
        platform: Platform::Instagram,
        regex: &INSTAGRAM_REGEX,
        parse: parse_instagram,
    },
    PatternEntry {
        platform: Platform::Reddit,
        regex: &REDDIT_REGEX,
        parse: parse_reddit,
    },
    PatternEntry {
        platform: Platform::TikTok,
        regex: &TIKTOK_REGEX,
        parse: parse_tiktok,
    },
    PatternEntry {
        platform: Platform::Bluesky,
        regex: &BLUESKY_REGEX,
        parse: parse_bluesky,
    },
];

fn group(caps: &Captures<'_>, index: usize) -> Option<String> {
    caps.get(index).map(|m| m.as_str().to_string())
}

fn parse_reddit(caps: &Captures<'_>) -> Option<LinkTarget> {
    let kind = match caps.get(2)?.as_str() {
        "comments" => RedditPathKind::Comments,
        _ => RedditPathKind::Share,
    };
    Some(LinkTarget::Reddit {
        subreddit: group(caps, 1)?,
        kind,
        id: group(caps, 3)?,
    })
}

fn parse_instagram(caps: &Captures<'_>) -> Option<LinkTarget> {
    Some(LinkTarget::Instagram {
        owner: group(caps, 1),
        kind: InstagramKind::from_path_segment(caps.get(2)?.as_str())?,
        shortcode: group(caps, 3)?,
        story_id: group(caps, 4),
    })
}

fn parse_youtube(caps: &Captures<'_>) -> Option<LinkTarget> {
    Some(LinkTarget::YouTube {
        video_id: group(caps, 1)?,
    })
}

fn parse_tiktok(caps: &Captures<'_>) -> Option<LinkTarget> {
    if let (Some(handle), Some(video_id)) = (group(caps, 1), group(caps, 2)) {
        return Some(LinkTarget::TikTok(TikTokLink::Video { handle, video_id }));
    }
    let (share_base, code) = match (group(caps, 3), group(caps, 4)) {
        (Some(subdomain), Some(code)) => (format!("https://{subdomain}.tiktok.com"), code),
        _ => ("https://www.tiktok.com/t".to_string(), group(caps, 5)?),
    };
    Some(LinkTarget::TikTok(TikTokLink::Short { share_base, code }))
}

fn parse_bluesky(caps: &Captures<'_>) -> Option<LinkTarget> {
    Some(LinkTarget::Bluesky {
        handle: group(caps, 1)?,
        post_id: group(caps, 2)?,
    })
}

/// Stateless scanner over the platform link patterns.
///
/// Matching is purely syntactic; no network access happens here and a match
/// says nothing about whether the post exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkMatcher;

impl LinkMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Every link in `text`, grouped by platform in [`Platform::ALL`] order.
    /// Within one platform, links keep their left-to-right order.
    pub fn find_links(&self, text: &str) -> Vec<DetectedLink> {
        PATTERNS
            .iter()
            .flat_map(|entry| Self::scan(entry, text))
            .collect()
    }

    pub fn find_platform_links(&self, platform: Platform, text: &str) -> Vec<DetectedLink> {
        PATTERNS
            .iter()
            .filter(|entry| entry.platform == platform)
            .flat_map(|entry| Self::scan(entry, text))
            .collect()
    }

    fn scan(entry: &PatternEntry, text: &str) -> Vec<DetectedLink> {
        entry
            .regex
            .captures_iter(text)
            .filter_map(|caps| {
                let matched = caps.get(0)?.as_str();
                (entry.parse)(&caps).map(|target| DetectedLink::new(target, matched))
            })
            .collect()
    }
}
