pub mod bluesky;
pub mod instagram;
pub mod reddit;
pub mod tiktok;
pub mod youtube;
