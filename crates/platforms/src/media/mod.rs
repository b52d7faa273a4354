pub mod media_kind;
pub mod resolution;
pub mod resolved_media;

pub use media_kind::{MediaKind, extension_for_mime, mime_from_url};
pub use resolution::{Caption, Resolution};
pub use resolved_media::{MediaSource, ResolvedMedia};
