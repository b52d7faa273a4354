//! HLS stream reconstruction.
//!
//! [`StreamReconstructor`] walks from a (possibly master) playlist URL down to
//! a media playlist, downloads its segments with bounded concurrency and
//! concatenates them in playback order. Segments that fail to download are
//! dropped; a reconstruction with nothing left is an error.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod playlist;
pub mod reconstructor;

pub use config::StitchConfig;
pub use error::StitchError;
pub use fetcher::{Assembled, SegmentDownloader, SegmentFetcher, concatenate_segments};
pub use playlist::{Manifest, SegmentRef};
pub use reconstructor::{StreamReconstructor, Stitched};
