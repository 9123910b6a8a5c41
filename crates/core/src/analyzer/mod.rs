//! Playlist analysis.
//!
//! Turns a source URL into the list of acquirable media items the user
//! selects from, by shelling out to yt-dlp's flat playlist dump.

mod types;
mod ytdlp;

pub use types::{AnalyzerError, MediaItem, PlaylistAnalyzer};
pub use ytdlp::YtDlpAnalyzer;
