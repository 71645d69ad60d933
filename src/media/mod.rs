pub mod fetcher;
pub mod session;
pub mod source;

pub use fetcher::{FrameFetcher, MediaEvent};
pub use session::MediaSession;
pub use source::{FfmpegSource, FrameSource};

use std::path::Path;

/// Duration and native pixel size of a loaded media source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaDescriptor {
    pub duration_seconds: f64,
    pub native_width: u32,
    pub native_height: u32,
}

impl MediaDescriptor {
    /// Returns `None` for a zero-sized frame or a negative/non-finite duration.
    pub fn new(duration_seconds: f64, native_width: u32, native_height: u32) -> Option<Self> {
        if native_width == 0 || native_height == 0 {
            return None;
        }
        if !duration_seconds.is_finite() || duration_seconds < 0.0 {
            return None;
        }
        Some(Self {
            duration_seconds,
            native_width,
            native_height,
        })
    }
}

const VIDEO_TYPES: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("m4v", "video/x-m4v"),
    ("mov", "video/quicktime"),
    ("mkv", "video/x-matroska"),
    ("webm", "video/webm"),
    ("avi", "video/x-msvideo"),
    ("wmv", "video/x-ms-wmv"),
    ("flv", "video/x-flv"),
    ("mpg", "video/mpeg"),
    ("mpeg", "video/mpeg"),
    ("ts", "video/mp2t"),
    ("3gp", "video/3gpp"),
    ("ogv", "video/ogg"),
];

/// MIME type for a recognised video file, judged by extension.
pub fn video_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    VIDEO_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

/// Extensions accepted as video, for file dialogs.
pub fn video_extensions() -> Vec<&'static str> {
    VIDEO_TYPES.iter().map(|(ext, _)| *ext).collect()
}

/// `mm:ss` clock readout.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}
