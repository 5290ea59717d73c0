use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};

/// Which input directory an asset came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    /// Lowercase file extensions accepted for this kind
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Video => &["mp4", "mov", "m4v", "webm"],
            Self::Audio => &["wav", "mp3", "m4a", "aac", "flac", "ogg"],
        }
    }

    /// Check if a file extension is allowed for this kind (case-insensitive)
    pub fn accepts_extension(&self, extension: &str) -> bool {
        let extension = extension.to_lowercase();
        self.extensions().contains(&extension.as_str())
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
        }
    }
}

/// A selected input file
///
/// The duration is filled in after probing; the asset itself never changes
/// once selected, so [`MediaAsset::with_duration`] returns a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaAsset {
    /// Path to the media file
    pub path: PathBuf,

    /// Video or audio
    pub kind: MediaKind,

    /// Modification time used for selection
    pub modified: SystemTime,

    /// Duration in seconds (if probed)
    pub duration: Option<f64>,
}

impl MediaAsset {
    /// Create a new, unprobed asset
    pub fn new<P: Into<PathBuf>>(path: P, kind: MediaKind, modified: SystemTime) -> Self {
        Self {
            path: path.into(),
            kind,
            modified,
            duration: None,
        }
    }

    /// Return a copy carrying the probed duration
    pub fn with_duration(&self, duration: f64) -> Self {
        Self {
            duration: Some(duration),
            ..self.clone()
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name for log output
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Modification time formatted in local time
    pub fn modified_display(&self) -> String {
        let modified: DateTime<Local> = self.modified.into();
        modified.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
