//! # Media Duration Probe
//!
//! The only media inspection the crate needs: how long a file plays.

use std::path::Path;

use crate::error::ProbeError;

mod ffprobe;

pub use ffprobe::{parse_duration, FfprobeProbe};

/// Reports the playback duration of a media file in seconds
///
/// Implementations must return a finite value greater than zero or a
/// [`ProbeError`]; callers do not retry.
pub trait DurationProbe {
    fn probe_duration(&self, path: &Path) -> Result<f64, ProbeError>;
}
