use std::path::Path;
use std::process::Command;

use serde::Deserialize;
use tracing::debug;

use crate::error::ProbeError;
use crate::probe::DurationProbe;

/// Duration probe backed by the external `ffprobe` tool
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    binary: String,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    // ffprobe prints numbers as strings in its JSON writer
    duration: Option<String>,
}

impl FfprobeProbe {
    pub fn new<S: Into<String>>(binary: S) -> Self {
        Self { binary: binary.into() }
    }
}

impl Default for FfprobeProbe {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl DurationProbe for FfprobeProbe {
    fn probe_duration(&self, path: &Path) -> Result<f64, ProbeError> {
        let output = Command::new(&self.binary)
            .args([
                "-v", "error",
                "-show_entries", "format=duration",
                "-of", "json",
            ])
            .arg(path)
            .output()
            .map_err(|e| ProbeError::ToolUnavailable {
                tool: self.binary.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ProbeError::ToolFailed {
                path: path.display().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let duration = parse_duration(&stdout, path)?;
        debug!("Probed {:?}: {:.3}s", path, duration);
        Ok(duration)
    }
}

/// Extract a strictly positive duration from ffprobe's JSON output
pub fn parse_duration(json: &str, path: &Path) -> Result<f64, ProbeError> {
    let parsed: FfprobeOutput = serde_json::from_str(json).map_err(|e| ProbeError::InvalidOutput {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let duration = parsed
        .format
        .and_then(|format| format.duration)
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|duration| duration.is_finite() && *duration > 0.0)
        .ok_or_else(|| ProbeError::NoDuration {
            path: path.display().to_string(),
        })?;

    Ok(duration)
}
