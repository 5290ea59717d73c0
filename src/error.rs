use thiserror::Error;

/// Main error type for the ambient-loop library
#[derive(Error, Debug)]
pub enum AmbientError {
    #[error("Asset discovery error: {0}")]
    Asset(#[from] AssetError),

    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    #[error("Crossfade planning error: {0}")]
    Plan(#[from] PlanError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Input directory scanning errors
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Input directory does not exist: {path}")]
    MissingInputDirectory { path: String },

    #[error("No {kind} asset found in directory: {path}")]
    NoAssetFound { kind: String, path: String },
}

/// Duration probing errors
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Probe tool '{tool}' could not be started: {reason}")]
    ToolUnavailable { tool: String, reason: String },

    #[error("Probe failed for {path}: {stderr}")]
    ToolFailed { path: String, stderr: String },

    #[error("Unreadable probe output for {path}: {reason}")]
    InvalidOutput { path: String, reason: String },

    #[error("No usable duration reported for {path}")]
    NoDuration { path: String },
}

/// Loop-crossfade planning errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("Clip of {clip_duration:.3}s is too short for a {crossfade_duration:.3}s crossfade")]
    Infeasible {
        clip_duration: f64,
        crossfade_duration: f64,
    },

    #[error("Invalid {name} duration: {value}")]
    InvalidDuration { name: &'static str, value: f64 },
}

/// Transcoding engine errors
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Render engine '{engine}' not found. Please install FFmpeg.")]
    EngineUnavailable { engine: String },

    #[error("Failed to spawn render engine: {reason}")]
    SpawnFailed { reason: String },

    #[error("Render engine exited with {status}: {stderr}")]
    EngineFailed { status: String, stderr: String },

    #[error("Invalid filter graph: {reason}")]
    InvalidGraph { reason: String },

    #[error("Could not finalize output {path}: {reason}")]
    OutputFailed { path: String, reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using AmbientError
pub type Result<T> = std::result::Result<T, AmbientError>;

impl AmbientError {
    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Asset(AssetError::MissingInputDirectory { path }) => {
                format!("Input directory '{}' does not exist. Create it and add your source files.", path)
            }
            Self::Asset(AssetError::NoAssetFound { kind, path }) => {
                format!("No {} file found in '{}'. Hidden files and unsupported extensions are ignored.", kind, path)
            }
            Self::Plan(PlanError::Infeasible { clip_duration, crossfade_duration }) => {
                format!(
                    "The video clip ({:.2}s) is too short for a {:.2}s crossfade. Use a longer clip or a shorter crossfade.",
                    clip_duration, crossfade_duration
                )
            }
            Self::Render(RenderError::EngineUnavailable { engine }) => {
                format!("'{}' was not found. Install FFmpeg: brew install ffmpeg (macOS) or sudo apt install ffmpeg (Ubuntu)", engine)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_error_converts_into_top_level() {
        let err: AmbientError = PlanError::Infeasible {
            clip_duration: 1.0,
            crossfade_duration: 1.0,
        }
        .into();

        assert!(matches!(err, AmbientError::Plan(PlanError::Infeasible { .. })));
        assert!(err.user_message().contains("too short"));
    }

    #[test]
    fn test_user_message_falls_back_to_display() {
        let err: AmbientError = ProbeError::NoDuration { path: "clip.mp4".to_string() }.into();
        assert_eq!(err.user_message(), err.to_string());
    }
}
