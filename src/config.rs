use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Main configuration for ambient-loop
///
/// Built once at process start and passed by reference into every component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input directories and output files
    pub paths: PathsConfig,

    /// Short vertical clip settings
    pub short: ShortConfig,

    /// Long-form looped render settings
    pub long: LongConfig,

    /// Codec and stream normalization settings shared by both renders
    pub encoding: EncodingConfig,

    /// External tool locations
    pub tools: ToolsConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.short.validate()?;
        self.long.validate()?;
        self.encoding.validate()?;
        Ok(())
    }
}

/// Input and output locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory scanned for the newest video asset
    pub video_dir: PathBuf,

    /// Directory scanned for the newest audio asset
    pub audio_dir: PathBuf,

    /// Destination of the short vertical clip
    pub short_output: PathBuf,

    /// Destination of the long looped render
    pub long_output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            video_dir: PathBuf::from("assets/Video_raw"),
            audio_dir: PathBuf::from("assets/audio_raw"),
            short_output: PathBuf::from("Output/shorts/short_final.mp4"),
            long_output: PathBuf::from("Output/longform/long_ambient_90min.mp4"),
        }
    }
}

/// Short vertical clip configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortConfig {
    /// Clip length in seconds
    pub duration: f64,

    /// Output width in pixels
    pub width: u32,

    /// Output height in pixels
    pub height: u32,
}

impl Default for ShortConfig {
    fn default() -> Self {
        Self {
            duration: 10.0,
            width: 1080,
            height: 1920,
        }
    }
}

impl ShortConfig {
    fn validate(&self) -> Result<()> {
        if !(self.duration > 0.0) || !self.duration.is_finite() {
            return Err(ConfigError::InvalidValue {
                key: "short.duration".to_string(),
                value: self.duration.to_string()
            }.into());
        }

        // yuv420p needs even dimensions
        if self.width == 0 || self.height == 0 || self.width % 2 != 0 || self.height % 2 != 0 {
            return Err(ConfigError::InvalidValue {
                key: "short.resolution".to_string(),
                value: format!("{}x{}", self.width, self.height)
            }.into());
        }

        Ok(())
    }
}

/// Long-form loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LongConfig {
    /// Total output length in seconds
    pub duration: f64,

    /// Video crossfade length at the loop seam (seconds)
    pub video_crossfade: f64,

    /// Audio crossfade length at the loop seam (seconds)
    pub audio_crossfade: f64,
}

impl Default for LongConfig {
    fn default() -> Self {
        Self {
            duration: 5400.0,
            video_crossfade: 1.0,
            audio_crossfade: 1.0,
        }
    }
}

impl LongConfig {
    fn validate(&self) -> Result<()> {
        if !(self.duration > 0.0) || !self.duration.is_finite() {
            return Err(ConfigError::InvalidValue {
                key: "long.duration".to_string(),
                value: self.duration.to_string()
            }.into());
        }

        for (key, value) in [
            ("long.video_crossfade", self.video_crossfade),
            ("long.audio_crossfade", self.audio_crossfade),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string()
                }.into());
            }
        }

        // Both modalities share one offset; differing lengths would drift A/V sync at the seam.
        if (self.video_crossfade - self.audio_crossfade).abs() > f64::EPSILON {
            return Err(ConfigError::InvalidValue {
                key: "long.crossfade".to_string(),
                value: format!("video {} != audio {}", self.video_crossfade, self.audio_crossfade)
            }.into());
        }

        Ok(())
    }

    /// The single crossfade length used for both video and audio
    pub fn crossfade(&self) -> f64 {
        self.video_crossfade
    }
}

/// Codec and normalization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    /// Normalized frame rate
    pub frame_rate: u32,

    /// Normalized pixel format
    pub pixel_format: String,

    /// Video encoder
    pub video_codec: String,

    /// Encoder speed preset
    pub preset: String,

    /// Constant rate factor (0-51, lower is better)
    pub crf: u8,

    /// Audio encoder
    pub audio_codec: String,

    /// Audio bitrate, e.g. "192k"
    pub audio_bitrate: String,

    /// Normalized audio sample rate (Hz)
    pub sample_rate: u32,

    /// Normalized audio sample format
    pub sample_format: String,

    /// Normalized channel layout
    pub channel_layout: String,

    /// Output container passed to `-f`
    pub container: String,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            frame_rate: 30,
            pixel_format: "yuv420p".to_string(),
            video_codec: "libx264".to_string(),
            preset: "medium".to_string(),
            crf: 18,
            audio_codec: "aac".to_string(),
            audio_bitrate: "192k".to_string(),
            sample_rate: 48000,
            sample_format: "fltp".to_string(),
            channel_layout: "stereo".to_string(),
            container: "mp4".to_string(),
        }
    }
}

impl EncodingConfig {
    fn validate(&self) -> Result<()> {
        if self.frame_rate == 0 {
            return Err(ConfigError::InvalidValue {
                key: "encoding.frame_rate".to_string(),
                value: self.frame_rate.to_string()
            }.into());
        }

        if self.sample_rate == 0 {
            return Err(ConfigError::InvalidValue {
                key: "encoding.sample_rate".to_string(),
                value: self.sample_rate.to_string()
            }.into());
        }

        if self.crf > 51 {
            return Err(ConfigError::InvalidValue {
                key: "encoding.crf".to_string(),
                value: self.crf.to_string()
            }.into());
        }

        Ok(())
    }
}

/// External tool binaries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// ffmpeg executable
    pub ffmpeg: String,

    /// ffprobe executable
    pub ffprobe: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test_config.toml");

        let original_config = Config::default();

        original_config.save_to_file(&file_path).unwrap();
        let loaded_config = Config::from_file(&file_path).unwrap();

        assert_eq!(original_config.long.duration, loaded_config.long.duration);
        assert_eq!(original_config.paths.video_dir, loaded_config.paths.video_dir);
        assert_eq!(original_config.encoding.audio_bitrate, loaded_config.encoding.audio_bitrate);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("partial.toml");
        std::fs::write(&file_path, "[long]\nduration = 600.0\n").unwrap();

        let config = Config::from_file(&file_path).unwrap();
        assert_eq!(config.long.duration, 600.0);
        assert_eq!(config.long.video_crossfade, 1.0);
        assert_eq!(config.short.width, 1080);
    }

    #[test]
    fn test_missing_file() {
        let result = Config::from_file("/definitely/not/here.toml");
        assert!(matches!(
            result,
            Err(crate::error::AmbientError::Config(ConfigError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn test_mismatched_crossfades_rejected() {
        let mut config = Config::default();
        config.long.audio_crossfade = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_odd_short_resolution_rejected() {
        let mut config = Config::default();
        config.short.width = 1081;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_infinite_durations_rejected() {
        let mut config = Config::default();
        config.short.duration = f64::INFINITY;
        assert!(matches!(
            config.validate(),
            Err(crate::error::AmbientError::Config(ConfigError::InvalidValue { ref key, .. })) if key == "short.duration"
        ));

        let mut config = Config::default();
        config.long.duration = f64::INFINITY;
        assert!(matches!(
            config.validate(),
            Err(crate::error::AmbientError::Config(ConfigError::InvalidValue { ref key, .. })) if key == "long.duration"
        ));
    }
}
