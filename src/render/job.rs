use std::path::{Path, PathBuf};

use crate::config::EncodingConfig;
use crate::crossfade::builder::seconds;
use crate::crossfade::graph::FilterGraph;

/// One command-line input of a render
#[derive(Debug, Clone, PartialEq)]
pub struct RenderInput {
    pub path: PathBuf,

    /// Repeat the input forever (`-stream_loop -1`)
    pub loop_forever: bool,
}

impl RenderInput {
    pub fn once<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into(), loop_forever: false }
    }

    pub fn looped<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into(), loop_forever: true }
    }
}

/// How output streams are written
#[derive(Debug, Clone, PartialEq)]
pub enum Codecs {
    /// Re-encode with the configured codecs
    Encode {
        video_codec: String,
        preset: String,
        crf: u8,
        pixel_format: String,
        audio_codec: String,
        audio_bitrate: String,
    },
    /// Stream copy, no re-encoding
    Copy,
}

impl From<&EncodingConfig> for Codecs {
    fn from(config: &EncodingConfig) -> Self {
        Self::Encode {
            video_codec: config.video_codec.clone(),
            preset: config.preset.clone(),
            crf: config.crf,
            pixel_format: config.pixel_format.clone(),
            audio_codec: config.audio_codec.clone(),
            audio_bitrate: config.audio_bitrate.clone(),
        }
    }
}

/// A complete description of one engine invocation
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    pub inputs: Vec<RenderInput>,
    pub graph: Option<FilterGraph>,

    /// Stream selectors for `-map`; graph labels are wrapped in brackets
    pub maps: Vec<String>,

    /// Output length cap in seconds (`-t`)
    pub duration: Option<f64>,

    pub codecs: Codecs,

    /// Container passed to `-f`, so staged files need no extension
    pub format: String,

    pub output: PathBuf,
}

impl RenderJob {
    pub fn new<P: Into<PathBuf>>(output: P, codecs: Codecs, format: &str) -> Self {
        Self {
            inputs: Vec::new(),
            graph: None,
            maps: Vec::new(),
            duration: None,
            codecs,
            format: format.to_string(),
            output: output.into(),
        }
    }

    pub fn input(mut self, input: RenderInput) -> Self {
        self.inputs.push(input);
        self
    }

    /// Attach a filter graph and map all of its declared outputs
    pub fn graph(mut self, graph: FilterGraph) -> Self {
        self.maps = graph.outputs().iter().map(|label| format!("[{}]", label)).collect();
        self.graph = Some(graph);
        self
    }

    pub fn map<S: Into<String>>(mut self, selector: S) -> Self {
        self.maps.push(selector.into());
        self
    }

    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Engine arguments, excluding the binary and global flags
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        for input in &self.inputs {
            if input.loop_forever {
                args.extend(["-stream_loop".to_string(), "-1".to_string()]);
            }
            args.push("-i".to_string());
            args.push(input.path.to_string_lossy().into_owned());
        }

        if let Some(graph) = &self.graph {
            args.push("-filter_complex".to_string());
            args.push(graph.to_filter_complex());
        }

        for selector in &self.maps {
            args.push("-map".to_string());
            args.push(selector.clone());
        }

        if let Some(duration) = self.duration {
            args.push("-t".to_string());
            args.push(seconds(duration));
        }

        match &self.codecs {
            Codecs::Encode {
                video_codec,
                preset,
                crf,
                pixel_format,
                audio_codec,
                audio_bitrate,
            } => {
                args.extend([
                    "-c:v".to_string(), video_codec.clone(),
                    "-preset".to_string(), preset.clone(),
                    "-crf".to_string(), crf.to_string(),
                    "-pix_fmt".to_string(), pixel_format.clone(),
                    "-c:a".to_string(), audio_codec.clone(),
                    "-b:a".to_string(), audio_bitrate.clone(),
                ]);
            }
            Codecs::Copy => {
                args.extend(["-c".to_string(), "copy".to_string()]);
            }
        }

        args.extend([
            "-movflags".to_string(), "+faststart".to_string(),
            "-f".to_string(), self.format.clone(),
        ]);
        args.push(self.output.to_string_lossy().into_owned());
        args
    }
}
