use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::error::RenderError;
use crate::render::job::RenderJob;

/// Number of stderr lines kept in engine failure messages
const STDERR_TAIL_LINES: usize = 20;

/// Executes render jobs with the underlying transcoding engine
///
/// Invocation is blocking; a job either runs to completion or fails. Callers
/// do not retry.
pub trait RenderInvoker {
    fn invoke(&self, job: &RenderJob) -> Result<(), RenderError>;

    /// Fail early if the engine cannot run at all
    fn ensure_available(&self) -> Result<(), RenderError> {
        Ok(())
    }
}

/// Runs jobs through an external `ffmpeg` process
#[derive(Debug, Clone)]
pub struct FfmpegInvoker {
    binary: String,
}

impl FfmpegInvoker {
    pub fn new<S: Into<String>>(binary: S) -> Self {
        Self { binary: binary.into() }
    }

    pub fn check_ffmpeg_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Full argument vector including global flags
    pub fn command_args(job: &RenderJob) -> Vec<String> {
        let mut args: Vec<String> = ["-hide_banner", "-nostdin", "-loglevel", "error", "-y"]
            .iter()
            .map(|arg| arg.to_string())
            .collect();
        args.extend(job.to_args());
        args
    }
}

impl Default for FfmpegInvoker {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl RenderInvoker for FfmpegInvoker {
    fn invoke(&self, job: &RenderJob) -> Result<(), RenderError> {
        if let Some(graph) = &job.graph {
            graph.validate()?;
        }

        let args = Self::command_args(job);
        debug!("{} {}", self.binary, args.join(" "));
        info!("Rendering {:?}", job.output_path());

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| RenderError::SpawnFailed {
                reason: format!("{}: {}", self.binary, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RenderError::EngineFailed {
                status: output.status.to_string(),
                stderr: stderr_tail(&stderr),
            });
        }

        Ok(())
    }

    fn ensure_available(&self) -> Result<(), RenderError> {
        if self.check_ffmpeg_available() {
            Ok(())
        } else {
            Err(RenderError::EngineUnavailable { engine: self.binary.clone() })
        }
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.trim().lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
