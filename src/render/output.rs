use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::{RenderError, Result};

/// A render destination that only appears once the render succeeded
///
/// The engine writes into a scratch directory created next to the target,
/// and [`StagedOutput::commit`] renames the finished file into place. If the
/// render fails the scratch directory is removed on drop and any existing
/// file at the target is left untouched.
pub struct StagedOutput {
    dir: TempDir,
    staged: PathBuf,
    target: PathBuf,
}

impl StagedOutput {
    /// Create the target's parent directories and a scratch directory beside it
    pub fn new<P: AsRef<Path>>(target: P) -> Result<Self> {
        let target = target.as_ref().to_path_buf();
        let parent = target
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)?;

        let dir = tempfile::Builder::new()
            .prefix(".ambient-loop-")
            .tempdir_in(parent)?;

        let file_name = target
            .file_name()
            .map(|name| name.to_os_string())
            .ok_or_else(|| RenderError::OutputFailed {
                path: target.display().to_string(),
                reason: "output path has no file name".to_string(),
            })?;
        let staged = dir.path().join(file_name);

        debug!("Staging {:?} in {:?}", target, dir.path());
        Ok(Self { dir, staged, target })
    }

    /// Where the engine should write the final file
    pub fn path(&self) -> &Path {
        &self.staged
    }

    /// A path for intermediate files that are discarded with the stage
    pub fn scratch(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Move the finished file to its target, replacing any previous output
    pub fn commit(self) -> Result<PathBuf> {
        std::fs::rename(&self.staged, &self.target).map_err(|e| RenderError::OutputFailed {
            path: self.target.display().to_string(),
            reason: e.to_string(),
        })?;

        if let Err(e) = self.dir.close() {
            warn!("Failed to remove staging directory: {}", e);
        }
        Ok(self.target)
    }
}
