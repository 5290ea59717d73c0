//! # ambient-loop
//!
//! Turn the newest video clip and audio track in two folders into a short
//! vertical clip and a long, seamlessly looping ambient video.
//!
//! The interesting part is the loop seam: a finite clip repeated end to end
//! jumps visibly and audibly where it wraps. The [`crossfade`] module plans a
//! crossfade at the tail of the clip and builds an ffmpeg filter graph that
//! blends the clip's end into its own beginning, for picture and sound at the
//! same offset. The rendered loop unit is then repeated to the target length.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ambient_loop::{
//!     config::Config,
//!     pipeline::AmbientEngine,
//!     probe::FfprobeProbe,
//!     render::FfmpegInvoker,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let engine = AmbientEngine::new(
//!     config.clone(),
//!     Box::new(FfprobeProbe::new(config.tools.ffprobe.clone())),
//!     Box::new(FfmpegInvoker::new(config.tools.ffmpeg.clone())),
//! );
//!
//! let report = engine.run()?;
//! println!("{:?} / {:?}", report.short_output, report.long_output);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`assets`] - newest-file selection from the input directories
//! - [`probe`] - media duration probing
//! - [`crossfade`] - crossfade planning and filter graph construction
//! - [`render`] - engine invocation and output staging
//! - [`pipeline`] - the end-to-end build
//! - [`config`] - configuration management

pub mod assets;
pub mod config;
pub mod crossfade;
pub mod error;
pub mod pipeline;
pub mod probe;
pub mod render;

// Re-export commonly used types for convenience
pub use crate::{
    config::Config,
    crossfade::{CrossfadeGraphBuilder, CrossfadePlan, FilterGraph},
    error::{AmbientError, Result},
    pipeline::{AmbientEngine, BuildReport},
};
