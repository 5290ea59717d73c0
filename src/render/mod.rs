//! # Render Module
//!
//! Describes engine invocations as [`RenderJob`] values, executes them
//! through a [`RenderInvoker`], and stages outputs so failed renders never
//! leave partial files at the destination.

pub mod invoker;
pub mod job;
pub mod output;

pub use invoker::{FfmpegInvoker, RenderInvoker};
pub use job::{Codecs, RenderInput, RenderJob};
pub use output::StagedOutput;
