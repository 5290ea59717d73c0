//! # Build Pipeline
//!
//! The engine that ties asset selection, probing, crossfade planning and
//! rendering together into one sequential run.

pub mod engine;

// Re-exports for convenience
pub use engine::{AmbientEngine, BuildReport};
