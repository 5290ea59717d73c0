//! # Crossfade Loop Construction
//!
//! Everything needed to turn a finite clip into one seamless loop iteration:
//!
//! - [`plan`] - offset computation and feasibility checks
//! - [`graph`] - typed filter graph, validation and ffmpeg serialization
//! - [`builder`] - the crossfade loop graph and the short-clip graph
//!
//! ## Usage
//!
//! ```rust
//! use ambient_loop::config::EncodingConfig;
//! use ambient_loop::crossfade::{plan, CrossfadeGraphBuilder, StreamFormat};
//!
//! # fn main() -> anyhow::Result<()> {
//! let plan = plan(60.0, 1.0)?;
//! assert_eq!(plan.offset(), 59.0);
//!
//! let graph = CrossfadeGraphBuilder::new(StreamFormat::from(&EncodingConfig::default()))
//!     .build(&plan)?;
//! println!("{}", graph.to_filter_complex());
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod graph;
pub mod plan;

pub use builder::{CrossfadeGraphBuilder, ShortClipGraphBuilder, StreamFormat, AUDIO_OUT, VIDEO_OUT};
pub use graph::{Filter, FilterChain, FilterGraph, Pad, StreamKind};
pub use plan::{plan, CrossfadePlan, PLAN_EPSILON};
