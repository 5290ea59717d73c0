//! # Asset Discovery Module
//!
//! Picks the newest video and audio source files from the configured input
//! directories.

pub mod selector;
pub mod types;

pub use selector::newest_asset;
pub use types::{MediaAsset, MediaKind};
