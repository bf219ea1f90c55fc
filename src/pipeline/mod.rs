// src/pipeline/mod.rs

//! Pipeline entry points.
//!
//! - `run_pipeline`: extract → order → partition → convert for one archive
//! - `artifacts`: intermediate file discovery and cleanup
//! - `convert`: bounded shard conversion fan-out

pub mod artifacts;
pub mod convert;
#[allow(clippy::module_inception)]
mod pipeline;

#[cfg(test)]
pub(crate) mod fake;

pub use artifacts::{discover_shards, sweep_stale};
pub use convert::convert_shards;
pub use pipeline::run_pipeline;
