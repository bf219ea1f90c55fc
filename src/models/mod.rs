// src/models/mod.rs

//! Domain models for the sharding pipeline.
//!
//! Configuration, validated run arguments, the per-run artifact layout
//! and the run summary.

mod config;
mod run;
mod summary;

// Re-export all public types
pub use config::{
    Config, ConversionConfig, OrderingConfig, PathsConfig, ToolConfig, ToolsConfig,
};
pub use run::{RunLayout, RunParams, SHARD_PREFIX, Shard};
pub use summary::{RunOutcome, RunSummary};
