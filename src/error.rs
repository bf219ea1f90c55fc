// src/error.rs

//! Unified error handling for the sharding pipeline.

use std::fmt;

use thiserror::Error;

use crate::stages::Stage;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Exit code for malformed invocations (`EX_USAGE`).
pub const EXIT_USAGE: u8 = 64;
/// Exit code for internal inconsistencies (`EX_SOFTWARE`).
pub const EXIT_SOFTWARE: u8 = 70;
/// Exit code for local I/O failures (`EX_IOERR`).
pub const EXIT_IO: u8 = 74;
/// Exit code for configuration problems (`EX_CONFIG`).
pub const EXIT_CONFIG: u8 = 78;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or missing run arguments
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// An external stage finished with a non-zero status
    #[error("{stage} stage failed{suffix} with exit code {code}", suffix = shard_suffix(.shard))]
    StageFailure {
        stage: Stage,
        shard: Option<usize>,
        code: i32,
    },

    /// An external stage could not be started at all
    #[error("{stage} stage could not be started ({program}): {source}")]
    Spawn {
        stage: Stage,
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The partitioner succeeded but left no shard behind
    #[error("Partitioner produced no shards from a non-empty stream ({0})")]
    NoShards(String),
}

fn shard_suffix(shard: &Option<usize>) -> String {
    shard
        .map(|i| format!(" on shard {}", i))
        .unwrap_or_default()
}

impl AppError {
    /// Create an invalid-arguments error.
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a stage failure carrying the tool's own exit code.
    pub fn stage_failure(stage: Stage, shard: Option<usize>, code: i32) -> Self {
        Self::StageFailure { stage, shard, code }
    }

    /// Create a spawn error for a stage program.
    pub fn spawn(stage: Stage, program: impl fmt::Display, source: std::io::Error) -> Self {
        Self::Spawn {
            stage,
            program: program.to_string(),
            source,
        }
    }

    /// The stage this error originated from, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::StageFailure { stage, .. } | Self::Spawn { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Process exit code for this error.
    ///
    /// Stage failures pass the tool's code through unchanged. Anything that
    /// would read as success (0) or does not fit a process status becomes 1.
    pub fn exit_code(&self) -> u8 {
        let code = match self {
            Self::StageFailure { code, .. } => *code,
            Self::Spawn { source, .. } => {
                if source.kind() == std::io::ErrorKind::NotFound {
                    127
                } else {
                    126
                }
            }
            Self::InvalidArguments(_) => EXIT_USAGE.into(),
            Self::Config(_) | Self::Validation(_) | Self::Toml(_) => EXIT_CONFIG.into(),
            Self::Io(_) => EXIT_IO.into(),
            Self::Json(_) | Self::NoShards(_) => EXIT_SOFTWARE.into(),
        };

        u8::try_from(code).ok().filter(|c| *c != 0).unwrap_or(1)
    }
}
