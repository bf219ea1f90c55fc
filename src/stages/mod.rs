// src/stages/mod.rs

//! Stage invocation layer.
//!
//! The orchestrator never runs a tool directly. It describes each call as an
//! [`Invocation`] and hands it to a [`StageRunner`]:
//!
//! ```text
//! extract  ─▶ order ─▶ partition ─▶ convert × N
//! ```
//!
//! [`CommandRunner`] maps invocations onto configured external programs.

pub mod command;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

pub use command::CommandRunner;

/// One of the four external transformations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Extract,
    Order,
    Partition,
    Convert,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Extract, Stage::Order, Stage::Partition, Stage::Convert];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Extract => "extract",
            Stage::Order => "order",
            Stage::Partition => "partition",
            Stage::Convert => "convert",
        }
    }

    /// Placeholders a tool template for this stage must reference.
    pub fn required_placeholders(&self) -> &'static [&'static str] {
        match self {
            Stage::Extract => &["input", "output", "error_log"],
            Stage::Order => &["input", "output"],
            Stage::Partition => &["input", "prefix"],
            Stage::Convert => &["input", "output"],
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single call of a stage with its placeholder values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub stage: Stage,
    /// Shard ordinal, set for conversions only
    pub shard: Option<usize>,
    pub vars: BTreeMap<&'static str, String>,
}

impl Invocation {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            shard: None,
            vars: BTreeMap::new(),
        }
    }

    pub fn for_shard(mut self, index: usize) -> Self {
        self.shard = Some(index);
        self
    }

    pub fn var(mut self, name: &'static str, value: impl ToString) -> Self {
        self.vars.insert(name, value.to_string());
        self
    }

    pub fn path_var(self, name: &'static str, path: &Path) -> Self {
        let value = path.display().to_string();
        self.var(name, value)
    }

    /// Value of a placeholder, if the invocation carries it.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

/// Executes stage invocations.
///
/// A runner returns `Ok(())` only when the stage completed with status 0.
/// Anything else must surface as [`crate::error::AppError::StageFailure`]
/// (or `Spawn`) carrying the tool's own exit code.
#[async_trait]
pub trait StageRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<()>;
}
