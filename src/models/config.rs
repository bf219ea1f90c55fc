// src/models/config.rs

//! Application configuration structures.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::stages::Stage;
use crate::utils::fs::{load_toml, require_dir};
use crate::utils::template::placeholders;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Fixed working directories
    #[serde(default)]
    pub paths: PathsConfig,

    /// How the orderer compares rows
    #[serde(default)]
    pub ordering: OrderingConfig,

    /// Shard conversion fan-out
    #[serde(default)]
    pub conversion: ConversionConfig,

    /// External programs backing each stage
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_toml(path.as_ref())
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.ordering.delimiter.is_empty() {
            return Err(AppError::validation("ordering.delimiter is empty"));
        }
        if self.ordering.key_column == 0 {
            return Err(AppError::validation(
                "ordering.key_column is 1-based and must be > 0",
            ));
        }
        if self.conversion.max_concurrent == 0 {
            return Err(AppError::validation(
                "conversion.max_concurrent must be > 0",
            ));
        }

        for stage in Stage::ALL {
            let tool = self.tools.get(stage);
            if tool.program.trim().is_empty() {
                return Err(AppError::validation(format!(
                    "tools.{}.program is empty",
                    stage
                )));
            }

            let used = placeholders(tool.args.iter().map(String::as_str));
            for required in stage.required_placeholders() {
                if !used.iter().any(|name| name == required) {
                    return Err(AppError::validation(format!(
                        "tools.{}.args never references {{{}}}",
                        stage, required
                    )));
                }
            }
        }
        Ok(())
    }

    /// Check that every fixed directory and the reference table exist.
    pub fn preflight(&self) -> Result<()> {
        let paths = &self.paths;
        require_dir(&paths.indexed_dir, "indexed")?;
        require_dir(&paths.sorted_dir, "sorted")?;
        require_dir(&paths.converted_dir, "converted")?;
        require_dir(&paths.scratch_dir, "scratch")?;

        if !paths.reference_table.is_file() {
            return Err(AppError::config(format!(
                "reference table {} does not exist",
                paths.reference_table.display()
            )));
        }
        Ok(())
    }
}

/// Working directory layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Row streams and their error logs
    #[serde(default = "defaults::indexed_dir")]
    pub indexed_dir: PathBuf,

    /// Ordered row streams and shards
    #[serde(default = "defaults::sorted_dir")]
    pub sorted_dir: PathBuf,

    /// Final JSON-lines output
    #[serde(default = "defaults::converted_dir")]
    pub converted_dir: PathBuf,

    /// Spill space for the orderer, shared across runs
    #[serde(default = "defaults::scratch_dir")]
    pub scratch_dir: PathBuf,

    /// Domain-suffix table handed to the extractor
    #[serde(default = "defaults::reference_table")]
    pub reference_table: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            indexed_dir: defaults::indexed_dir(),
            sorted_dir: defaults::sorted_dir(),
            converted_dir: defaults::converted_dir(),
            scratch_dir: defaults::scratch_dir(),
            reference_table: defaults::reference_table(),
        }
    }
}

/// Row comparison settings forwarded to the orderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderingConfig {
    /// Field separator of the row stream
    #[serde(default = "defaults::delimiter")]
    pub delimiter: String,

    /// 1-based column holding the sort key
    #[serde(default = "defaults::key_column")]
    pub key_column: usize,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            delimiter: defaults::delimiter(),
            key_column: defaults::key_column(),
        }
    }
}

/// Shard conversion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Maximum concurrent converter processes (1 = sequential)
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// One external program and its argument template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolConfig {
    /// Executable name or path
    pub program: String,

    /// Arguments, with `{placeholder}` substitution
    #[serde(default)]
    pub args: Vec<String>,

    /// Extra environment variables for the process
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl ToolConfig {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            env: BTreeMap::new(),
        }
    }

    fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }
}

/// Programs backing the four stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "defaults::extract_tool")]
    pub extract: ToolConfig,

    #[serde(default = "defaults::order_tool")]
    pub order: ToolConfig,

    #[serde(default = "defaults::partition_tool")]
    pub partition: ToolConfig,

    #[serde(default = "defaults::convert_tool")]
    pub convert: ToolConfig,
}

impl ToolsConfig {
    pub fn get(&self, stage: Stage) -> &ToolConfig {
        match stage {
            Stage::Extract => &self.extract,
            Stage::Order => &self.order,
            Stage::Partition => &self.partition,
            Stage::Convert => &self.convert,
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            extract: defaults::extract_tool(),
            order: defaults::order_tool(),
            partition: defaults::partition_tool(),
            convert: defaults::convert_tool(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    use super::ToolConfig;

    // Path defaults
    pub fn indexed_dir() -> PathBuf {
        "indexed".into()
    }
    pub fn sorted_dir() -> PathBuf {
        "sorted".into()
    }
    pub fn converted_dir() -> PathBuf {
        "converted".into()
    }
    pub fn scratch_dir() -> PathBuf {
        "tmp".into()
    }
    pub fn reference_table() -> PathBuf {
        "data/public_suffix_list.dat".into()
    }

    // Ordering defaults
    pub fn delimiter() -> String {
        ",".into()
    }
    pub fn key_column() -> usize {
        1
    }

    // Conversion defaults
    pub fn max_concurrent() -> usize {
        1
    }

    // Tool defaults
    pub fn extract_tool() -> ToolConfig {
        ToolConfig::new(
            "indexer",
            &[
                "--tld",
                "{reference}",
                "--input",
                "{input}",
                "--input-type",
                "tar.gz",
                "--output",
                "{output}",
                "--error",
                "{error_log}",
            ],
        )
    }
    pub fn order_tool() -> ToolConfig {
        // C collation gives plain byte ordering
        ToolConfig::new(
            "sort",
            &[
                "-S",
                "{memory}",
                "--parallel={parallelism}",
                "-t",
                "{delimiter}",
                "-k",
                "{key_column},{key_column}",
                "-T",
                "{scratch}",
                "-o",
                "{output}",
                "{input}",
            ],
        )
        .with_env("LC_ALL", "C")
    }
    pub fn partition_tool() -> ToolConfig {
        ToolConfig::new("split", &["-C", "{shard_bytes}", "{input}", "{prefix}"])
    }
    pub fn convert_tool() -> ToolConfig {
        ToolConfig::new("csv2jsonl", &["--input", "{input}", "--output", "{output}"])
    }
}
