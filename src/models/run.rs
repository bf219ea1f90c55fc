// src/models/run.rs

//! Run parameters and the per-run artifact layout.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::PathsConfig;
use crate::utils::size::{parse_byte_size, validate_memory_limit};

/// Prefix shared by every shard file inside the sorted directory.
pub const SHARD_PREFIX: &str = "parts.";

/// Validated run arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunParams {
    /// Input archive, left untouched by the run
    pub archive: PathBuf,
    /// Working-memory budget for the orderer, `sort -S` notation
    pub memory_limit: String,
    /// Orderer thread count
    pub parallelism: usize,
    /// Upper bound for a single shard in bytes
    pub shard_bytes: u64,
}

impl RunParams {
    /// Validate raw positional arguments.
    pub fn parse(archive: &str, memory: &str, cpus: &str, split_size: &str) -> Result<Self> {
        let archive = PathBuf::from(archive);
        if !archive.is_file() {
            return Err(AppError::invalid_arguments(format!(
                "archive {} does not exist",
                archive.display()
            )));
        }

        let memory_limit = validate_memory_limit(memory)?.to_string();

        let parallelism: usize = cpus.trim().parse().map_err(|_| {
            AppError::invalid_arguments(format!("cpus '{}' is not a positive integer", cpus))
        })?;
        if parallelism == 0 {
            return Err(AppError::invalid_arguments("cpus must be at least 1"));
        }

        let shard_bytes = parse_byte_size(split_size)?;

        Ok(Self {
            archive,
            memory_limit,
            parallelism,
            shard_bytes,
        })
    }
}

/// A shard file produced by the partitioner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shard {
    /// Zero-based position in sort order
    pub index: usize,
    pub path: PathBuf,
}

/// Every path a run touches, derived once from the archive name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    pub name: String,
    pub archive: PathBuf,
    pub reference_table: PathBuf,
    pub row_stream: PathBuf,
    pub error_log: PathBuf,
    pub ordered: PathBuf,
    pub sorted_dir: PathBuf,
    pub shard_prefix: PathBuf,
    pub converted_dir: PathBuf,
    pub scratch_dir: PathBuf,
}

impl RunLayout {
    pub fn new(paths: &PathsConfig, archive: &Path) -> Result<Self> {
        let name = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                AppError::invalid_arguments(format!(
                    "archive path {} has no file name",
                    archive.display()
                ))
            })?;

        let row_stream = paths.indexed_dir.join(format!("{}.csv", name));
        let error_log = paths.indexed_dir.join(format!("{}.csv.error.log", name));

        Ok(Self {
            archive: archive.to_path_buf(),
            reference_table: paths.reference_table.clone(),
            row_stream,
            error_log,
            ordered: paths.sorted_dir.join(format!("{}.s.csv", name)),
            sorted_dir: paths.sorted_dir.clone(),
            shard_prefix: paths.sorted_dir.join(SHARD_PREFIX),
            converted_dir: paths.converted_dir.clone(),
            scratch_dir: paths.scratch_dir.clone(),
            name,
        })
    }

    /// Output path for the shard with the given ordinal.
    pub fn converted_path(&self, index: usize) -> PathBuf {
        self.converted_dir
            .join(format!("{}.{}.jsonl", self.name, index))
    }

    /// Whether a file name in the converted directory belongs to this archive.
    pub fn is_converted_name(&self, file_name: &str) -> bool {
        file_name
            .strip_prefix(&self.name)
            .and_then(|rest| rest.strip_prefix('.'))
            .and_then(|rest| rest.strip_suffix(".jsonl"))
            .is_some_and(|index| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
    }
}
