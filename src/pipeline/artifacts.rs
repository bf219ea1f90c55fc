// src/pipeline/artifacts.rs

//! Intermediate artifact lifecycle.
//!
//! Every intermediate file has exactly one consumer. It is removed once that
//! consumer succeeded, and left in place for diagnosis when it failed. A
//! new run first sweeps what an aborted run left behind, so leftovers are
//! never converted (and counted) twice.

use std::path::Path;

use crate::error::Result;
use crate::models::{RunLayout, SHARD_PREFIX, Shard};
use crate::utils::fs::remove_if_exists;
use crate::utils::log;

/// Delete leftovers of an earlier aborted run.
///
/// Removes stale shards, this archive's ordered stream and its converted
/// outputs. The error log and the archive are never touched.
pub async fn sweep_stale(layout: &RunLayout) -> Result<usize> {
    let mut removed = 0;

    if remove_if_exists(&layout.ordered).await? {
        log::warn(&format!(
            "Removed stale ordered stream {}",
            layout.ordered.display()
        ));
        removed += 1;
    }

    for shard in discover_shards(layout).await? {
        remove_if_exists(&shard.path).await?;
        log::warn(&format!("Removed stale shard {}", shard.path.display()));
        removed += 1;
    }

    let mut entries = tokio::fs::read_dir(&layout.converted_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        if layout.is_converted_name(&name.to_string_lossy()) {
            remove_if_exists(&entry.path()).await?;
            log::warn(&format!(
                "Removed stale converted shard {}",
                entry.path().display()
            ));
            removed += 1;
        }
    }

    Ok(removed)
}

/// List the partitioner's output in record order.
///
/// Shards are ordered by file name. Split-style suffixes keep creation order
/// under byte ordering even after they widen (`yz` < `zaaa`, `89` < `9000`).
/// The ordered stream shares the directory and is never a shard, even when
/// the archive name itself starts with the shard prefix.
pub async fn discover_shards(layout: &RunLayout) -> Result<Vec<Shard>> {
    let ordered = layout.ordered.file_name();
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(&layout.sorted_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        if Some(name.as_os_str()) == ordered {
            continue;
        }
        let is_shard = name
            .to_str()
            .is_some_and(|n| n.starts_with(SHARD_PREFIX) && n.len() > SHARD_PREFIX.len());
        if is_shard && entry.file_type().await?.is_file() {
            names.push(name);
        }
    }
    names.sort();

    Ok(names
        .into_iter()
        .enumerate()
        .map(|(index, name)| Shard {
            index,
            path: layout.sorted_dir.join(name),
        })
        .collect())
}

/// Remove an artifact whose consumer has finished.
pub async fn consume(path: &Path) -> Result<()> {
    if remove_if_exists(path).await? {
        log::debug(&format!("Removed consumed artifact {}", path.display()));
    }
    Ok(())
}
