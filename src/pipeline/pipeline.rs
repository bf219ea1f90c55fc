// src/pipeline/pipeline.rs

use chrono::Utc;

use crate::error::{AppError, Result};
use crate::models::{Config, RunLayout, RunOutcome, RunParams, RunSummary};
use crate::stages::{Invocation, Stage, StageRunner};
use crate::utils::fs::{file_len, remove_if_exists};
use crate::utils::log::{self, TOTAL_STEPS};

use super::artifacts::{consume, discover_shards, sweep_stale};
use super::convert::convert_shards;

/// Run the full pipeline for one archive.
///
/// Stages run strictly one after another; the first failure ends the run
/// and is returned unchanged so its exit code reaches the caller.
pub async fn run_pipeline(
    config: &Config,
    params: &RunParams,
    runner: &dyn StageRunner,
) -> Result<RunSummary> {
    let result = run_stages(config, params, runner).await;

    match &result {
        Ok(summary) => {
            log::summary("Run", &summary.items());
            match summary.outcome {
                RunOutcome::Completed => log::success(&format!(
                    "{} converted into {} shards",
                    summary.archive, summary.shard_count
                )),
                RunOutcome::EmptyExtraction => {
                    log::success(&format!("{}: 0 elements, nothing to do", summary.archive))
                }
            }
        }
        Err(e) => {
            log::error(&format!("Run aborted: {}", e));
            if e.stage().is_some() {
                log::error("Intermediate files of the failed stage were kept for inspection");
            }
        }
    }

    result
}

async fn run_stages(
    config: &Config,
    params: &RunParams,
    runner: &dyn StageRunner,
) -> Result<RunSummary> {
    let started_at = Utc::now();
    config.preflight()?;

    let layout = RunLayout::new(&config.paths, &params.archive)?;
    log::header(&format!("Sharding {}", layout.name));

    let swept = sweep_stale(&layout).await?;
    if swept > 0 {
        log::warn(&format!("Swept {} leftovers of an earlier run", swept));
    }

    let summary = |outcome, row_bytes, shard_count| RunSummary {
        archive: layout.name.clone(),
        outcome,
        row_bytes,
        shard_count,
        started_at,
        finished_at: Utc::now(),
    };

    // Step 1: Extract
    log::step(
        1,
        TOTAL_STEPS,
        &format!("Indexing {}", layout.archive.display()),
    );
    runner.run(&extract_invocation(&layout)).await?;

    let row_bytes = file_len(&layout.row_stream).await?;
    if row_bytes == 0 {
        remove_if_exists(&layout.row_stream).await?;
        log::info(&format!("{}: 0 elements", layout.name));
        return Ok(summary(RunOutcome::EmptyExtraction, 0, 0));
    }
    log::sub_item(&format!(
        "{} bytes of rows in {}",
        row_bytes,
        layout.row_stream.display()
    ));

    // Step 2: Order
    log::step(2, TOTAL_STEPS, "Sorting rows");
    runner
        .run(&order_invocation(config, params, &layout))
        .await?;
    consume(&layout.row_stream).await?;

    // Step 3: Partition
    log::step(
        3,
        TOTAL_STEPS,
        &format!("Splitting into shards of at most {} bytes", params.shard_bytes),
    );
    runner.run(&partition_invocation(params, &layout)).await?;

    let shards = discover_shards(&layout).await?;
    if shards.is_empty() {
        return Err(AppError::NoShards(layout.ordered.display().to_string()));
    }
    consume(&layout.ordered).await?;

    // Step 4: Convert
    log::step(
        4,
        TOTAL_STEPS,
        &format!("Converting {} shards", shards.len()),
    );
    convert_shards(runner, &layout, &shards, config.conversion.max_concurrent).await?;

    Ok(summary(RunOutcome::Completed, row_bytes, shards.len()))
}

fn extract_invocation(layout: &RunLayout) -> Invocation {
    Invocation::new(Stage::Extract)
        .path_var("input", &layout.archive)
        .path_var("reference", &layout.reference_table)
        .path_var("output", &layout.row_stream)
        .path_var("error_log", &layout.error_log)
}

fn order_invocation(config: &Config, params: &RunParams, layout: &RunLayout) -> Invocation {
    Invocation::new(Stage::Order)
        .path_var("input", &layout.row_stream)
        .path_var("output", &layout.ordered)
        .path_var("scratch", &layout.scratch_dir)
        .var("memory", &params.memory_limit)
        .var("parallelism", params.parallelism)
        .var("delimiter", &config.ordering.delimiter)
        .var("key_column", config.ordering.key_column)
}

fn partition_invocation(params: &RunParams, layout: &RunLayout) -> Invocation {
    Invocation::new(Stage::Partition)
        .path_var("input", &layout.ordered)
        .path_var("prefix", &layout.shard_prefix)
        .var("shard_bytes", params.shard_bytes)
}
