// src/pipeline/convert.rs

//! Shard conversion fan-out.

use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{RunLayout, Shard};
use crate::stages::{Invocation, Stage, StageRunner};
use crate::utils::log;

use super::artifacts::consume;

/// Convert every shard into `{name}.{index}.jsonl`.
///
/// At most `max_concurrent` conversions run at once. With a bound of 1 the
/// shards are converted strictly in ascending order and a failure stops
/// before any later shard starts. With a higher bound the first failure to
/// be *detected* aborts the run, which is not necessarily the lowest failing
/// index; conversions still in flight are dropped and their processes
/// killed. A shard file is deleted only after its own conversion succeeded.
pub async fn convert_shards(
    runner: &dyn StageRunner,
    layout: &RunLayout,
    shards: &[Shard],
    max_concurrent: usize,
) -> Result<()> {
    let mut conversions = stream::iter(shards)
        .map(|shard| convert_one(runner, layout, shard))
        .buffer_unordered(max_concurrent.max(1));

    while let Some(result) = conversions.next().await {
        result?;
    }

    Ok(())
}

async fn convert_one(runner: &dyn StageRunner, layout: &RunLayout, shard: &Shard) -> Result<()> {
    let output = layout.converted_path(shard.index);
    let invocation = Invocation::new(Stage::Convert)
        .for_shard(shard.index)
        .path_var("input", &shard.path)
        .path_var("output", &output);

    runner.run(&invocation).await?;
    consume(&shard.path).await?;

    log::sub_item(&format!(
        "shard {} → {}",
        shard.index,
        output.display()
    ));
    Ok(())
}
