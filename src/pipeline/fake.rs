// src/pipeline/fake.rs

//! In-process stand-ins for the external stages, used by tests.
//!
//! `FakeRunner` performs real file work: it writes the row stream, sorts by
//! the first field, splits on line boundaries with split-style suffixes and
//! converts each shard to JSON lines.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;

use crate::error::{AppError, Result};
use crate::models::{Config, RunLayout, RunParams};
use crate::stages::{Invocation, Stage, StageRunner};

/// Suffix the n-th output file of `split` gets: `aa`..`yz`, then `zaaa`..
pub fn split_suffix(mut n: usize) -> String {
    let mut tier: u32 = 0;
    loop {
        let tail = 26usize.pow(tier + 1);
        let count = 25 * tail;
        if n < count {
            let mut suffix = "z".repeat(tier as usize);
            suffix.push((b'a' + (n / tail) as u8) as char);

            let mut rest = n % tail;
            let mut digits = Vec::new();
            for _ in 0..=tier {
                digits.push((b'a' + (rest % 26) as u8) as char);
                rest /= 26;
            }
            suffix.extend(digits.iter().rev());
            return suffix;
        }
        n -= count;
        tier += 1;
    }
}

#[derive(Debug, Default)]
pub struct FakeRunner {
    rows: Vec<String>,
    fail: Option<(Stage, Option<usize>, i32)>,
    skip_shards: bool,
    calls: Mutex<Vec<(Stage, Option<usize>)>>,
}

impl FakeRunner {
    pub fn with_rows(rows: &[&str]) -> Self {
        Self {
            rows: rows.iter().map(|r| r.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Fail the given stage (and shard, for conversions) with `code`.
    pub fn failing(mut self, stage: Stage, shard: Option<usize>, code: i32) -> Self {
        self.fail = Some((stage, shard, code));
        self
    }

    /// Let the partitioner succeed without writing anything.
    pub fn without_shards(mut self) -> Self {
        self.skip_shards = true;
        self
    }

    pub fn calls(&self) -> Vec<(Stage, Option<usize>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, stage: Stage) -> usize {
        self.calls().iter().filter(|(s, _)| *s == stage).count()
    }

    fn should_fail(&self, invocation: &Invocation) -> Option<i32> {
        let (stage, shard, code) = self.fail?;
        let shard_matches = shard.is_none() || shard == invocation.shard;
        (stage == invocation.stage && shard_matches).then_some(code)
    }

    fn extract(&self, invocation: &Invocation, truncated: bool) -> Result<()> {
        let rows = if truncated {
            &self.rows[..self.rows.len().min(1)]
        } else {
            &self.rows[..]
        };
        write_lines(path(invocation, "output"), rows)?;
        std::fs::write(path(invocation, "error_log"), "")?;
        Ok(())
    }

    fn order(&self, invocation: &Invocation) -> Result<()> {
        let delimiter = invocation.get("delimiter").unwrap_or(",");
        let mut rows = read_lines(path(invocation, "input"))?;
        rows.sort_by(|a, b| {
            let ka = a.split(delimiter).next().unwrap_or_default();
            let kb = b.split(delimiter).next().unwrap_or_default();
            ka.as_bytes().cmp(kb.as_bytes())
        });
        write_lines(path(invocation, "output"), &rows)
    }

    fn partition(&self, invocation: &Invocation) -> Result<()> {
        if self.skip_shards {
            return Ok(());
        }

        let bound: usize = invocation
            .get("shard_bytes")
            .and_then(|b| b.parse().ok())
            .unwrap_or(usize::MAX);
        let prefix = invocation.get("prefix").unwrap_or_default().to_string();

        let mut chunks: Vec<Vec<String>> = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut current_len = 0;
        for row in read_lines(path(invocation, "input"))? {
            let len = row.len() + 1;
            if !current.is_empty() && current_len + len > bound {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            current_len += len;
            current.push(row);
        }
        if !current.is_empty() {
            chunks.push(current);
        }

        for (i, chunk) in chunks.iter().enumerate() {
            write_lines(PathBuf::from(format!("{}{}", prefix, split_suffix(i))), chunk)?;
        }
        Ok(())
    }

    fn convert(&self, invocation: &Invocation) -> Result<()> {
        let lines: Vec<String> = read_lines(path(invocation, "input"))?
            .iter()
            .map(|row| {
                let key = row.split(',').next().unwrap_or_default();
                serde_json::json!({ "key": key, "row": row }).to_string()
            })
            .collect();
        write_lines(path(invocation, "output"), &lines)
    }
}

#[async_trait]
impl StageRunner for FakeRunner {
    async fn run(&self, invocation: &Invocation) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((invocation.stage, invocation.shard));

        if let Some(code) = self.should_fail(invocation) {
            if invocation.stage == Stage::Extract {
                self.extract(invocation, true)?;
            }
            return Err(AppError::stage_failure(
                invocation.stage,
                invocation.shard,
                code,
            ));
        }

        match invocation.stage {
            Stage::Extract => self.extract(invocation, false),
            Stage::Order => self.order(invocation),
            Stage::Partition => self.partition(invocation),
            Stage::Convert => self.convert(invocation),
        }
    }
}

fn path(invocation: &Invocation, name: &str) -> PathBuf {
    PathBuf::from(invocation.get(name).unwrap_or_default())
}

fn read_lines(path: impl AsRef<Path>) -> Result<Vec<String>> {
    Ok(std::fs::read_to_string(path)?
        .lines()
        .map(str::to_string)
        .collect())
}

fn write_lines(path: impl AsRef<Path>, lines: &[String]) -> Result<()> {
    let mut content = String::new();
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Temporary working tree with every fixed directory in place.
pub struct TestWorkspace {
    _tmp: TempDir,
    archive: PathBuf,
    pub config: Config,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self::named("crawl.tar.gz")
    }

    /// Workspace whose archive has the given file name.
    pub fn named(archive_name: &str) -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();

        let mut config = Config::default();
        config.paths.indexed_dir = root.join("indexed");
        config.paths.sorted_dir = root.join("sorted");
        config.paths.converted_dir = root.join("converted");
        config.paths.scratch_dir = root.join("tmp");
        config.paths.reference_table = root.join("public_suffix_list.dat");

        for dir in ["indexed", "sorted", "converted", "tmp", "input"] {
            std::fs::create_dir(root.join(dir)).unwrap();
        }
        std::fs::write(&config.paths.reference_table, "com\nnet\nco.uk\n").unwrap();

        let archive = root.join("input").join(archive_name);
        std::fs::write(&archive, b"\x1f\x8b\x08\x00").unwrap();

        Self {
            _tmp: tmp,
            archive,
            config,
        }
    }

    pub fn archive(&self) -> PathBuf {
        self.archive.clone()
    }

    pub fn layout(&self) -> RunLayout {
        RunLayout::new(&self.config.paths, &self.archive).unwrap()
    }

    pub fn params(&self, shard_bytes: u64) -> RunParams {
        RunParams {
            archive: self.archive(),
            memory_limit: "1G".to_string(),
            parallelism: 2,
            shard_bytes,
        }
    }

    /// Original rows recovered from a converted shard.
    pub fn converted_rows(&self, index: usize) -> Vec<String> {
        read_lines(self.layout().converted_path(index))
            .unwrap()
            .iter()
            .map(|line| {
                let value: serde_json::Value = serde_json::from_str(line).unwrap();
                value["row"].as_str().unwrap().to_string()
            })
            .collect()
    }

    pub fn converted_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.config.paths.converted_dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        files.sort();
        files
    }
}

#[test]
fn split_suffix_matches_split_naming() {
    assert_eq!(split_suffix(0), "aa");
    assert_eq!(split_suffix(1), "ab");
    assert_eq!(split_suffix(26), "ba");
    assert_eq!(split_suffix(649), "yz");
    assert_eq!(split_suffix(650), "zaaa");
    assert_eq!(split_suffix(651), "zaab");

    let suffixes: Vec<String> = (0..1000).map(split_suffix).collect();
    assert!(suffixes.windows(2).all(|w| w[0] < w[1]));
}
