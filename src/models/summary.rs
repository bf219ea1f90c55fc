// src/models/summary.rs

//! Run outcome reporting.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Terminal state of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every shard was converted
    Completed,
    /// Extraction yielded zero records; nothing after it ran
    EmptyExtraction,
}

/// What a run produced and how long it took.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub archive: String,
    pub outcome: RunOutcome,
    /// Size of the extracted row stream
    pub row_bytes: u64,
    pub shard_count: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn elapsed_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    /// Key/value pairs for the closing log block.
    pub fn items(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Archive", self.archive.clone()),
            ("Rows", format!("{} bytes", self.row_bytes)),
            ("Shards", self.shard_count.to_string()),
            ("Elapsed", format!("{:.1}s", self.elapsed_secs())),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_summary_serialization() {
        let started_at = Utc::now();
        let summary = RunSummary {
            archive: "crawl.tar.gz".to_string(),
            outcome: RunOutcome::EmptyExtraction,
            row_bytes: 0,
            shard_count: 0,
            started_at,
            finished_at: started_at + Duration::milliseconds(1500),
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["outcome"], "empty_extraction");
        assert_eq!(json["shard_count"], 0);
        assert!((summary.elapsed_secs() - 1.5).abs() < f64::EPSILON);
    }
}
