// Batch summary statistics for the report header.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::features::text::{char_length, normalize_for_dedup};
use crate::pipeline::AnalysisRun;
use crate::scoring::Classification;

/// Comments shorter than this many characters count as very short.
pub const SHORT_COMMENT_CHARS: usize = 10;
/// Comments longer than this many characters count as long.
pub const LONG_COMMENT_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub analyzed: usize,
    pub skipped: usize,
    pub unique_texts: usize,
    pub duplicates: usize,
    pub short_comments: usize,
    pub long_comments: usize,
    pub average_length: f64,
    pub normal: usize,
    pub medium: usize,
    pub high: usize,
    pub degraded_detectors: Vec<String>,
}

impl BatchSummary {
    pub fn from_run(run: &AnalysisRun) -> Self {
        let lengths: Vec<usize> = run
            .records
            .iter()
            .map(|r| char_length(&r.comment.text))
            .collect();
        let unique: HashSet<String> = run
            .records
            .iter()
            .map(|r| normalize_for_dedup(&r.comment.text))
            .collect();

        let average_length = if lengths.is_empty() {
            0.0
        } else {
            lengths.iter().sum::<usize>() as f64 / lengths.len() as f64
        };

        let mut degraded_detectors = Vec::new();
        if run.metadata.isolation.is_degraded() {
            degraded_detectors.push(format!("isolation: {}", run.metadata.isolation));
        }
        if run.metadata.clustering.is_degraded() {
            degraded_detectors.push(format!("clustering: {}", run.metadata.clustering));
        }

        Self {
            total: run.metadata.batch_size,
            analyzed: run.metadata.analyzed,
            skipped: run.metadata.skipped,
            unique_texts: unique.len(),
            duplicates: run.records.iter().filter(|r| r.is_duplicate).count(),
            short_comments: lengths.iter().filter(|&&l| l < SHORT_COMMENT_CHARS).count(),
            long_comments: lengths.iter().filter(|&&l| l > LONG_COMMENT_CHARS).count(),
            average_length,
            normal: run.count(Classification::Normal),
            medium: run.count(Classification::MediumSuspicion),
            high: run.count(Classification::HighSuspicion),
            degraded_detectors,
        }
    }

    /// Share of analyzed comments flagged by at least one detector.
    pub fn suspicious_share(&self) -> f64 {
        if self.analyzed == 0 {
            0.0
        } else {
            (self.medium + self.high) as f64 / self.analyzed as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::{Comment, Platform};
    use crate::config::AnalysisConfig;
    use crate::pipeline;

    #[test]
    fn test_summary_counts() {
        let comments = vec![
            Comment::new(Platform::Tiktok, "1", "a", "ok"),
            Comment::new(Platform::Tiktok, "2", "b", "OK "),
            Comment::new(Platform::Tiktok, "3", "c", "x".repeat(120)),
            Comment::new(Platform::Tiktok, "4", "d", ""),
        ];
        let run = pipeline::run(comments, &AnalysisConfig::default()).unwrap();
        let summary = BatchSummary::from_run(&run);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.analyzed, 3);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.unique_texts, 2);
        assert_eq!(summary.duplicates, 2);
        assert_eq!(summary.short_comments, 2);
        assert_eq!(summary.long_comments, 1);
        assert!((summary.average_length - 124.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.normal + summary.medium + summary.high, 3);
        // Three comments is below the clustering neighborhood size
        assert_eq!(summary.degraded_detectors.len(), 1);
    }
}
