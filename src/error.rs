// Error taxonomy for the scoring engine.
//
// Configuration problems abort a run before any computation. Malformed
// records never abort a run — they're reported as skips alongside the
// classified output. Degenerate batches aren't errors at all; they show up
// as degraded detectors in the run metadata.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An invalid detector or feature parameter.
///
/// Returned by `AnalysisConfig::validate`. Values are never clamped into
/// range, so a run either uses exactly the stated configuration or doesn't
/// happen.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("contamination must be in (0, 0.5], got {0}")]
    Contamination(f64),

    #[error("neighborhood radius (eps) must be a positive finite number, got {0}")]
    Radius(f64),

    #[error("minimum neighborhood size must be at least 1")]
    ZeroNeighborhood,

    #[error("isolation forest needs at least one tree")]
    ZeroTrees,

    #[error("isolation forest sample size must be at least 2, got {0}")]
    SampleSize(usize),

    #[error("duplicate similarity threshold must be in (0, 1], got {0}")]
    DuplicateThreshold(f64),

    #[error("night window {start}-{end} is invalid (hours 0-24, start != end)")]
    NightWindow { start: u32, end: u32 },

    #[error("n-gram size must be between 1 and 3, got {0}")]
    NgramSize(usize),

    #[error("maximum batch size must be at least 1")]
    ZeroBatchLimit,

    #[error("UTC offset must be within +/-18 hours, got {0} minutes")]
    UtcOffset(i32),

    #[error("{key} has an unparsable value {value:?}")]
    Unparsable { key: String, value: String },
}

/// A failure that aborts an analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The pairwise similarity stage is quadratic in the batch size, so
    /// batches above the configured limit are refused up front.
    #[error("batch of {size} comments exceeds the limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },
}

/// The numeric backend refused a detector's input.
///
/// Never aborts a run. The affected detector reports itself degraded and
/// contributes no flags.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectError {
    #[error("could not build feature matrix: {0}")]
    Matrix(String),

    #[error("standardization failed: {0}")]
    Scaler(String),

    #[error("{detector} failed to fit: {detail}")]
    Fit {
        detector: &'static str,
        detail: String,
    },
}

/// Why a record was excluded from the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Text missing, empty, or whitespace-only.
    EmptyText,
    /// Another record earlier in the batch already used this comment_id.
    DuplicateCommentId,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::EmptyText => "empty text",
            SkipReason::DuplicateCommentId => "duplicate comment_id",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A record rejected before feature extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRecord {
    /// Position of the record in the input sequence.
    pub index: usize,
    pub comment_id: String,
    pub reason: SkipReason,
}
