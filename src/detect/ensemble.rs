// Ensemble — runs both detectors over one standardized matrix.
//
// The detectors never see each other's output. Each gets the same
// standardized matrix and returns one boolean per row, or reports that the
// batch was too small for it to say anything. Fusion of the two verdicts
// happens later, in scoring.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::matrix::FeatureMatrix;
use super::{dbscan, isolation};
use crate::config::AnalysisConfig;

/// Why a detector produced no verdicts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DegradedReason {
    TooFewRows { rows: usize, required: usize },
    /// The numeric backend rejected the matrix.
    Failed { detail: String },
}

impl std::fmt::Display for DegradedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DegradedReason::TooFewRows { rows, required } => {
                write!(f, "{rows} comments, needs at least {required}")
            }
            DegradedReason::Failed { detail } => write!(f, "{detail}"),
        }
    }
}

/// What one detector had to say about a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectorOutcome {
    /// One flag per row.
    Verdicts(Vec<bool>),
    /// The batch was too small; every row counts as not flagged.
    Degraded(DegradedReason),
}

impl DetectorOutcome {
    /// Per-row flags. A degraded detector flags nothing.
    pub fn flags(&self, rows: usize) -> Vec<bool> {
        match self {
            DetectorOutcome::Verdicts(flags) => flags.clone(),
            DetectorOutcome::Degraded(_) => vec![false; rows],
        }
    }

    pub fn status(&self) -> DetectorStatus {
        match self {
            DetectorOutcome::Verdicts(flags) => DetectorStatus::Ran {
                flagged: flags.iter().filter(|&&f| f).count(),
            },
            DetectorOutcome::Degraded(reason) => DetectorStatus::Degraded {
                reason: reason.clone(),
            },
        }
    }
}

/// Run-level summary of a detector, reported in the run metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DetectorStatus {
    Ran { flagged: usize },
    Degraded { reason: DegradedReason },
}

impl DetectorStatus {
    pub fn is_degraded(&self) -> bool {
        matches!(self, DetectorStatus::Degraded { .. })
    }
}

impl std::fmt::Display for DetectorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectorStatus::Ran { flagged } => write!(f, "ran, {flagged} flagged"),
            DetectorStatus::Degraded { reason } => write!(f, "degraded ({reason})"),
        }
    }
}

/// The two detector verdicts for one comment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyVerdict {
    pub flagged_by_isolation: bool,
    pub flagged_by_clustering: bool,
}

/// Verdicts for every row plus per-detector status.
#[derive(Debug, Clone)]
pub struct EnsembleResult {
    pub verdicts: Vec<AnomalyVerdict>,
    pub isolation: DetectorStatus,
    pub clustering: DetectorStatus,
}

/// Standardize `raw` once and run both detectors over it.
///
/// Rows must already be in the caller's canonical order; the isolation
/// forest's sampling depends on it.
pub fn run(raw: &FeatureMatrix, config: &AnalysisConfig) -> EnsembleResult {
    let rows = raw.rows();

    let (isolation, clustering) = match raw.standardize() {
        Ok(standardized) => (
            isolation::detect(&standardized, &config.isolation),
            dbscan::detect(&standardized, &config.clustering),
        ),
        Err(e) => {
            let reason = DegradedReason::Failed {
                detail: e.to_string(),
            };
            (
                DetectorOutcome::Degraded(reason.clone()),
                DetectorOutcome::Degraded(reason),
            )
        }
    };

    if let DetectorOutcome::Degraded(reason) = &isolation {
        warn!(%reason, "Isolation forest skipped");
    }
    if let DetectorOutcome::Degraded(reason) = &clustering {
        warn!(%reason, "Density clustering skipped");
    }

    let verdicts = isolation
        .flags(rows)
        .into_iter()
        .zip(clustering.flags(rows))
        .map(|(flagged_by_isolation, flagged_by_clustering)| AnomalyVerdict {
            flagged_by_isolation,
            flagged_by_clustering,
        })
        .collect();

    let result = EnsembleResult {
        verdicts,
        isolation: isolation.status(),
        clustering: clustering.status(),
    };

    info!(
        rows,
        features = raw.cols(),
        isolation = %result.isolation,
        clustering = %result.clustering,
        "Anomaly detection complete"
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degraded_flags_nothing() {
        let outcome = DetectorOutcome::Degraded(DegradedReason::TooFewRows {
            rows: 1,
            required: 2,
        });
        assert_eq!(outcome.flags(1), vec![false]);
        assert!(outcome.status().is_degraded());
    }

    #[test]
    fn test_single_row_degrades_both() {
        let m = FeatureMatrix::from_rows(&[vec![3.0, 1.0]]).unwrap();
        let result = run(&m, &AnalysisConfig::default());
        assert!(result.isolation.is_degraded());
        assert!(result.clustering.is_degraded());
        assert_eq!(result.verdicts, vec![AnomalyVerdict::default()]);
    }

    #[test]
    fn test_small_batch_runs_isolation_only() {
        let rows: Vec<Vec<f64>> = (0..3).map(|i| vec![i as f64]).collect();
        let m = FeatureMatrix::from_rows(&rows).unwrap();
        let result = run(&m, &AnalysisConfig::default());
        assert!(!result.isolation.is_degraded());
        assert!(result.clustering.is_degraded());
    }
}
