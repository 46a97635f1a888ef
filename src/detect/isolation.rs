// Isolation forest — flags points that random partitioning isolates quickly.
//
// The forest itself is aprender's `IsolationForest`. Outliers end up in
// short branches of its random trees; points inside the bulk of the data
// take many splits to reach. Averaged over many trees the path length
// becomes a stable score, reported by `score_samples` with lower meaning
// more anomalous.
//
// The forest is seeded from the config and rows arrive in canonical order,
// so a given batch and seed always produce the same scores.

use tracing::debug;

use super::ensemble::{DegradedReason, DetectorOutcome};
use super::matrix::FeatureMatrix;
use crate::config::IsolationConfig;
use crate::error::DetectError;

/// Fit a forest on `matrix` and score every row of it.
pub fn score_samples(
    matrix: &FeatureMatrix,
    config: &IsolationConfig,
) -> Result<Vec<f32>, DetectError> {
    use aprender::prelude::*;

    let data = matrix.to_matrix()?;
    let mut forest = IsolationForest::new()
        .with_n_estimators(config.n_trees)
        .with_max_samples(config.max_samples.min(matrix.rows()))
        .with_contamination(config.contamination as f32)
        .with_random_state(config.seed);
    forest.fit(&data).map_err(|e| DetectError::Fit {
        detector: "isolation forest",
        detail: e.to_string(),
    })?;

    Ok(forest.score_samples(&data))
}

/// Number of rows the contamination fraction asks for, at least one.
pub fn expected_outliers(contamination: f64, rows: usize) -> usize {
    // The epsilon keeps 0.1 * 30 = 3.0000000000000004 from rounding up to 4.
    let k = (contamination * rows as f64 - 1e-9).ceil();
    (k.max(1.0) as usize).min(rows)
}

/// Turn forest scores (lower is more anomalous) into flags.
///
/// A row is flagged when its score is among the lowest `contamination`
/// share (ties at the cut are all flagged) and strictly below the batch
/// median. A batch where nothing stands out from the bulk flags nothing.
pub fn flag_outliers(scores: &[f32], contamination: f64) -> Vec<bool> {
    if scores.is_empty() {
        return Vec::new();
    }

    let mut ranked = scores.to_vec();
    ranked.sort_by(|a, b| a.total_cmp(b));
    let cutoff = ranked[expected_outliers(contamination, scores.len()) - 1];
    let median = ranked[scores.len() / 2];

    scores.iter().map(|&s| s <= cutoff && s < median).collect()
}

/// Run the isolation detector over a standardized matrix.
pub fn detect(matrix: &FeatureMatrix, config: &IsolationConfig) -> DetectorOutcome {
    let rows = matrix.rows();
    if rows < 2 {
        return DetectorOutcome::Degraded(DegradedReason::TooFewRows { rows, required: 2 });
    }
    if matrix.is_uniform() {
        debug!(rows, "Isolation forest skipped, every row is identical");
        return DetectorOutcome::Verdicts(vec![false; rows]);
    }

    let scores = match score_samples(matrix, config) {
        Ok(scores) => scores,
        Err(e) => {
            return DetectorOutcome::Degraded(DegradedReason::Failed {
                detail: e.to_string(),
            })
        }
    };
    let flags = flag_outliers(&scores, config.contamination);

    debug!(
        rows,
        trees = config.n_trees,
        flagged = flags.iter().filter(|&&f| f).count(),
        "Isolation forest complete"
    );

    DetectorOutcome::Verdicts(flags)
}
