// Density clustering (DBSCAN) — flags comments that sit in no dense region.
//
// A point is "core" when at least `min_samples` points (itself included) lie
// within `eps` of it. Clusters grow outward from core points; anything not
// reachable from a core point is noise. Coordinated comments usually cluster
// tightly with each other, so in a large organic batch the campaign forms
// its own small region, and in a small batch it is the noise.
//
// The clustering is aprender's `DBSCAN`; this module only decides when it
// can run and reads noise off its labels.

use aprender::cluster::DBSCAN;
use aprender::traits::UnsupervisedEstimator;
use tracing::debug;

use super::ensemble::{DegradedReason, DetectorOutcome};
use super::matrix::FeatureMatrix;
use crate::config::ClusteringConfig;
use crate::error::DetectError;

/// Label aprender gives to rows outside every cluster.
pub const NOISE: i32 = -1;

/// Cluster the rows of `matrix`, one label per row. Noise is [`NOISE`],
/// clusters are numbered from 0.
///
/// Cluster ids depend on row order. Whether a row is noise does not: that
/// only depends on its distance to core points.
pub fn cluster_labels(
    matrix: &FeatureMatrix,
    eps: f64,
    min_samples: usize,
) -> Result<Vec<i32>, DetectError> {
    let data = matrix.to_matrix()?;
    let mut dbscan = DBSCAN::new(eps as f32, min_samples);
    dbscan.fit(&data).map_err(|e| DetectError::Fit {
        detector: "density clustering",
        detail: e.to_string(),
    })?;
    Ok(dbscan.labels().clone())
}

fn cluster_count(labels: &[i32]) -> usize {
    labels
        .iter()
        .filter(|&&l| l != NOISE)
        .collect::<std::collections::BTreeSet<_>>()
        .len()
}

/// Run the clustering detector over a standardized matrix. Noise rows are
/// flagged.
pub fn detect(matrix: &FeatureMatrix, config: &ClusteringConfig) -> DetectorOutcome {
    let rows = matrix.rows();
    if rows < config.min_samples {
        return DetectorOutcome::Degraded(DegradedReason::TooFewRows {
            rows,
            required: config.min_samples,
        });
    }

    let labels = match cluster_labels(matrix, config.eps, config.min_samples) {
        Ok(labels) => labels,
        Err(e) => {
            return DetectorOutcome::Degraded(DegradedReason::Failed {
                detail: e.to_string(),
            })
        }
    };
    let flags: Vec<bool> = labels.iter().map(|&l| l == NOISE).collect();

    debug!(
        rows,
        clusters = cluster_count(&labels),
        noise = flags.iter().filter(|&&f| f).count(),
        "Density clustering complete"
    );

    DetectorOutcome::Verdicts(flags)
}
