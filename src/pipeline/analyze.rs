// Batch analysis pipeline: comments in, classified comments out.
//
// Steps:
// 1. Validate the configuration (abort on error, nothing computed yet)
// 2. Validate records, collecting skips
// 3. Put the kept comments into canonical order (ascending comment_id)
// 4. Build the batch-wide similarity index
// 5. Extract one feature vector per comment
// 6. Standardize and run both detectors
// 7. Fuse verdicts into a classification
// 8. Restore input order
//
// Everything batch-wide runs in canonical order, so shuffling the input only
// shuffles the output, and two runs with the same configuration serialize to
// the same bytes.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::comments::validate::{validate_batch, IndexedComment};
use crate::comments::Comment;
use crate::config::AnalysisConfig;
use crate::detect::{ensemble, AnomalyVerdict, DetectorStatus, FeatureMatrix};
use crate::error::{AnalysisError, SkippedRecord};
use crate::features::{extract_batch, FeatureVector};
use crate::scoring::{classify_verdict, Classification};
use crate::similarity::{SimilarityEntry, SimilarityIndex};

/// One input comment with its similarity facts and classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedComment {
    #[serde(flatten)]
    pub comment: Comment,
    pub max_similarity: f64,
    pub is_duplicate: bool,
    pub bot_score: u8,
    pub bot_classification: Classification,
    pub verdict: AnomalyVerdict,
    pub features: FeatureVector,
}

/// How the run went, reported next to the records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Records supplied, before validation.
    pub batch_size: usize,
    /// Records that made it through validation and were classified.
    pub analyzed: usize,
    pub skipped: usize,
    pub isolation: DetectorStatus,
    pub clustering: DetectorStatus,
    /// Fewer than two comments, so every similarity is 0.0.
    pub similarity_degraded: bool,
    /// Detector columns, in matrix order.
    pub feature_columns: Vec<String>,
    /// The exact configuration the run used.
    pub config: AnalysisConfig,
}

/// The full result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRun {
    /// Classified comments, in input order.
    pub records: Vec<ClassifiedComment>,
    pub skipped: Vec<SkippedRecord>,
    pub metadata: RunMetadata,
}

impl AnalysisRun {
    pub fn count(&self, classification: Classification) -> usize {
        self.records
            .iter()
            .filter(|r| r.bot_classification == classification)
            .count()
    }
}

/// One comment's features, for inspection without running the detectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub comment_id: String,
    pub features: FeatureVector,
}

/// Feature vectors for a batch, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    pub columns: Vec<String>,
    pub rows: Vec<FeatureRow>,
    pub skipped: Vec<SkippedRecord>,
}

/// The stages shared by `run` and `extract_features`, all in canonical order.
struct Prepared {
    kept: Vec<IndexedComment>,
    skipped: Vec<SkippedRecord>,
    similarity: SimilarityIndex,
    features: Vec<FeatureVector>,
}

fn prepare(comments: Vec<Comment>, config: &AnalysisConfig) -> Result<Prepared, AnalysisError> {
    config.validate()?;

    let (mut kept, skipped) = validate_batch(comments);
    if !skipped.is_empty() {
        warn!(skipped = skipped.len(), "Skipped malformed records");
    }

    let limit = config.similarity.max_batch_size;
    if kept.len() > limit {
        return Err(AnalysisError::BatchTooLarge {
            size: kept.len(),
            limit,
        });
    }

    // comment_ids are unique after validation, so this order is total
    kept.sort_by(|a, b| a.comment.comment_id.cmp(&b.comment.comment_id));

    let texts: Vec<&str> = kept.iter().map(|c| c.comment.text.as_str()).collect();
    let similarity = SimilarityIndex::build(&texts, &config.similarity);
    if similarity.degraded {
        warn!(comments = kept.len(), "Similarity degraded: nothing to compare against");
    }

    let refs: Vec<&Comment> = kept.iter().map(|c| &c.comment).collect();
    let features = extract_batch(&refs, &similarity.entries, &config.features);

    Ok(Prepared {
        kept,
        skipped,
        similarity,
        features,
    })
}

fn column_names(config: &AnalysisConfig) -> Vec<String> {
    FeatureVector::column_names(config.features.include_engagement)
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Analyze one batch of comments.
///
/// Fails only on invalid configuration or an oversized batch. Malformed
/// records are skipped and reported; batches too small for a detector run
/// with that detector degraded.
pub fn run(comments: Vec<Comment>, config: &AnalysisConfig) -> Result<AnalysisRun, AnalysisError> {
    let batch_size = comments.len();
    info!(comments = batch_size, "Analyzing batch");

    let Prepared {
        kept,
        skipped,
        similarity,
        features,
    } = prepare(comments, config)?;

    let matrix = FeatureMatrix::from_features(&features, config.features.include_engagement);
    let ensemble = ensemble::run(&matrix, config);

    let mut records: Vec<(usize, ClassifiedComment)> = kept
        .into_iter()
        .zip(similarity.entries)
        .zip(features)
        .zip(ensemble.verdicts)
        .map(|(((indexed, entry), features), verdict)| {
            (indexed.index, classified(indexed.comment, entry, features, verdict))
        })
        .collect();
    records.sort_by_key(|(index, _)| *index);
    let records: Vec<ClassifiedComment> = records.into_iter().map(|(_, r)| r).collect();

    let metadata = RunMetadata {
        batch_size,
        analyzed: records.len(),
        skipped: skipped.len(),
        isolation: ensemble.isolation,
        clustering: ensemble.clustering,
        similarity_degraded: similarity.degraded,
        feature_columns: column_names(config),
        config: config.clone(),
    };

    let run = AnalysisRun {
        records,
        skipped,
        metadata,
    };

    info!(
        analyzed = run.metadata.analyzed,
        skipped = run.metadata.skipped,
        high = run.count(Classification::HighSuspicion),
        medium = run.count(Classification::MediumSuspicion),
        "Batch analysis complete"
    );

    Ok(run)
}

fn classified(
    comment: Comment,
    entry: SimilarityEntry,
    features: FeatureVector,
    verdict: AnomalyVerdict,
) -> ClassifiedComment {
    let classification = classify_verdict(&verdict);
    ClassifiedComment {
        comment,
        max_similarity: entry.max_similarity,
        is_duplicate: entry.is_duplicate,
        bot_score: classification.bot_score(),
        bot_classification: classification,
        verdict,
        features,
    }
}

/// Validate and featurize a batch without running the detectors.
pub fn extract_features(
    comments: Vec<Comment>,
    config: &AnalysisConfig,
) -> Result<FeatureTable, AnalysisError> {
    let Prepared {
        kept,
        skipped,
        features,
        ..
    } = prepare(comments, config)?;

    let mut rows: Vec<(usize, FeatureRow)> = kept
        .into_iter()
        .zip(features)
        .map(|(indexed, features)| {
            (
                indexed.index,
                FeatureRow {
                    comment_id: indexed.comment.comment_id,
                    features,
                },
            )
        })
        .collect();
    rows.sort_by_key(|(index, _)| *index);

    Ok(FeatureTable {
        columns: column_names(config),
        rows: rows.into_iter().map(|(_, r)| r).collect(),
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::Platform;
    use crate::error::SkipReason;

    fn comment(id: &str, text: &str) -> Comment {
        Comment::new(Platform::Facebook, id, format!("user-{id}"), text)
    }

    #[test]
    fn test_output_is_in_input_order() {
        let input = vec![
            comment("c", "third by id"),
            comment("a", "first by id"),
            comment("b", "second by id"),
        ];
        let run = run(input, &AnalysisConfig::default()).unwrap();
        let ids: Vec<&str> = run.records.iter().map(|r| r.comment.comment_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_invalid_config_aborts() {
        let mut config = AnalysisConfig::default();
        config.isolation.contamination = 0.9;
        let err = run(vec![comment("a", "hi there")], &config).unwrap_err();
        assert!(matches!(err, AnalysisError::Config(_)));
    }

    #[test]
    fn test_oversized_batch_is_refused() {
        let mut config = AnalysisConfig::default();
        config.similarity.max_batch_size = 2;
        let input = vec![comment("a", "one"), comment("b", "two"), comment("c", "three")];
        let err = run(input, &config).unwrap_err();
        assert!(matches!(err, AnalysisError::BatchTooLarge { size: 3, limit: 2 }));
    }

    #[test]
    fn test_blank_records_are_reported() {
        let input = vec![comment("a", "real text"), comment("b", "   ")];
        let run = run(input, &AnalysisConfig::default()).unwrap();
        assert_eq!(run.records.len(), 1);
        assert_eq!(run.skipped.len(), 1);
        assert_eq!(run.skipped[0].reason, SkipReason::EmptyText);
        assert_eq!(run.skipped[0].index, 1);
        assert_eq!(run.metadata.batch_size, 2);
    }

    #[test]
    fn test_empty_batch_degrades_everything() {
        let run = run(Vec::new(), &AnalysisConfig::default()).unwrap();
        assert!(run.records.is_empty());
        assert!(run.metadata.similarity_degraded);
        assert!(run.metadata.isolation.is_degraded());
        assert!(run.metadata.clustering.is_degraded());
    }

    #[test]
    fn test_feature_table_matches_run() {
        let input = vec![comment("b", "hello world"), comment("a", "hello there")];
        let table = extract_features(input.clone(), &AnalysisConfig::default()).unwrap();
        let run = run(input, &AnalysisConfig::default()).unwrap();
        assert_eq!(table.columns.len(), 10);
        for (row, record) in table.rows.iter().zip(&run.records) {
            assert_eq!(row.comment_id, record.comment.comment_id);
            assert_eq!(row.features, record.features);
        }
    }
}
