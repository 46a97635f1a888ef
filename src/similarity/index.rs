// Similarity index — nearest-neighbor similarity and duplicate flags.
//
// For each comment we want only one number: its highest cosine similarity
// to any other comment in the batch. Instead of materializing the N x N
// matrix, an inverted index (term -> documents containing it) is used so
// only pairs that share at least one term are ever touched. Worst case is
// still quadratic, which is why batch size is capped upstream.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::tfidf::{fit_transform, SparseVector};
use crate::config::SimilarityConfig;
use crate::features::text::normalize_for_dedup;

/// Similarity facts for one comment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityEntry {
    /// Highest cosine similarity to any other comment, in [0, 1].
    pub max_similarity: f64,
    /// `max_similarity` reached the duplicate threshold.
    pub is_duplicate: bool,
    /// Another comment has the same trimmed, lowercased text.
    pub exact_duplicate: bool,
}

/// Batch-scoped similarity facts, aligned with the input texts.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    pub entries: Vec<SimilarityEntry>,
    /// Fewer than two comments, so there was nothing to compare against.
    pub degraded: bool,
}

impl SimilarityIndex {
    /// Build the index for a batch of texts.
    pub fn build(texts: &[&str], config: &SimilarityConfig) -> Self {
        let n = texts.len();
        if n < 2 {
            return Self {
                entries: vec![
                    SimilarityEntry {
                        max_similarity: 0.0,
                        is_duplicate: false,
                        exact_duplicate: false,
                    };
                    n
                ],
                degraded: true,
            };
        }

        let exact = exact_duplicates(texts);
        let model = fit_transform(texts, config.ngram_max);
        let nearest = max_similarities(&model.vectors, model.vocabulary.len());

        let entries: Vec<SimilarityEntry> = nearest
            .into_iter()
            .zip(exact)
            .map(|(sim, exact_duplicate)| {
                // Exact copies are 1.0 by definition, not "whatever the float
                // arithmetic happened to produce".
                let max_similarity = if exact_duplicate {
                    1.0
                } else {
                    sim.clamp(0.0, 1.0)
                };
                SimilarityEntry {
                    max_similarity,
                    is_duplicate: max_similarity >= config.duplicate_threshold,
                    exact_duplicate,
                }
            })
            .collect();

        debug!(
            comments = n,
            vocabulary = model.vocabulary.len(),
            duplicates = entries.iter().filter(|e| e.is_duplicate).count(),
            "Built similarity index"
        );

        Self {
            entries,
            degraded: false,
        }
    }
}

/// For each text, whether another text in the batch is an exact duplicate
/// after trimming and lowercasing.
fn exact_duplicates(texts: &[&str]) -> Vec<bool> {
    let normalized: Vec<String> = texts.iter().map(|t| normalize_for_dedup(t)).collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for text in &normalized {
        *counts.entry(text.as_str()).or_insert(0) += 1;
    }
    normalized.iter().map(|t| counts[t.as_str()] > 1).collect()
}

/// Highest dot product of each vector with any other vector.
///
/// Accumulation runs over each document's terms in term-id order, so the
/// score for a pair doesn't depend on which document was processed first.
pub fn max_similarities(vectors: &[SparseVector], vocabulary_size: usize) -> Vec<f64> {
    let n = vectors.len();

    let mut postings: Vec<Vec<(usize, f64)>> = vec![Vec::new(); vocabulary_size];
    for (doc, vector) in vectors.iter().enumerate() {
        for &(term, weight) in &vector.entries {
            postings[term].push((doc, weight));
        }
    }

    let mut scores = vec![0.0f64; n];
    let mut touched: Vec<usize> = Vec::new();
    let mut best = vec![0.0f64; n];

    for (doc, vector) in vectors.iter().enumerate() {
        for &(term, weight) in &vector.entries {
            for &(other, other_weight) in &postings[term] {
                if other == doc {
                    continue;
                }
                if scores[other] == 0.0 {
                    touched.push(other);
                }
                scores[other] += weight * other_weight;
            }
        }

        let mut max = 0.0f64;
        for &other in &touched {
            max = max.max(scores[other]);
            scores[other] = 0.0;
        }
        touched.clear();
        best[doc] = max;
    }

    best
}
