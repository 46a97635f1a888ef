// Feature extraction — one fixed-shape numeric vector per comment.
//
// The batch-wide inputs (author frequencies, similarity entries) are built
// once before extraction starts and passed in read-only. Per-comment
// extraction is then a pure function and doesn't care about batch order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::temporal::temporal_features;
use super::text;
use crate::comments::Comment;
use crate::config::FeatureConfig;
use crate::similarity::SimilarityEntry;

/// Detector column names, in matrix order. Engagement columns are appended
/// only when `FeatureConfig::include_engagement` is set.
pub const CORE_FEATURES: [&str; 10] = [
    "char_length",
    "word_count",
    "emoji_count",
    "uppercase_ratio",
    "exact_duplicate",
    "author_frequency",
    "max_similarity",
    "hour_of_day",
    "day_of_week",
    "late_night",
];

pub const ENGAGEMENT_FEATURES: [&str; 2] = ["likes", "reply_count"];

/// Numeric features for one comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    // Text
    pub char_length: f64,
    pub word_count: f64,
    pub emoji_count: f64,
    pub uppercase_ratio: f64,
    pub exact_duplicate: f64,
    // Behavioral
    pub author_frequency: f64,
    pub max_similarity: f64,
    // Temporal (-1.0 when the timestamp is missing)
    pub hour_of_day: f64,
    pub day_of_week: f64,
    pub late_night: f64,
    // Auxiliary engagement
    pub likes: f64,
    pub reply_count: f64,
}

impl FeatureVector {
    /// The row this vector contributes to the detector matrix.
    pub fn to_row(&self, include_engagement: bool) -> Vec<f64> {
        let mut row = vec![
            self.char_length,
            self.word_count,
            self.emoji_count,
            self.uppercase_ratio,
            self.exact_duplicate,
            self.author_frequency,
            self.max_similarity,
            self.hour_of_day,
            self.day_of_week,
            self.late_night,
        ];
        if include_engagement {
            row.push(self.likes);
            row.push(self.reply_count);
        }
        row
    }

    pub fn column_names(include_engagement: bool) -> Vec<&'static str> {
        let mut names = CORE_FEATURES.to_vec();
        if include_engagement {
            names.extend_from_slice(&ENGAGEMENT_FEATURES);
        }
        names
    }
}

/// How many comments each author posted in the batch.
///
/// Built once per batch. Counts include the comment being scored, so a lone
/// comment has frequency 1.
#[derive(Debug, Clone, Default)]
pub struct AuthorFrequency {
    counts: HashMap<String, usize>,
}

impl AuthorFrequency {
    pub fn from_comments<'a>(comments: impl IntoIterator<Item = &'a Comment>) -> Self {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for comment in comments {
            *counts.entry(comment.author_id.clone()).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn get(&self, author_id: &str) -> usize {
        self.counts.get(author_id).copied().unwrap_or(0)
    }

    pub fn distinct_authors(&self) -> usize {
        self.counts.len()
    }
}

/// Extract the feature vector of one comment.
pub fn extract(
    comment: &Comment,
    authors: &AuthorFrequency,
    similarity: &SimilarityEntry,
    config: &FeatureConfig,
) -> FeatureVector {
    let temporal = temporal_features(comment.created_at.as_ref(), config);

    FeatureVector {
        char_length: text::char_length(&comment.text) as f64,
        word_count: text::word_count(&comment.text) as f64,
        emoji_count: text::count_emoji(&comment.text) as f64,
        uppercase_ratio: text::uppercase_ratio(&comment.text),
        exact_duplicate: if similarity.exact_duplicate { 1.0 } else { 0.0 },
        author_frequency: authors.get(&comment.author_id) as f64,
        max_similarity: similarity.max_similarity,
        hour_of_day: temporal.hour_of_day,
        day_of_week: temporal.day_of_week,
        late_night: temporal.late_night,
        likes: comment.likes as f64,
        reply_count: comment.reply_count as f64,
    }
}

/// Extract feature vectors for a whole batch.
///
/// `similarity` must be aligned with `comments`. The author table is built
/// here, once, and shared by every extraction.
pub fn extract_batch(
    comments: &[&Comment],
    similarity: &[SimilarityEntry],
    config: &FeatureConfig,
) -> Vec<FeatureVector> {
    let authors = AuthorFrequency::from_comments(comments.iter().copied());
    comments
        .iter()
        .zip(similarity)
        .map(|(comment, entry)| extract(comment, &authors, entry, config))
        .collect()
}
