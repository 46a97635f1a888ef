// Text similarity — batch TF-IDF and nearest-neighbor duplicate detection.

pub mod index;
pub mod tfidf;

pub use index::{SimilarityEntry, SimilarityIndex};
