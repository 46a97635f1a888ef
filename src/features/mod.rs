// Feature extraction — text, behavioral, and temporal features per comment.

pub mod extractor;
pub mod temporal;
pub mod text;

pub use extractor::{extract, extract_batch, AuthorFrequency, FeatureVector};
