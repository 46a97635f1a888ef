// Scoring — fusion of detector verdicts into a per-comment classification.

pub mod classification;

pub use classification::{classify, classify_verdict, Classification};
