// Pipeline — one batch analysis run, end to end.

pub mod analyze;

pub use analyze::{
    extract_features, run, AnalysisRun, ClassifiedComment, FeatureRow, FeatureTable, RunMetadata,
};
