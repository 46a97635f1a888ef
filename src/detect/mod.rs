// Anomaly detection — isolation forest and density clustering over the
// standardized feature matrix.

pub mod dbscan;
pub mod ensemble;
pub mod isolation;
pub mod matrix;

pub use ensemble::{AnomalyVerdict, DetectorStatus, EnsembleResult};
pub use matrix::FeatureMatrix;
