use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Late-night posting window, `[start_hour, end_hour)` in local hours.
///
/// The window may wrap midnight: 22 -> 5 covers 22:00 through 04:59.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NightWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for NightWindow {
    fn default() -> Self {
        Self {
            start_hour: 0,
            end_hour: 5,
        }
    }
}

impl NightWindow {
    pub fn contains(&self, hour: u32) -> bool {
        if self.start_hour < self.end_hour {
            hour >= self.start_hour && hour < self.end_hour
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.start_hour > 23 || self.end_hour > 24 || self.start_hour == self.end_hour {
            return Err(ConfigError::NightWindow {
                start: self.start_hour,
                end: self.end_hour,
            });
        }
        Ok(())
    }
}

/// Parameters of the per-comment feature extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub night_window: NightWindow,
    /// Fixed offset applied before reading hour-of-day and day-of-week.
    pub utc_offset_minutes: i32,
    /// Feed likes and reply counts to the detectors as extra columns.
    pub include_engagement: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            night_window: NightWindow::default(),
            utc_offset_minutes: 0,
            include_engagement: false,
        }
    }
}

/// Parameters of the batch-wide similarity engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityConfig {
    /// `max_similarity` at or above this marks a comment as a duplicate.
    pub duplicate_threshold: f64,
    /// Largest word n-gram used as a TF-IDF term (1 = unigrams only).
    pub ngram_max: usize,
    /// Upper bound on batch size. Pairwise similarity is quadratic.
    pub max_batch_size: usize,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            duplicate_threshold: 0.9,
            ngram_max: 1,
            max_batch_size: 5_000,
        }
    }
}

/// Parameters of the isolation forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationConfig {
    /// Expected outlier fraction; sets the flag threshold.
    pub contamination: f64,
    pub n_trees: usize,
    /// Rows sampled per tree (capped at the batch size).
    pub max_samples: usize,
    pub seed: u64,
}

impl Default for IsolationConfig {
    fn default() -> Self {
        Self {
            contamination: 0.1,
            n_trees: 100,
            max_samples: 256,
            seed: 42,
        }
    }
}

/// Parameters of the density-clustering detector (DBSCAN).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// Neighborhood radius, Euclidean distance in standardized feature space.
    pub eps: f64,
    /// Points (including the point itself) needed within `eps` to be a core point.
    pub min_samples: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            eps: 2.0,
            min_samples: 5,
        }
    }
}

/// The engine's full configuration surface.
///
/// Two runs over the same input with equal configs produce identical output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub features: FeatureConfig,
    pub similarity: SimilarityConfig,
    pub isolation: IsolationConfig,
    pub clustering: ClusteringConfig,
}

impl AnalysisConfig {
    /// Reject invalid parameters. Nothing is clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.features.night_window.validate()?;
        if self.features.utc_offset_minutes.abs() > 18 * 60 {
            return Err(ConfigError::UtcOffset(self.features.utc_offset_minutes));
        }

        let threshold = self.similarity.duplicate_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::DuplicateThreshold(threshold));
        }
        if !(1..=3).contains(&self.similarity.ngram_max) {
            return Err(ConfigError::NgramSize(self.similarity.ngram_max));
        }
        if self.similarity.max_batch_size == 0 {
            return Err(ConfigError::ZeroBatchLimit);
        }

        let contamination = self.isolation.contamination;
        if !(contamination > 0.0 && contamination <= 0.5) {
            return Err(ConfigError::Contamination(contamination));
        }
        if self.isolation.n_trees == 0 {
            return Err(ConfigError::ZeroTrees);
        }
        if self.isolation.max_samples < 2 {
            return Err(ConfigError::SampleSize(self.isolation.max_samples));
        }

        let eps = self.clustering.eps;
        if !(eps.is_finite() && eps > 0.0) {
            return Err(ConfigError::Radius(eps));
        }
        if self.clustering.min_samples == 0 {
            return Err(ConfigError::ZeroNeighborhood);
        }

        Ok(())
    }

    /// Build a config from `ASTROTURF_*` environment variables.
    ///
    /// Unset variables keep their defaults. A variable that is set but can't
    /// be parsed is an error rather than a silent fallback.
    pub fn from_env() -> Result<Self, ConfigError> {
        let d = Self::default();
        Ok(Self {
            features: FeatureConfig {
                night_window: NightWindow {
                    start_hour: env_or("ASTROTURF_NIGHT_START", d.features.night_window.start_hour)?,
                    end_hour: env_or("ASTROTURF_NIGHT_END", d.features.night_window.end_hour)?,
                },
                utc_offset_minutes: env_or(
                    "ASTROTURF_UTC_OFFSET_MINUTES",
                    d.features.utc_offset_minutes,
                )?,
                include_engagement: env_or(
                    "ASTROTURF_INCLUDE_ENGAGEMENT",
                    d.features.include_engagement,
                )?,
            },
            similarity: SimilarityConfig {
                duplicate_threshold: env_or(
                    "ASTROTURF_DUPLICATE_THRESHOLD",
                    d.similarity.duplicate_threshold,
                )?,
                ngram_max: env_or("ASTROTURF_NGRAM_MAX", d.similarity.ngram_max)?,
                max_batch_size: env_or("ASTROTURF_MAX_BATCH", d.similarity.max_batch_size)?,
            },
            isolation: IsolationConfig {
                contamination: env_or("ASTROTURF_CONTAMINATION", d.isolation.contamination)?,
                n_trees: env_or("ASTROTURF_TREES", d.isolation.n_trees)?,
                max_samples: env_or("ASTROTURF_MAX_SAMPLES", d.isolation.max_samples)?,
                seed: env_or("ASTROTURF_SEED", d.isolation.seed)?,
            },
            clustering: ClusteringConfig {
                eps: env_or("ASTROTURF_EPS", d.clustering.eps)?,
                min_samples: env_or("ASTROTURF_MIN_SAMPLES", d.clustering.min_samples)?,
            },
        })
    }
}

/// Central configuration for the command-line front end.
///
/// Loaded from environment variables; the .env file is loaded at startup via
/// dotenvy. CLI flags override individual analysis parameters afterwards.
pub struct Config {
    pub analysis: AnalysisConfig,
    /// How many batch keywords to show in the report.
    pub top_keywords: usize,
    /// How many suspicious comments to list in the report.
    pub report_limit: usize,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Ok(Self {
            analysis: AnalysisConfig::from_env()?,
            top_keywords: env_or("ASTROTURF_TOP_KEYWORDS", 20)?,
            report_limit: env_or("ASTROTURF_REPORT_LIMIT", 25)?,
        })
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Unparsable {
            key: key.to_string(),
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_night_window_default() {
        let w = NightWindow::default();
        assert!(w.contains(0));
        assert!(w.contains(4));
        assert!(!w.contains(5));
        assert!(!w.contains(23));
    }

    #[test]
    fn test_night_window_wraps_midnight() {
        let w = NightWindow {
            start_hour: 22,
            end_hour: 5,
        };
        assert!(w.contains(22));
        assert!(w.contains(23));
        assert!(w.contains(0));
        assert!(w.contains(4));
        assert!(!w.contains(5));
        assert!(!w.contains(12));
    }

    #[test]
    fn test_empty_night_window_rejected() {
        let mut config = AnalysisConfig::default();
        config.features.night_window = NightWindow {
            start_hour: 3,
            end_hour: 3,
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NightWindow { start: 3, end: 3 })
        );
    }
}
