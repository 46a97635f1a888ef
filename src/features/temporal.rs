// Temporal features — hour of day, day of week, late-night flag.
//
// Late-night posting is one of the classic bot signals: scheduled accounts
// don't sleep. Missing timestamps are imputed with a sentinel instead of
// being dropped, so every comment keeps a row in the feature matrix.

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};

use crate::config::FeatureConfig;

/// Value used for hour-of-day and day-of-week when `created_at` is absent.
pub const MISSING: f64 = -1.0;

/// Temporal features for one comment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporalFeatures {
    /// 0-23, or `MISSING`
    pub hour_of_day: f64,
    /// 0-6 with Monday = 0, or `MISSING`
    pub day_of_week: f64,
    /// 1.0 inside the night window, 0.0 otherwise (including missing timestamps)
    pub late_night: f64,
}

impl TemporalFeatures {
    pub const fn missing() -> Self {
        Self {
            hour_of_day: MISSING,
            day_of_week: MISSING,
            late_night: 0.0,
        }
    }
}

pub fn temporal_features(
    created_at: Option<&DateTime<Utc>>,
    config: &FeatureConfig,
) -> TemporalFeatures {
    let Some(ts) = created_at else {
        return TemporalFeatures::missing();
    };

    // Validated config keeps the offset within +/-18h, which FixedOffset accepts.
    let Some(offset) = FixedOffset::east_opt(config.utc_offset_minutes * 60) else {
        return TemporalFeatures::missing();
    };
    let local = ts.with_timezone(&offset);

    let hour = local.hour();
    TemporalFeatures {
        hour_of_day: hour as f64,
        day_of_week: local.weekday().num_days_from_monday() as f64,
        late_night: if config.night_window.contains(hour) {
            1.0
        } else {
            0.0
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_missing_timestamp_uses_sentinel() {
        let f = temporal_features(None, &FeatureConfig::default());
        assert_eq!(f.hour_of_day, MISSING);
        assert_eq!(f.day_of_week, MISSING);
        assert_eq!(f.late_night, 0.0);
    }

    #[test]
    fn test_three_am_is_late_night() {
        // 2024-03-06 is a Wednesday
        let ts = Utc.with_ymd_and_hms(2024, 3, 6, 3, 15, 0).unwrap();
        let f = temporal_features(Some(&ts), &FeatureConfig::default());
        assert_eq!(f.hour_of_day, 3.0);
        assert_eq!(f.day_of_week, 2.0);
        assert_eq!(f.late_night, 1.0);
    }

    #[test]
    fn test_utc_offset_shifts_hour_and_day() {
        // 02:00 UTC Wednesday is 20:00 Tuesday at UTC-6
        let ts = Utc.with_ymd_and_hms(2024, 3, 6, 2, 0, 0).unwrap();
        let config = FeatureConfig {
            utc_offset_minutes: -360,
            ..FeatureConfig::default()
        };
        let f = temporal_features(Some(&ts), &config);
        assert_eq!(f.hour_of_day, 20.0);
        assert_eq!(f.day_of_week, 1.0);
        assert_eq!(f.late_night, 0.0);
    }
}
