// Unit tests for feature extraction.
//
// Tests the text helpers (emoji, uppercase ratio, lengths), temporal
// features with offsets and wrap-around night windows, and the shape of
// the extracted vectors.

use astroturf::comments::{Comment, Platform};
use astroturf::config::{FeatureConfig, NightWindow};
use astroturf::features::temporal::{temporal_features, MISSING};
use astroturf::features::text::{char_length, count_emoji, uppercase_ratio, word_count};
use astroturf::features::{extract, extract_batch, AuthorFrequency, FeatureVector};
use astroturf::similarity::SimilarityEntry;
use chrono::{TimeZone, Utc};

fn no_similarity() -> SimilarityEntry {
    SimilarityEntry {
        max_similarity: 0.0,
        is_duplicate: false,
        exact_duplicate: false,
    }
}

// ============================================================
// Text helpers
// ============================================================

#[test]
fn emoji_counts_each_pictograph() {
    assert_eq!(count_emoji("🔥🔥🔥 so good 😂"), 4);
}

#[test]
fn emoji_ignores_skin_tone_and_joiners() {
    // thumbs up + medium skin tone
    assert_eq!(count_emoji("👍🏽"), 1);
    // woman + ZWJ + laptop
    assert_eq!(count_emoji("👩\u{200D}💻"), 2);
}

#[test]
fn flags_count_as_two_regional_indicators() {
    assert_eq!(count_emoji("🇲🇽"), 2);
}

#[test]
fn plain_text_has_no_emoji() {
    assert_eq!(count_emoji("no emoji here :) <3"), 0);
}

#[test]
fn uppercase_ratio_without_letters_is_zero() {
    assert_eq!(uppercase_ratio("123 !!! 🔥"), 0.0);
    assert_eq!(uppercase_ratio(""), 0.0);
}

#[test]
fn uppercase_ratio_counts_letters_only() {
    assert!((uppercase_ratio("ABcd 12") - 0.5).abs() < 1e-12);
    assert_eq!(uppercase_ratio("SHOUTING!!!"), 1.0);
}

#[test]
fn lengths_use_trimmed_characters() {
    assert_eq!(char_length("  héllo  "), 5);
    assert_eq!(word_count("  one two\tthree\n"), 3);
}

// ============================================================
// Temporal features
// ============================================================

#[test]
fn missing_timestamp_uses_sentinel() {
    let t = temporal_features(None, &FeatureConfig::default());
    assert_eq!(t.hour_of_day, MISSING);
    assert_eq!(t.day_of_week, MISSING);
    assert_eq!(t.late_night, 0.0);
}

#[test]
fn utc_offset_shifts_hour_and_day() {
    // 2024-03-06 02:00 UTC is Tuesday 20:00 at UTC-6
    let ts = Utc.with_ymd_and_hms(2024, 3, 6, 2, 0, 0).unwrap();
    let config = FeatureConfig {
        utc_offset_minutes: -360,
        ..FeatureConfig::default()
    };
    let t = temporal_features(Some(&ts), &config);
    assert_eq!(t.hour_of_day, 20.0);
    assert_eq!(t.day_of_week, 1.0);
    assert_eq!(t.late_night, 0.0);
}

#[test]
fn wrapping_night_window_flags_late_evening() {
    let ts = Utc.with_ymd_and_hms(2024, 3, 6, 23, 30, 0).unwrap();
    let config = FeatureConfig {
        night_window: NightWindow {
            start_hour: 22,
            end_hour: 5,
        },
        ..FeatureConfig::default()
    };
    assert_eq!(temporal_features(Some(&ts), &config).late_night, 1.0);
    assert_eq!(
        temporal_features(Some(&ts), &FeatureConfig::default()).late_night,
        0.0
    );
}

// ============================================================
// Extraction
// ============================================================

#[test]
fn vector_width_follows_engagement_setting() {
    let c = Comment::new(Platform::Facebook, "1", "a", "hello").with_engagement(12, 3);
    let authors = AuthorFrequency::from_comments([&c]);
    let fv = extract(&c, &authors, &no_similarity(), &FeatureConfig::default());

    assert_eq!(fv.to_row(false).len(), 10);
    assert_eq!(fv.to_row(true).len(), 12);
    assert_eq!(FeatureVector::column_names(true)[10], "likes");
    // Engagement is always carried on the vector itself
    assert_eq!(fv.likes, 12.0);
    assert_eq!(fv.reply_count, 3.0);
}

#[test]
fn author_frequency_counts_whole_batch() {
    let comments = [
        Comment::new(Platform::Tiktok, "1", "spammer", "one"),
        Comment::new(Platform::Tiktok, "2", "spammer", "two"),
        Comment::new(Platform::Tiktok, "3", "someone", "three"),
    ];
    let refs: Vec<&Comment> = comments.iter().collect();
    let features = extract_batch(&refs, &[no_similarity(); 3], &FeatureConfig::default());

    assert_eq!(features[0].author_frequency, 2.0);
    assert_eq!(features[1].author_frequency, 2.0);
    assert_eq!(features[2].author_frequency, 1.0);
}

#[test]
fn similarity_entry_flows_into_vector() {
    let c = Comment::new(Platform::Tiktok, "1", "a", "copy");
    let entry = SimilarityEntry {
        max_similarity: 1.0,
        is_duplicate: true,
        exact_duplicate: true,
    };
    let authors = AuthorFrequency::from_comments([&c]);
    let fv = extract(&c, &authors, &entry, &FeatureConfig::default());
    assert_eq!(fv.max_similarity, 1.0);
    assert_eq!(fv.exact_duplicate, 1.0);
}
