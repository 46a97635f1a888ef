// Unit tests for scrape-result ingestion.
//
// Tests the unified scrape result format, the legacy TikTok export, author
// id fallbacks, combining several files, and how ingested records flow into
// batch validation.

use astroturf::comments::ingest::{
    combine_sources, parse_scrape_json, parse_scrape_source, ANONYMOUS_AUTHOR,
};
use astroturf::comments::validate::validate_batch;
use astroturf::comments::Platform;
use astroturf::config::AnalysisConfig;
use astroturf::error::SkipReason;
use astroturf::pipeline;

const UNIFIED: &str = r#"{
    "platform": "facebook",
    "source_url": "https://facebook.com/post/1",
    "extracted_at": "2024-03-06T12:00:00",
    "post": {"id": "1", "text": "post body"},
    "comments": [
        {
            "comment_id": "c1",
            "text": "Great post!",
            "likes": 4,
            "reply_count": 1,
            "is_reply": false,
            "created_at": 1709690400,
            "user": {"id": "u1", "username": "alice", "display_name": "Alice"}
        },
        {
            "comment_id": "c2",
            "text": "",
            "created_at": 0,
            "user": {"username": "bob"}
        },
        {
            "text": "no id or user",
            "user": {"display_name": "Carol"}
        }
    ]
}"#;

#[test]
fn unified_result_maps_fields() {
    let comments = parse_scrape_json(UNIFIED).unwrap();
    assert_eq!(comments.len(), 3);

    let first = &comments[0];
    assert_eq!(first.platform, Platform::Facebook);
    assert_eq!(first.comment_id, "c1");
    assert_eq!(first.author_id, "u1");
    assert_eq!(first.likes, 4);
    assert_eq!(first.reply_count, 1);
    assert_eq!(first.created_at.unwrap().timestamp(), 1709690400);
}

#[test]
fn zero_timestamp_is_absent() {
    let comments = parse_scrape_json(UNIFIED).unwrap();
    assert!(comments[1].created_at.is_none());
}

#[test]
fn author_and_id_fallbacks() {
    let comments = parse_scrape_json(UNIFIED).unwrap();
    assert_eq!(comments[1].author_id, "bob");
    assert_eq!(comments[2].author_id, "Carol");
    assert_eq!(comments[2].comment_id, "facebook-2");
}

#[test]
fn empty_text_is_skipped_by_validation() {
    let comments = parse_scrape_json(UNIFIED).unwrap();
    let (kept, skipped) = validate_batch(comments);
    assert_eq!(kept.len(), 2);
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].comment_id, "c2");
    assert_eq!(skipped[0].reason, SkipReason::EmptyText);
}

#[test]
fn legacy_tiktok_array_is_accepted() {
    let json = r#"[
        {"comment_id": 7301, "text": "first!!", "likes": 10, "create_time": 1709690400,
         "user": {"username": "tok_user", "nickname": "Tok"}},
        {"comment_id": "7302", "text": "second", "user": {"nickname": "OnlyNick"}}
    ]"#;
    let comments = parse_scrape_json(json).unwrap();
    assert_eq!(comments.len(), 2);
    assert!(comments.iter().all(|c| c.platform == Platform::Tiktok));
    assert_eq!(comments[0].comment_id, "7301");
    assert_eq!(comments[0].author_id, "tok_user");
    assert!(comments[0].created_at.is_some());
    assert_eq!(comments[1].author_id, "OnlyNick");
}

#[test]
fn unknown_platform_is_an_error() {
    let json = r#"{"platform": "myspace", "comments": []}"#;
    assert!(parse_scrape_json(json).is_err());
}

#[test]
fn garbage_is_an_error() {
    assert!(parse_scrape_json("not json").is_err());
    assert!(parse_scrape_json(r#"{"unexpected": true}"#).is_err());
}

#[test]
fn authorless_comments_are_separate_authors() {
    let json = r#"{"platform": "tiktok", "comments": [
        {"comment_id": "1", "text": "first", "user": {}},
        {"comment_id": "2", "text": "second"}
    ]}"#;
    let comments = parse_scrape_json(json).unwrap();
    assert!(comments.iter().all(|c| c.author_id.starts_with(ANONYMOUS_AUTHOR)));
    assert_ne!(comments[0].author_id, comments[1].author_id);
}

// ============================================================
// Combining files
// ============================================================

/// A TikTok scrape numbering its comments "1", "2", "3" like the scrapers do.
fn video(post_id: &str, texts: [&str; 3]) -> String {
    let comments: Vec<String> = texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            format!(
                r#"{{"comment_id": "{}", "text": "{text}", "created_at": {},
                    "user": {{"username": "viewer_{post_id}_{i}"}}}}"#,
                i + 1,
                1709690400 + i as i64 * 60
            )
        })
        .collect();
    format!(
        r#"{{"platform": "tiktok", "source_url": "https://tiktok.com/v/{post_id}",
            "post": {{"post_id": "{post_id}"}}, "comments": [{}]}}"#,
        comments.join(",")
    )
}

#[test]
fn source_key_prefers_post_id_then_url_then_fallback() {
    let with_post = parse_scrape_source(&video("111", ["a", "b", "c"]), "a.json").unwrap();
    assert_eq!(with_post.key, "111");

    let url_only = r#"{"platform": "facebook", "source_url": "https://fb.com/p/9", "comments": []}"#;
    assert_eq!(parse_scrape_source(url_only, "b.json").unwrap().key, "https://fb.com/p/9");

    let legacy = r#"[{"comment_id": 1, "text": "hi"}]"#;
    assert_eq!(parse_scrape_source(legacy, "c.json").unwrap().key, "c.json");
}

#[test]
fn single_source_keeps_scraped_ids() {
    let source = parse_scrape_source(&video("111", ["a", "b", "c"]), "a.json").unwrap();
    let ids: Vec<String> = combine_sources(vec![source])
        .into_iter()
        .map(|c| c.comment_id)
        .collect();
    assert_eq!(ids, ["1", "2", "3"]);
}

#[test]
fn two_videos_with_positional_ids_are_both_analyzed() {
    let first = parse_scrape_source(
        &video("111", ["love this song", "who is here in 2024", "the bridge is great"]),
        "first.json",
    )
    .unwrap();
    let second = parse_scrape_source(
        &video("222", ["what a save", "referee was blind", "best match this season"]),
        "second.json",
    )
    .unwrap();

    let batch = combine_sources(vec![first, second]);
    let run = pipeline::run(batch, &AnalysisConfig::default()).unwrap();

    assert_eq!(run.records.len(), 6);
    assert!(run.skipped.is_empty(), "skipped {:?}", run.skipped);
    let ids: Vec<&str> = run.records.iter().map(|r| r.comment.comment_id.as_str()).collect();
    assert_eq!(ids, ["111/1", "111/2", "111/3", "222/1", "222/2", "222/3"]);
}

#[test]
fn same_post_scraped_twice_keeps_first_copy() {
    let texts = ["one", "two", "three"];
    let a = parse_scrape_source(&video("111", texts), "monday.json").unwrap();
    let b = parse_scrape_source(&video("111", texts), "tuesday.json").unwrap();

    let (kept, skipped) = validate_batch(combine_sources(vec![a, b]));
    assert_eq!(kept.len(), 3);
    assert_eq!(skipped.len(), 3);
    assert!(skipped.iter().all(|s| s.reason == SkipReason::DuplicateCommentId));
}

#[test]
fn anonymous_authors_stay_distinct_across_files() {
    let json = r#"{"platform": "tiktok", "post": {"post_id": "P"},
                   "comments": [{"comment_id": "1", "text": "hello"}]}"#;
    let other = r#"{"platform": "tiktok", "post": {"post_id": "Q"},
                    "comments": [{"comment_id": "1", "text": "hello"}]}"#;
    let batch = combine_sources(vec![
        parse_scrape_source(json, "p.json").unwrap(),
        parse_scrape_source(other, "q.json").unwrap(),
    ]);
    assert_eq!(batch[0].author_id, format!("{ANONYMOUS_AUTHOR}P/1"));
    assert_ne!(batch[0].author_id, batch[1].author_id);
}
