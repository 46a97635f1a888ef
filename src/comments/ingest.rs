// Scrape-result ingestion — turns scraper output files into Comment records.
//
// Two file shapes are accepted:
// - the unified scrape result written by the platform scrapers
//   ({ platform, source_url, post, comments: [...] })
// - the older TikTok API export, a bare array of comments using
//   `create_time` and `user.username`
//
// This is the only place in the library that knows about the scrapers'
// field names. Everything downstream sees plain `Comment`s.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use super::models::{Comment, Platform};

/// A scraper's user object. Every field is optional in practice.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapedUser {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, alias = "nickname")]
    pub display_name: String,
    #[serde(default)]
    pub verified: bool,
}

/// Prefix of the author id given to a comment whose user has no id,
/// username or display name. Each such comment counts as its own author.
pub const ANONYMOUS_AUTHOR: &str = "anonymous:";

impl ScrapedUser {
    /// Stable author identifier: id, then username, then display name.
    pub fn author_id(&self) -> Option<&str> {
        [&self.id, &self.username, &self.display_name]
            .into_iter()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
    }
}

fn anonymous_author(comment_id: &str) -> String {
    format!("{ANONYMOUS_AUTHOR}{comment_id}")
}

/// Comment ids show up as strings in the unified format and occasionally as
/// numbers in older exports.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScrapedId {
    Text(String),
    Number(i64),
}

impl ScrapedId {
    fn into_string(self) -> String {
        match self {
            ScrapedId::Text(s) => s,
            ScrapedId::Number(n) => n.to_string(),
        }
    }
}

/// One comment as written by a scraper.
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapedComment {
    #[serde(default)]
    pub comment_id: Option<ScrapedId>,
    /// Missing text is kept as empty so validation can report the skip.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub is_reply: bool,
    /// Unix seconds; 0 means the scraper couldn't determine it.
    #[serde(default, alias = "create_time")]
    pub created_at: i64,
    #[serde(default)]
    pub user: ScrapedUser,
    #[serde(default)]
    pub parent_comment_id: Option<String>,
}

/// The post a scrape result was taken from.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapedPost {
    #[serde(default)]
    pub post_id: Option<ScrapedId>,
}

/// The unified scrape result written by the platform scrapers.
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeResult {
    pub platform: String,
    #[serde(default)]
    pub source_url: String,
    #[serde(default)]
    pub post: Option<ScrapedPost>,
    #[serde(default)]
    pub extracted_at: String,
    #[serde(default)]
    pub comments: Vec<ScrapedComment>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScrapeFile {
    Unified(ScrapeResult),
    LegacyTiktok(Vec<ScrapedComment>),
}

/// Convert a unix timestamp into a UTC datetime. Zero and out-of-range values
/// are treated as absent.
pub fn timestamp_from_unix(secs: i64) -> Option<DateTime<Utc>> {
    if secs <= 0 {
        return None;
    }
    DateTime::<Utc>::from_timestamp(secs, 0)
}

impl ScrapedComment {
    /// Convert to an engine `Comment`. `position` is used to synthesize an id
    /// when the scraper didn't record one.
    pub fn into_comment(self, platform: Platform, position: usize) -> Comment {
        let comment_id = self
            .comment_id
            .map(ScrapedId::into_string)
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("{}-{}", platform.as_str(), position));

        let author_id = match self.user.author_id() {
            Some(author) => author.to_string(),
            None => anonymous_author(&comment_id),
        };

        Comment {
            platform,
            comment_id,
            author_id,
            text: self.text.unwrap_or_default(),
            likes: self.likes,
            reply_count: self.reply_count,
            created_at: timestamp_from_unix(self.created_at),
        }
    }
}

/// Comments from one scrape file, with the key that scopes their ids.
///
/// Scrapers number comments per post ("1", "2", ...), so ids are only
/// unique within one source. The key is the post id when the scraper
/// recorded one, then the source URL, then whatever the caller passed as a
/// fallback (the file path, for the CLI).
#[derive(Debug, Clone)]
pub struct ScrapeSource {
    pub key: String,
    pub comments: Vec<Comment>,
}

/// Parse scraper output from a JSON string.
pub fn parse_scrape_json(json: &str) -> Result<Vec<Comment>> {
    Ok(parse_scrape_source(json, "")?.comments)
}

/// Parse scraper output, keeping track of which post it came from.
pub fn parse_scrape_source(json: &str, fallback_key: &str) -> Result<ScrapeSource> {
    let source = parse_source(json, fallback_key)?;
    let anonymous = source
        .comments
        .iter()
        .filter(|c| c.author_id.starts_with(ANONYMOUS_AUTHOR))
        .count();
    if anonymous > 0 {
        warn!(
            source = %source.key,
            anonymous,
            "Comments without any author identity, each counted as its own author"
        );
    }
    Ok(source)
}

fn parse_source(json: &str, fallback_key: &str) -> Result<ScrapeSource> {
    let file: ScrapeFile =
        serde_json::from_str(json).context("Not a recognized scrape result or comment export")?;

    match file {
        ScrapeFile::Unified(result) => {
            let platform = Platform::parse(&result.platform).with_context(|| {
                format!("Unsupported platform {:?} in scrape result", result.platform)
            })?;
            if let Some(ref err) = result.error {
                warn!(source = %result.source_url, error = %err, "Scrape result reports an error");
            }
            let key = result
                .post
                .and_then(|p| p.post_id)
                .map(ScrapedId::into_string)
                .into_iter()
                .chain([result.source_url, fallback_key.to_string()])
                .map(|k| k.trim().to_string())
                .find(|k| !k.is_empty())
                .unwrap_or_default();
            Ok(ScrapeSource {
                key,
                comments: result
                    .comments
                    .into_iter()
                    .enumerate()
                    .map(|(i, c)| c.into_comment(platform, i))
                    .collect(),
            })
        }
        ScrapeFile::LegacyTiktok(comments) => Ok(ScrapeSource {
            key: fallback_key.trim().to_string(),
            comments: comments
                .into_iter()
                .enumerate()
                .map(|(i, c)| c.into_comment(Platform::Tiktok, i))
                .collect(),
        }),
    }
}

/// Load one scraper output file. The path is the fallback source key.
pub fn load_scrape_file(path: &Path) -> Result<ScrapeSource> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let source = parse_scrape_source(&json, &path.display().to_string())
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    info!(
        file = %path.display(),
        source = %source.key,
        comments = source.comments.len(),
        "Loaded scrape file"
    );
    Ok(source)
}

/// Merge several sources into one batch, in order.
///
/// A single source keeps its ids as scraped. With more than one, every id
/// becomes `{key}/{id}` so comment "1" of one post can't collide with
/// comment "1" of another. Two sources with the same key (the same post
/// scraped twice) still collide, and validation keeps the first copy.
pub fn combine_sources(sources: Vec<ScrapeSource>) -> Vec<Comment> {
    if sources.len() <= 1 {
        return sources.into_iter().flat_map(|s| s.comments).collect();
    }

    sources
        .into_iter()
        .flat_map(|source| {
            let key = source.key;
            source.comments.into_iter().map(move |mut c| {
                c.comment_id = format!("{}/{}", key, c.comment_id);
                if c.author_id.starts_with(ANONYMOUS_AUTHOR) {
                    c.author_id = anonymous_author(&c.comment_id);
                }
                c
            })
        })
        .collect()
}
