// Comment records — the unit of input to the scoring engine.
//
// These are deliberately flat: whatever scraper produced them, by the time
// they reach the engine they're just text, an author, engagement counts, and
// an optional timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which platform a comment was collected from.
///
/// Carried through to the output for downstream filtering. Never used as a
/// detection feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Tiktok,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Tiktok => "tiktok",
        }
    }

    /// Parse a platform tag as written by the scrapers ("tiktok", "TikTok", ...).
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "facebook" | "fb" => Some(Platform::Facebook),
            "tiktok" => Some(Platform::Tiktok),
            _ => None,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single comment as supplied to the engine. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub platform: Platform,
    /// Unique within a batch. Also defines the engine's canonical ordering.
    pub comment_id: String,
    pub author_id: String,
    pub text: String,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Comment {
    pub fn new(
        platform: Platform,
        comment_id: impl Into<String>,
        author_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            platform,
            comment_id: comment_id.into(),
            author_id: author_id.into(),
            text: text.into(),
            likes: 0,
            reply_count: 0,
            created_at: None,
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_engagement(mut self, likes: u64, reply_count: u64) -> Self {
        self.likes = likes;
        self.reply_count = reply_count;
        self
    }

    /// True when the text is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
