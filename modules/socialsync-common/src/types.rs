use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source platform a post was collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Telegram,
    Threads,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Telegram => "telegram",
            Platform::Threads => "threads",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical post record. Built transiently per sync run; the database
/// is the only durable store. `(platform, post_url)` is the dedup key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub platform: Platform,
    pub post_url: String,
    /// Non-empty after trimming; entries that trim to empty are dropped
    /// during extraction.
    pub content: String,
    /// None for feed entries that carry no publish date.
    pub published_at: Option<DateTime<Utc>>,
}
