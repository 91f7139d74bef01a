// RSS/Atom alternate source for Threads posts (e.g. an rsshub feed).
// Configured via THREADS_RSS; replaces the profile-scrape cascade entirely.

use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use socialsync_common::{Platform, Post};

pub struct FeedSource {
    client: reqwest::Client,
}

impl FeedSource {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to build RSS HTTP client");
        Self { client }
    }

    /// Fetch and parse a syndication feed into canonical posts.
    /// Any fetch or parse failure is a soft-fail: warn and return empty.
    pub async fn fetch(&self, feed_url: &str, limit: usize) -> Vec<Post> {
        let resp = match self
            .client
            .get(feed_url)
            .header("User-Agent", "socialsync/0.1")
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!(feed_url, error = %e, "feed: fetch failed");
                return Vec::new();
            }
        };

        let bytes = match resp.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(feed_url, error = %e, "feed: failed to read body");
                return Vec::new();
            }
        };

        let feed = match feed_rs::parser::parse(&bytes[..]) {
            Ok(feed) => feed,
            Err(e) => {
                warn!(feed_url, error = %e, "feed: parse failed");
                return Vec::new();
            }
        };

        let posts = posts_from_feed(feed, limit);
        info!(feed_url, count = posts.len(), "feed: parsed successfully");
        posts
    }
}

impl Default for FeedSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Entry link becomes the post URL, trimmed title the content, and the
/// feed's own publish date the timestamp (None when the feed has none).
pub(crate) fn posts_from_feed(feed: feed_rs::model::Feed, limit: usize) -> Vec<Post> {
    feed.entries
        .into_iter()
        .filter_map(|entry| {
            let post_url = entry.links.first().map(|l| l.href.clone())?;
            let content = entry
                .title
                .map(|t| t.content.trim().to_string())
                .filter(|c| !c.is_empty())?;
            let published_at = entry
                .published
                .or(entry.updated)
                .map(|dt| dt.with_timezone(&Utc));

            Some(Post {
                platform: Platform::Threads,
                post_url,
                content,
                published_at,
            })
        })
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
        <rss version="2.0"><channel>
          <title>someone on Threads</title>
          <item>
            <title>  first post  </title>
            <link>https://www.threads.net/@someone/post/111</link>
            <pubDate>Mon, 05 May 2025 10:00:00 GMT</pubDate>
          </item>
          <item>
            <title>undated post</title>
            <link>https://www.threads.net/@someone/post/222</link>
          </item>
          <item>
            <title>beyond the limit</title>
            <link>https://www.threads.net/@someone/post/333</link>
          </item>
        </channel></rss>"#;

    #[test]
    fn entries_map_to_posts_with_trimmed_titles() {
        let feed = feed_rs::parser::parse(FIXTURE.as_bytes()).unwrap();
        let posts = posts_from_feed(feed, 10);
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].content, "first post");
        assert_eq!(posts[0].post_url, "https://www.threads.net/@someone/post/111");
        assert_eq!(posts[0].platform, Platform::Threads);
        assert!(posts[0].published_at.is_some());
    }

    #[test]
    fn missing_publish_date_stays_none() {
        let feed = feed_rs::parser::parse(FIXTURE.as_bytes()).unwrap();
        let posts = posts_from_feed(feed, 10);
        assert!(posts[1].published_at.is_none());
    }

    #[test]
    fn limit_truncates_entries() {
        let feed = feed_rs::parser::parse(FIXTURE.as_bytes()).unwrap();
        let posts = posts_from_feed(feed, 2);
        assert_eq!(posts.len(), 2);
    }

    #[test]
    fn unparseable_input_is_an_error_not_a_panic() {
        assert!(feed_rs::parser::parse(&b"not xml"[..]).is_err());
    }
}
