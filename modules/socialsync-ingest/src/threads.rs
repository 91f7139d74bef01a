// Threads profile fetching: static HTML first, headless render as the
// escalation. The profile page inlines its data as JSON for SEO even when
// visible rendering needs JavaScript, so the cheap path usually wins.

use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tracing::{info, warn};

use socialsync_common::Post;

use crate::extractor::extract_thread_posts;

const BROWSER_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const STATIC_TIMEOUT: Duration = Duration::from_secs(15);
const RENDER_TIMEOUT: Duration = Duration::from_secs(30);
/// Post-navigation settle budget for client-side rendering, in ms.
const RENDER_SETTLE_MS: u32 = 5000;
/// Engines tried in order when BROWSER_BIN is not set.
const BROWSER_ENGINES: &[&str] = &["chromium", "google-chrome"];

fn profile_url(username: &str) -> String {
    format!("https://www.threads.net/@{username}")
}

/// One retrieval strategy for a Threads profile. Strategies soft-fail:
/// they log and return empty rather than erroring to the caller.
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    async fn attempt(&self, limit: usize) -> Vec<Post>;
}

/// Try each strategy in order, stopping at the first that yields posts.
/// Never returns more than `limit` items.
pub async fn run_cascade(strategies: &[Box<dyn FetchStrategy>], limit: usize) -> Vec<Post> {
    let mut posts = Vec::new();
    for strategy in strategies {
        posts = strategy.attempt(limit).await;
        if !posts.is_empty() {
            break;
        }
    }
    posts.truncate(limit);
    posts
}

/// Fetch up to `limit` posts from a public Threads profile.
pub async fn fetch_profile_posts(
    username: &str,
    limit: usize,
    browser_bin: Option<&str>,
) -> Vec<Post> {
    let strategies: Vec<Box<dyn FetchStrategy>> = vec![
        Box::new(StaticStrategy::new(username)),
        Box::new(RenderedStrategy::new(username, browser_bin)),
    ];
    let posts = run_cascade(&strategies, limit).await;
    info!(username, count = posts.len(), "threads: extracted posts");
    posts
}

/// Mine every embedded JSON dataset script block out of profile HTML and
/// run each through the extractor, stopping once `limit` is reached.
/// Malformed blocks are skipped individually.
fn posts_from_html(html: &str, username: &str, limit: usize) -> Vec<Post> {
    let mut posts = Vec::new();
    let blocks = json_script_blocks(html);
    info!(count = blocks.len(), "threads: found JSON datasets");

    for block in blocks {
        let Ok(doc) = serde_json::from_str::<serde_json::Value>(block) else {
            continue;
        };
        posts.extend(extract_thread_posts(&doc, username));
        if posts.len() >= limit {
            break;
        }
    }

    posts
}

/// Script blocks carrying inline JSON datasets:
/// `<script type="application/json" ... data-sjs ...>`.
fn json_script_blocks(html: &str) -> Vec<&str> {
    let script_re =
        Regex::new(r#"(?s)<script\b([^>]*)>(.*?)</script>"#).expect("valid script regex");

    script_re
        .captures_iter(html)
        .filter(|cap| {
            let attrs = &cap[1];
            attrs.contains("application/json") && attrs.contains("data-sjs")
        })
        .filter_map(|cap| cap.get(2).map(|m| m.as_str()))
        .collect()
}

/// Strategy 1: plain HTTP GET of the profile page.
pub struct StaticStrategy {
    client: reqwest::Client,
    username: String,
}

impl StaticStrategy {
    pub fn new(username: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(STATIC_TIMEOUT)
            .build()
            .expect("Failed to build Threads HTTP client");
        Self {
            client,
            username: username.to_string(),
        }
    }
}

#[async_trait]
impl FetchStrategy for StaticStrategy {
    async fn attempt(&self, limit: usize) -> Vec<Post> {
        let url = profile_url(&self.username);

        let resp = match self
            .client
            .get(&url)
            .header("User-Agent", BROWSER_UA)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!(url, error = %e, "threads: static fetch failed");
                return Vec::new();
            }
        };

        if !resp.status().is_success() {
            warn!(url, status = %resp.status(), "threads: profile page returned non-success");
            return Vec::new();
        }

        let html = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(url, error = %e, "threads: failed to read profile body");
                return Vec::new();
            }
        };

        posts_from_html(&html, &self.username, limit)
    }
}

/// Strategy 2: headless-browser render for profiles whose static HTML
/// carries no extractable datasets. Engine availability is
/// environment-dependent; an unlaunchable browser is a soft-fail.
pub struct RenderedStrategy {
    username: String,
    browser_bin: Option<String>,
}

impl RenderedStrategy {
    pub fn new(username: &str, browser_bin: Option<&str>) -> Self {
        Self {
            username: username.to_string(),
            browser_bin: browser_bin.map(String::from),
        }
    }

    /// Launch the first available engine with --dump-dom and return the
    /// rendered HTML, or None when no engine can produce output.
    async fn render(&self, url: &str) -> Option<String> {
        let engines: Vec<&str> = match self.browser_bin {
            Some(ref bin) => vec![bin.as_str()],
            None => BROWSER_ENGINES.to_vec(),
        };

        for engine in engines {
            let result = tokio::time::timeout(
                RENDER_TIMEOUT,
                tokio::process::Command::new(engine)
                    .args([
                        "--headless",
                        "--no-sandbox",
                        "--disable-gpu",
                        "--disable-dev-shm-usage",
                        &format!("--virtual-time-budget={RENDER_SETTLE_MS}"),
                        "--dump-dom",
                        url,
                    ])
                    .output(),
            )
            .await;

            match result {
                Ok(Ok(output)) if output.status.success() && !output.stdout.is_empty() => {
                    return Some(String::from_utf8_lossy(&output.stdout).into_owned());
                }
                Ok(Ok(output)) => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!(url, engine, stderr = %stderr, "threads: render produced no DOM");
                }
                Ok(Err(e)) => {
                    warn!(url, engine, error = %e, "threads: failed to launch browser");
                }
                Err(_) => {
                    warn!(url, engine, "threads: render timed out");
                }
            }
        }

        None
    }
}

#[async_trait]
impl FetchStrategy for RenderedStrategy {
    async fn attempt(&self, limit: usize) -> Vec<Post> {
        let url = profile_url(&self.username);
        info!(url, "threads: no posts via static HTML, trying headless render");

        match self.render(&url).await {
            Some(html) => posts_from_html(&html, &self.username, limit),
            None => {
                warn!(url, "threads: no browser engine available, skipping render");
                Vec::new()
            }
        }
    }
}
