// One sync run: Threads (RSS or profile cascade) + Telegram, then save.
// Sequential and synchronous per invocation; concurrent runs are only
// protected by the write layer's idempotent dedup, not by a lock.

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use socialsync_common::{Config, Post};
use socialsync_ingest::{fetch_profile_posts, ChannelReader, FeedSource, GrammersChannelClient};
use socialsync_store::{PgPostsTable, PostStore};

/// Posts fetched per source per run.
pub const DEFAULT_LIMIT: usize = 10;

/// Shared collaborators, constructed once at process start and passed to
/// every component that needs them.
pub struct SyncContext {
    pub config: Config,
    store: PostStore<PgPostsTable>,
}

impl SyncContext {
    pub async fn init(config: Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&config.database_url)
            .await
            .context("Failed to connect to Postgres")?;

        let table = PgPostsTable::new(pool);
        table
            .migrate()
            .await
            .context("Failed to run database migrations")?;

        Ok(Self {
            config,
            store: PostStore::new(table),
        })
    }

    /// Run the full sync and return the one-line save report.
    /// Hard failures (channel collaborator errors, unexpected database
    /// errors) propagate to the caller.
    pub async fn run_sync(&self) -> Result<String> {
        let mut posts = self.fetch_threads_posts().await;

        info!("fetching Telegram posts");
        posts.extend(self.fetch_telegram_posts().await?);

        info!(total = posts.len(), "saving posts");
        let report = self.store.save(&posts).await?;
        info!(%report, "sync complete");

        Ok(report.to_string())
    }

    /// RSS when configured, otherwise the profile-scrape cascade,
    /// otherwise skip with a warning (channel-only operation).
    async fn fetch_threads_posts(&self) -> Vec<Post> {
        if let Some(ref rss) = self.config.threads_rss {
            info!("fetching Threads posts from RSS");
            return FeedSource::new().fetch(rss, DEFAULT_LIMIT).await;
        }

        if let Some(ref username) = self.config.threads_username {
            info!("fetching Threads posts");
            return fetch_profile_posts(
                username,
                DEFAULT_LIMIT,
                self.config.browser_bin.as_deref(),
            )
            .await;
        }

        warn!("THREADS_USERNAME and THREADS_RSS not set, skipping Threads fetch");
        Vec::new()
    }

    async fn fetch_telegram_posts(&self) -> Result<Vec<Post>> {
        let client = GrammersChannelClient::connect(
            &self.config.tg_session_file,
            self.config.tg_api_id,
            &self.config.tg_api_hash,
        )
        .await?;

        let reader = ChannelReader::new(client, &self.config.tg_channel);
        reader.fetch_posts(DEFAULT_LIMIT).await
    }
}
