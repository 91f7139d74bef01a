// Postgres persistence for collected posts.
//
// Primary path is a bulk upsert on (platform, post_url). Deployments
// whose posts table is missing that uniqueness constraint make the
// upsert fail with SQLSTATE 42P10; the writer then degrades to per-row
// inserts where duplicate keys (23505) are expected and skipped.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, warn};

use socialsync_common::Post;

use crate::error::TableError;
use crate::report::SaveReport;

/// Capability seam over the posts table so the fallback orchestration is
/// testable with a substitute collaborator.
#[async_trait]
pub trait PostsTable: Send + Sync {
    /// Bulk upsert; returns the number of rows written.
    async fn upsert_all(&self, posts: &[Post]) -> Result<usize, TableError>;
    /// Single-row plain insert.
    async fn insert_one(&self, post: &Post) -> Result<(), TableError>;
}

pub struct PostStore<T> {
    table: T,
}

impl<T: PostsTable> PostStore<T> {
    pub fn new(table: T) -> Self {
        Self { table }
    }

    /// Idempotent save. Repeated runs with the same posts produce zero
    /// net new rows, via upsert semantics or skipped duplicates.
    pub async fn save(&self, posts: &[Post]) -> Result<SaveReport, TableError> {
        if posts.is_empty() {
            return Ok(SaveReport::Empty);
        }

        match self.table.upsert_all(posts).await {
            Ok(n) => {
                info!(count = n, "store: upsert complete");
                Ok(SaveReport::Upserted(n))
            }
            Err(TableError::MissingConflictTarget(msg)) => {
                warn!(error = %msg, "store: no matching constraint, falling back to per-row inserts");
                self.insert_each(posts).await
            }
            // Unknown database errors surface unmasked.
            Err(e) => Err(e),
        }
    }

    async fn insert_each(&self, posts: &[Post]) -> Result<SaveReport, TableError> {
        let mut inserted = 0;
        for post in posts {
            match self.table.insert_one(post).await {
                Ok(()) => inserted += 1,
                Err(TableError::DuplicateKey(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(SaveReport::Inserted(inserted))
    }
}

/// Production PostsTable over a Postgres pool.
pub struct PgPostsTable {
    pool: PgPool,
}

impl PgPostsTable {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the embedded SQL migrations.
    pub async fn migrate(&self) -> Result<(), TableError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| TableError::Other(e.to_string()))
    }
}

#[async_trait]
impl PostsTable for PgPostsTable {
    async fn upsert_all(&self, posts: &[Post]) -> Result<usize, TableError> {
        let platforms: Vec<String> = posts.iter().map(|p| p.platform.to_string()).collect();
        let urls: Vec<String> = posts.iter().map(|p| p.post_url.clone()).collect();
        let contents: Vec<String> = posts.iter().map(|p| p.content.clone()).collect();
        let published: Vec<Option<chrono::DateTime<chrono::Utc>>> =
            posts.iter().map(|p| p.published_at).collect();

        let rows = sqlx::query_scalar::<_, String>(
            r#"
            INSERT INTO posts (platform, post_url, content, published_at)
            SELECT * FROM UNNEST($1::text[], $2::text[], $3::text[], $4::timestamptz[])
            ON CONFLICT (platform, post_url) DO UPDATE
                SET content = EXCLUDED.content,
                    published_at = EXCLUDED.published_at
            RETURNING post_url
            "#,
        )
        .bind(&platforms)
        .bind(&urls)
        .bind(&contents)
        .bind(&published)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.len())
    }

    async fn insert_one(&self, post: &Post) -> Result<(), TableError> {
        sqlx::query(
            r#"
            INSERT INTO posts (platform, post_url, content, published_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(post.platform.to_string())
        .bind(&post.post_url)
        .bind(&post.content)
        .bind(post.published_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}

/// Map sqlx errors onto the write-path taxonomy by SQLSTATE, with a
/// message-substring fallback for drivers that don't expose the code.
fn map_db_error(err: sqlx::Error) -> TableError {
    if let sqlx::Error::Database(ref db) = err {
        let code = db.code().unwrap_or_default().to_string();
        let message = db.message().to_string();

        if code == "42P10" || message.contains("no unique or exclusion constraint") {
            return TableError::MissingConflictTarget(message);
        }
        if code == "23505" || message.to_lowercase().contains("duplicate key value") {
            return TableError::DuplicateKey(message);
        }
    }
    TableError::Other(err.to_string())
}
