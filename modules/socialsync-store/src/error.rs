/// Write-path error taxonomy. The save logic branches on the first two
/// variants; everything else propagates to the caller unchanged.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// Postgres 42P10: no unique or exclusion constraint matches the
    /// ON CONFLICT specification. The table is missing its intended
    /// `(platform, post_url)` constraint.
    #[error("No matching uniqueness constraint for upsert: {0}")]
    MissingConflictTarget(String),

    /// Postgres 23505: duplicate key value violates unique constraint.
    /// Expected during the per-row fallback on repeated runs.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Database error: {0}")]
    Other(String),
}
