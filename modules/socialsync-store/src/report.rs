/// Outcome of one save batch. The Display strings are the operator
/// contract: an "Inserted N" report means the database is missing its
/// intended uniqueness constraint and ran on the fallback path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveReport {
    /// Nothing to write; no datastore call was made.
    Empty,
    /// Bulk upsert succeeded, N rows saved or updated.
    Upserted(usize),
    /// Per-row fallback ran, N rows inserted, duplicates skipped.
    Inserted(usize),
}

impl std::fmt::Display for SaveReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveReport::Empty => write!(f, "No posts to save"),
            SaveReport::Upserted(n) => write!(f, "Saved/updated {n} posts"),
            SaveReport::Inserted(n) => write!(f, "Inserted {n} posts (duplicates skipped)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_operator_contract() {
        assert_eq!(SaveReport::Empty.to_string(), "No posts to save");
        assert_eq!(SaveReport::Upserted(7).to_string(), "Saved/updated 7 posts");
        assert_eq!(
            SaveReport::Inserted(1).to_string(),
            "Inserted 1 posts (duplicates skipped)"
        );
    }
}
