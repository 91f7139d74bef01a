pub mod error;
pub mod report;
pub mod store;

pub use error::TableError;
pub use report::SaveReport;
pub use store::{PgPostsTable, PostStore, PostsTable};
