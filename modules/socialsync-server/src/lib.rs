pub mod sync;

pub use sync::{SyncContext, DEFAULT_LIMIT};
