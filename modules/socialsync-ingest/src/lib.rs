pub mod extractor;
pub mod feed;
pub mod telegram;
pub mod threads;

pub use extractor::extract_thread_posts;
pub use feed::FeedSource;
pub use telegram::{ChannelClient, ChannelMessage, ChannelReader, GrammersChannelClient};
pub use threads::{fetch_profile_posts, run_cascade, FetchStrategy, RenderedStrategy, StaticStrategy};
