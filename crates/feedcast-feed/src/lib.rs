pub mod client;
pub mod error;
pub mod traits;

pub use client::HttpFeedFetcher;
pub use error::FeedError;
pub use traits::{FeedEpisode, FeedFetcher, ParsedFeed};
