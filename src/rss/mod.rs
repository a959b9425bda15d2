//! Thread feeds: turn a forum thread into feed items and write them as RSS.

mod provider;
mod writer;

pub use provider::{build_feed, item_id, item_title, Feed, FeedItem, FeedProvider};
pub use writer::{generate_rss, FeedError};
