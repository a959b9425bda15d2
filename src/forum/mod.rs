//! Forum thread scraping: fetch thread pages, decode them, extract posts and
//! assemble the recent-message window.

pub mod dates;
pub mod downloader;
pub mod encoding;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod models;
pub mod sanitize;

pub use downloader::ThreadDownloader;
pub use error::ForumError;
pub use fetcher::{ForumClient, PageSource, RawPage};
pub use models::{Post, ThreadWindow};
