//! Thread Assembler: walk a thread's pages and keep the most recent posts.

use chrono::Local;
use tracing::{debug, info};

use super::encoding::decode_page;
use super::error::ForumError;
use super::extractor::{extract_page, ExtractedPage};
use super::fetcher::PageSource;
use super::models::{Post, ThreadWindow};
use crate::constants::{MAX_POST_COUNT, PAGE_SIZE};

/// Posts of one logical page, assembled from one or more physical pages.
#[derive(Debug, Default)]
struct LogicalPage {
    posts: Vec<Post>,
    /// Pagination cursor reported by the last physical page visited.
    last_from: Option<usize>,
    /// Title of the first physical page visited.
    title: String,
}

/// Downloads the recent-message window of a thread.
///
/// Holds no state between downloads; every call crawls the thread afresh.
#[derive(Debug, Clone)]
pub struct ThreadDownloader<S> {
    source: S,
}

impl<S: PageSource> ThreadDownloader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Fetch the last [`MAX_POST_COUNT`] posts of a thread, oldest first.
    ///
    /// Pages are fetched strictly one after another. The cursor walks back
    /// from the last page in steps of [`PAGE_SIZE`], which is how the forum
    /// numbers its own pagination links, even when a page yielded fewer posts.
    ///
    /// # Errors
    ///
    /// Returns the first page failure; no partial window is produced.
    pub async fn download(&self, topic_id: u64) -> Result<ThreadWindow, ForumError> {
        let first = self.download_posts(topic_id, 0).await?;
        let title = first.title;

        let Some(last_from) = first.last_from else {
            debug!(topic_id, posts = first.posts.len(), "Thread fits on a single page");
            return Ok(ThreadWindow {
                title,
                posts: first.posts,
            });
        };

        let mut first_posts = first.posts;
        let mut posts: Vec<Post> = Vec::new();
        let mut cursor = Some(last_from);

        while let Some(from) = cursor {
            if posts.len() >= MAX_POST_COUNT {
                break;
            }

            let mut page_posts = if from == 0 {
                // the head page was already fetched above
                std::mem::take(&mut first_posts)
            } else {
                self.download_posts(topic_id, from).await?.posts
            };

            page_posts.append(&mut posts);
            posts = page_posts;
            cursor = from.checked_sub(PAGE_SIZE);
        }

        if posts.len() > MAX_POST_COUNT {
            let excess = posts.len() - MAX_POST_COUNT;
            posts.drain(..excess);
        }

        info!(topic_id, posts = posts.len(), last_from, "Downloaded thread window");

        Ok(ThreadWindow { title, posts })
    }

    /// Collect one page worth of posts starting at `from`.
    ///
    /// Filtered pinned posts make physical pages short, so the cursor advances
    /// by the number of posts actually found until more than [`PAGE_SIZE`]
    /// posts are collected or a page comes back empty.
    async fn download_posts(&self, topic_id: u64, from: usize) -> Result<LogicalPage, ForumError> {
        let mut logical = LogicalPage::default();
        let mut title = None;
        let mut page_from = from;

        loop {
            let page = self.download_page(topic_id, page_from).await?;
            if title.is_none() {
                title = Some(page.title);
            }
            logical.last_from = page.last_from;

            if page.posts.is_empty() {
                break;
            }

            let found = page.posts.len();
            logical.posts.extend(page.posts);
            if logical.posts.len() > PAGE_SIZE {
                logical.posts.truncate(PAGE_SIZE);
                break;
            }
            page_from += found;
        }

        logical.title = title.unwrap_or_default();
        Ok(logical)
    }

    async fn download_page(&self, topic_id: u64, from: usize) -> Result<ExtractedPage, ForumError> {
        let raw = self.source.fetch_page(topic_id, from).await?;
        let decoded = decode_page(&raw.body, &raw.content_type);
        let page = extract_page(&decoded.html, from == 0, Local::now());

        debug!(
            topic_id,
            from,
            encoding = decoded.encoding.name(),
            posts = page.posts.len(),
            last_from = ?page.last_from,
            "Parsed thread page"
        );

        Ok(page)
    }
}
