//! Shape a thread window into feed items.

use chrono::{DateTime, Local};
use tracing::info;

use crate::forum::{ForumClient, ForumError, Post, ThreadDownloader, ThreadWindow};

/// Excerpts longer than this many characters are shortened for item titles.
const TITLE_MAX_CHARS: usize = 50;
/// Number of words kept when an excerpt is shortened.
const TITLE_MAX_WORDS: usize = 15;

/// A feed ready for serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feed {
    pub id: String,
    pub title: String,
    pub link: String,
    pub description: String,
    pub items: Vec<FeedItem>,
}

impl Feed {
    /// Most recent creation or edit time among the items.
    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        self.items
            .iter()
            .filter_map(|item| item.updated.or(item.created))
            .max()
    }
}

/// One entry of the feed, built from a forum post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub id: String,
    pub title: String,
    pub link: String,
    pub created: Option<DateTime<Local>>,
    pub updated: Option<DateTime<Local>>,
    pub description: String,
}

impl From<Post> for FeedItem {
    fn from(post: Post) -> Self {
        Self {
            id: item_id(&post),
            title: item_title(&post.text),
            link: post.link,
            created: post.created,
            updated: post.updated,
            description: post.html,
        }
    }
}

/// Builds feeds for forum threads.
#[derive(Debug, Clone)]
pub struct FeedProvider {
    client: ForumClient,
}

impl FeedProvider {
    #[must_use]
    pub fn new(client: ForumClient) -> Self {
        Self { client }
    }

    /// Download a thread and turn its recent posts into a feed.
    ///
    /// # Errors
    ///
    /// Returns an error if any page of the thread cannot be fetched.
    pub async fn feed(&self, topic_id: u64) -> Result<Feed, ForumError> {
        let window = ThreadDownloader::new(self.client.clone())
            .download(topic_id)
            .await?;

        info!(topic_id, items = window.posts.len(), title = %window.title, "Built thread feed");

        Ok(build_feed(topic_id, self.client.page_url(topic_id, 0), window))
    }
}

/// Assemble the feed for a downloaded thread window.
#[must_use]
pub fn build_feed(topic_id: u64, thread_url: String, window: ThreadWindow) -> Feed {
    Feed {
        id: format!("4pda-{topic_id}"),
        description: format!("Latest messages of {}", window.title),
        title: window.title,
        link: thread_url,
        items: window.posts.into_iter().map(FeedItem::from).collect(),
    }
}

/// Item title: the excerpt, cut to its first words when it is long.
#[must_use]
pub fn item_title(text: &str) -> String {
    if text.chars().count() > TITLE_MAX_CHARS {
        text.split_whitespace()
            .take(TITLE_MAX_WORDS)
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        text.to_string()
    }
}

/// Item identifier: the permalink, or the post id when there is none.
///
/// Edited posts get the edit timestamp appended so readers see them as changed.
#[must_use]
pub fn item_id(post: &Post) -> String {
    let mut id = if post.link.is_empty() {
        post.id.to_string()
    } else {
        post.link.clone()
    };
    if let Some(updated) = post.updated {
        id.push('#');
        id.push_str(&updated.timestamp().to_string());
    }
    id
}
