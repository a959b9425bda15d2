//! Page Fetcher: one HTTP GET per physical forum page.

use async_trait::async_trait;
use reqwest::header::{ACCEPT_ENCODING, CACHE_CONTROL, CONTENT_TYPE, PRAGMA, USER_AGENT};
use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use super::error::ForumError;
use crate::config::Config;

/// Raw body of a forum page together with its declared content type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPage {
    /// Fully drained, already decompressed response body.
    pub body: Vec<u8>,
    /// Value of the `Content-Type` header, empty if the server sent none.
    pub content_type: String,
}

/// Anything that can hand out raw thread pages by cursor.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the physical page of `topic_id` that skips `from` older posts.
    async fn fetch_page(&self, topic_id: u64, from: usize) -> Result<RawPage, ForumError>;
}

/// Fetches thread pages from the live forum.
#[derive(Debug, Clone)]
pub struct ForumClient {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl ForumClient {
    /// Build a client for the forum named in the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder().gzip(true);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.forum_base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
        })
    }

    /// Canonical URL of a thread page. The first page carries no cursor.
    #[must_use]
    pub fn page_url(&self, topic_id: u64, from: usize) -> String {
        let mut url = format!("{}/forum/index.php?showtopic={topic_id}", self.base_url);
        if from > 0 {
            url.push_str(&format!("&st={from}"));
        }
        url
    }
}

#[async_trait]
impl PageSource for ForumClient {
    async fn fetch_page(&self, topic_id: u64, from: usize) -> Result<RawPage, ForumError> {
        let page_url = self.page_url(topic_id, from);
        let url = Url::parse(&page_url).map_err(|source| ForumError::InvalidUrl {
            url: page_url.clone(),
            source,
        })?;

        debug!(url = %page_url, from, "Fetching forum page");

        let response = self
            .client
            .get(url)
            .header(ACCEPT_ENCODING, "gzip")
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|source| ForumError::Transport {
                url: page_url.clone(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ForumError::Status {
                url: page_url,
                status,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        // gzip bodies are inflated by the client while the body is drained
        let body = response.bytes().await.map_err(|source| {
            if source.is_decode() {
                ForumError::Decompress {
                    url: page_url.clone(),
                    source,
                }
            } else {
                ForumError::Body {
                    url: page_url.clone(),
                    source,
                }
            }
        })?;

        debug!(url = %page_url, bytes = body.len(), content_type = %content_type, "Fetched forum page");

        Ok(RawPage {
            body: body.to_vec(),
            content_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(base: &str) -> ForumClient {
        let config = Config {
            forum_base_url: base.to_string(),
            ..Config::for_testing()
        };
        ForumClient::new(&config).unwrap()
    }

    #[test]
    fn test_page_url_omits_cursor_on_first_page() {
        let client = client_for("http://4pda.ru");
        assert_eq!(
            client.page_url(12345, 0),
            "http://4pda.ru/forum/index.php?showtopic=12345"
        );
    }

    #[test]
    fn test_page_url_appends_cursor() {
        let client = client_for("http://4pda.ru/");
        assert_eq!(
            client.page_url(12345, 40),
            "http://4pda.ru/forum/index.php?showtopic=12345&st=40"
        );
    }
}
