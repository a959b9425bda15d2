use thiserror::Error;

/// Failure while fetching one forum page.
///
/// Every variant names the page URL so a failed thread download can be traced
/// back to the exact request that broke it.
#[derive(Debug, Error)]
pub enum ForumError {
    #[error("can't create an http request for {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("can't download from {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("can't download {url}, unexpected status code {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("can't decompress the body of {url} response: {source}")]
    Decompress {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("can't read the body of {url} response: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ForumError {
    /// URL of the page whose fetch failed.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::InvalidUrl { url, .. }
            | Self::Transport { url, .. }
            | Self::Status { url, .. }
            | Self::Decompress { url, .. }
            | Self::Body { url, .. } => url,
        }
    }
}
