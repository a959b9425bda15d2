//! Shared constants used across the application.

/// Number of posts the forum renders on one physical page.
///
/// The forum's own pagination links step by this amount, independent of how
/// many posts a page actually shows after pinned posts are filtered out.
pub const PAGE_SIZE: usize = 20;

/// Number of most recent posts kept in a thread window.
pub const MAX_POST_COUNT: usize = 30;

/// Scheme and host of the forum when `FORUM_BASE_URL` is not set.
pub const DEFAULT_FORUM_BASE_URL: &str = "http://4pda.ru";

/// Inline style applied to quotation blocks inside post bodies.
///
/// Feed readers do not ship a stylesheet for the forum's quote markup, so the
/// style has to travel with the element itself.
pub const QUOTE_STYLE: &str =
    "border-left: 2px solid lightgrey; padding-left: 5px; margin-bottom: 5px; color: grey;";

/// User agent string sent with forum page requests.
pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
