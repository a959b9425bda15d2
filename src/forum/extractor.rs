//! Post Extractor: turn one thread page into post records.

use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use super::dates::parse_forum_date;
use super::models::Post;
use super::sanitize::{decode_shortcodes, excerpt, restyle_quotes};

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("head title").expect("Invalid selector"));
static POST_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div[data-post]").expect("Invalid selector"));
static POST_DATE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div.post_header_container div.post_header span.post_date")
        .expect("Invalid selector")
});
static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a").expect("Invalid selector"));
static POST_BODY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.post_body").expect("Invalid selector"));
static EDIT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.edit").expect("Invalid selector"));
static PAGINATION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.pagination a").expect("Invalid selector"));

/// Attribute set on the wrapper of pinned announcement posts.
const PINNED_ATTR: &str = "data-spoil-poll-pinned-content";

/// Base for resolving relative pagination links; only the query is read.
static LINK_BASE: Lazy<Url> =
    Lazy::new(|| Url::parse("http://localhost/").expect("Invalid base URL"));

/// Everything read from one physical thread page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPage {
    /// Text of the page's `<title>`.
    pub title: String,
    /// Posts in page order.
    pub posts: Vec<Post>,
    /// Highest `st` cursor among the pagination links, `None` when the
    /// thread fits on a single page.
    pub last_from: Option<usize>,
}

/// Parse a decoded thread page.
///
/// Pinned posts are kept only when `include_pinned` is set, which the caller
/// does for the thread's head page. Relative dates resolve against `now`.
#[must_use]
pub fn extract_page(html: &str, include_pinned: bool, now: DateTime<Local>) -> ExtractedPage {
    let mut document = Html::parse_document(html);
    let quotes = restyle_quotes(&mut document);
    if quotes > 0 {
        debug!(quotes, "Restyled quote blocks");
    }

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|title| title.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let posts = document
        .select(&POST_SELECTOR)
        .filter(|element| include_pinned || !is_pinned(*element))
        .map(|element| extract_post(element, now))
        .collect();

    ExtractedPage {
        title,
        posts,
        last_from: find_last_page_from(&document),
    }
}

fn is_pinned(element: ElementRef<'_>) -> bool {
    element
        .parent()
        .and_then(|parent| parent.value().as_element())
        .is_some_and(|parent| parent.attr(PINNED_ATTR).is_some())
}

fn extract_post(element: ElementRef<'_>, now: DateTime<Local>) -> Post {
    let raw_id = element.value().attr("data-post").unwrap_or_default();
    let id = raw_id.trim().parse::<i64>().unwrap_or_else(|e| {
        warn!(data_post = %raw_id, "Can't parse post id: {e}");
        0
    });

    let mut post = Post {
        id,
        ..Post::default()
    };

    if let Some(header) = element.select(&POST_DATE_SELECTOR).next() {
        let header_text = header.text().collect::<String>();
        let parts: Vec<&str> = header_text.split('|').collect();
        if let [date, _] = parts.as_slice() {
            post.created = parse_forum_date(date, now);
            if post.created.is_none() {
                warn!(post_id = id, date = %date.trim(), "Can't parse post date");
            }
        }

        if let Some(href) = header
            .select(&ANCHOR_SELECTOR)
            .next()
            .and_then(|anchor| anchor.value().attr("href"))
        {
            post.link = absolute_link(href);
        }
    }

    if let Some(body) = element.select(&POST_BODY_SELECTOR).next() {
        post.html = decode_shortcodes(&body.inner_html()).into_owned();
        post.text = excerpt(body);

        if let Some(edit) = body.select(&EDIT_SELECTOR).next() {
            let edit_text = edit.text().collect::<String>();
            if let Some(date) = edit_text.rsplit(" - ").next() {
                post.updated = parse_forum_date(date, now);
                if post.updated.is_none() {
                    warn!(post_id = id, date = %date.trim(), "Can't parse edit date");
                }
            }
        }
    }

    if let (Some(created), Some(updated)) = (post.created, post.updated) {
        if updated < created {
            warn!(post_id = id, %created, %updated, "Edit date precedes post date, ignoring it");
            post.updated = None;
        }
    }

    post
}

/// Rewrite protocol-relative links to explicit HTTP.
fn absolute_link(href: &str) -> String {
    if href.starts_with("//") {
        format!("http:{href}")
    } else {
        href.to_string()
    }
}

fn find_last_page_from(document: &Html) -> Option<usize> {
    document
        .select(&PAGINATION_SELECTOR)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter(|href| !href.is_empty())
        .filter_map(|href| match LINK_BASE.join(href) {
            Ok(url) => Some(url),
            Err(e) => {
                debug!(href, "Skipping unparsable pagination link: {e}");
                None
            }
        })
        .filter_map(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "st")
                .and_then(|(_, value)| value.parse::<usize>().ok())
        })
        .max()
}
