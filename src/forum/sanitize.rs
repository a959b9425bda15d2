//! Content Sanitizer: quote restyling, emoji shortcodes and plain-text excerpts.
//!
//! Quote restyling mutates the parsed page before post bodies are serialized;
//! everything else is a pure transform over a string or a parsed fragment.

use std::borrow::Cow;

use html5ever::{LocalName, Namespace, QualName};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use scraper::{ElementRef, Html, Node, Selector, StrTendril};

use crate::constants::QUOTE_STYLE;

static QUOTE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.post_body div.quote").expect("Invalid selector"));
static SHORTCODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":([a-zA-Z0-9_+\-]+):").expect("Invalid regex"));

/// Replace `:shortcode:` tokens with the emoji they name.
///
/// Unknown shortcodes are left untouched.
#[must_use]
pub fn decode_shortcodes(text: &str) -> Cow<'_, str> {
    SHORTCODE_RE.replace_all(text, |caps: &Captures| {
        emojis::get_by_shortcode(&caps[1])
            .map_or_else(|| caps[0].to_string(), |emoji| emoji.as_str().to_string())
    })
}

/// Give every quote block inside a post body the inline quote style.
///
/// Any `style` the forum put on a quote is replaced. Returns the number of
/// quote blocks touched.
pub fn restyle_quotes(document: &mut Html) -> usize {
    let ids: Vec<_> = document.select(&QUOTE_SELECTOR).map(|quote| quote.id()).collect();
    let style = QualName::new(None, Namespace::from(""), LocalName::from("style"));

    for id in &ids {
        let Some(mut node) = document.tree.get_mut(*id) else {
            continue;
        };
        if let Node::Element(element) = node.value() {
            element.attrs.retain(|(name, _)| *name != style);
            element.attrs.push((style.clone(), StrTendril::from(QUOTE_STYLE)));
            // attribute lookups binary search the list
            element.attrs.sort_unstable_by(|lhs, rhs| lhs.0.cmp(&rhs.0));
        }
    }

    ids.len()
}

/// Concatenate the text nodes that are direct children of `body`.
///
/// Text inside nested elements (quotes, spoilers, links) is skipped, which
/// keeps the excerpt to the author's own words.
#[must_use]
pub fn direct_text(body: ElementRef<'_>) -> String {
    body.children()
        .filter_map(|child| child.value().as_text())
        .map(|text| &**text)
        .collect()
}

/// Drop leading characters that are neither letters nor digits, then
/// surrounding whitespace.
#[must_use]
pub fn trim_excerpt(text: &str) -> &str {
    text.trim_start_matches(|c: char| !c.is_alphanumeric()).trim()
}

/// Plain-text excerpt of a post body, with emoji decoded.
#[must_use]
pub fn excerpt(body: ElementRef<'_>) -> String {
    trim_excerpt(&decode_shortcodes(&direct_text(body))).to_string()
}
