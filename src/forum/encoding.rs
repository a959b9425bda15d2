//! Encoding Normalizer: pick a decoder for a forum page and decode it.
//!
//! Old threads on the forum are still served in legacy Cyrillic code pages
//! while newer ones are UTF-8, so the charset has to be sniffed per page.

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use tracing::warn;

/// Content type assumed when the server did not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html";

/// How many leading bytes are scanned for a `<meta>` charset declaration.
const META_PRESCAN_LEN: usize = 1024;

static META_CHARSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i-u)<meta[^>]+charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#).expect("Invalid regex")
});

/// Result of decoding a page body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPage {
    pub html: String,
    pub encoding: &'static Encoding,
}

/// Decode raw page bytes into UTF-8 text.
///
/// Order of evidence: byte order mark, `charset` of the content type, a
/// `<meta>` declaration near the start of the document, then statistical
/// detection over the whole body.
#[must_use]
pub fn decode_page(bytes: &[u8], content_type: &str) -> DecodedPage {
    let content_type = if content_type.trim().is_empty() {
        DEFAULT_CONTENT_TYPE
    } else {
        content_type
    };

    let encoding = determine_encoding(bytes, content_type);
    let (text, actual, had_errors) = encoding.decode(bytes);
    if had_errors {
        warn!(
            encoding = actual.name(),
            "Page contains malformed byte sequences, replaced with U+FFFD"
        );
    }

    DecodedPage {
        html: text.into_owned(),
        encoding: actual,
    }
}

/// Choose the encoding of a page from its header hint and content.
#[must_use]
pub fn determine_encoding(bytes: &[u8], content_type: &str) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }

    if let Some(encoding) =
        charset_param(content_type).and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return encoding;
    }

    if let Some(encoding) = meta_charset(bytes) {
        return encoding;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']))
            .filter(|v| !v.is_empty())
    })
}

fn meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(META_PRESCAN_LEN)];
    let caps = META_CHARSET_RE.captures(head)?;
    let encoding = Encoding::for_label(caps.get(1)?.as_bytes())?;
    // a UTF-16 label in an ASCII-compatible prescan means the page is really UTF-8
    if encoding == encoding_rs::UTF_16LE || encoding == encoding_rs::UTF_16BE {
        return Some(encoding_rs::UTF_8);
    }
    Some(encoding)
}
