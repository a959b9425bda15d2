use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

use crate::constants::DEFAULT_USER_AGENT;
use super::provider::{Feed, FeedItem};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("can't write feed xml: {0}")]
    Xml(String),
    #[error("feed xml is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

type XmlWriter = Writer<Vec<u8>>;

/// Generate RSS 2.0 feed XML
///
/// # Errors
///
/// Returns an error if the document cannot be written.
pub fn generate_rss(feed: &Feed) -> Result<String, FeedError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write(
        &mut writer,
        Event::Start(BytesStart::new("rss").with_attributes([
            ("version", "2.0"),
            ("xmlns:atom", "http://www.w3.org/2005/Atom"),
        ])),
    )?;
    write(&mut writer, Event::Start(BytesStart::new("channel")))?;

    text_element(&mut writer, "title", &feed.title)?;
    if !feed.id.is_empty() {
        text_element(&mut writer, "atom:id", &feed.id)?;
    }
    text_element(&mut writer, "link", &feed.link)?;
    text_element(&mut writer, "description", &feed.description)?;
    text_element(&mut writer, "generator", DEFAULT_USER_AGENT)?;
    if let Some(updated) = feed.last_updated() {
        text_element(&mut writer, "lastBuildDate", &updated.to_rfc2822())?;
    }

    for item in &feed.items {
        write_item(&mut writer, item)?;
    }

    write(&mut writer, Event::End(BytesEnd::new("channel")))?;
    write(&mut writer, Event::End(BytesEnd::new("rss")))?;

    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_item(writer: &mut XmlWriter, item: &FeedItem) -> Result<(), FeedError> {
    write(writer, Event::Start(BytesStart::new("item")))?;

    text_element(writer, "title", &item.title)?;
    if !item.link.is_empty() {
        text_element(writer, "link", &item.link)?;
    }
    cdata_element(writer, "description", &item.description)?;

    write(
        writer,
        Event::Start(BytesStart::new("guid").with_attributes([("isPermaLink", "false")])),
    )?;
    write(writer, Event::Text(BytesText::new(&item.id)))?;
    write(writer, Event::End(BytesEnd::new("guid")))?;

    if let Some(published) = item.created.or(item.updated) {
        text_element(writer, "pubDate", &published.to_rfc2822())?;
    }
    if let Some(updated) = item.updated {
        text_element(writer, "atom:updated", &updated.to_rfc3339())?;
    }

    write(writer, Event::End(BytesEnd::new("item")))
}

fn text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<(), FeedError> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(name)))
}

/// Write `html` unescaped; a `]]>` inside it is split across sections.
fn cdata_element(writer: &mut XmlWriter, name: &str, html: &str) -> Result<(), FeedError> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    for section in BytesCData::escaped(html) {
        write(writer, Event::CData(section))?;
    }
    write(writer, Event::End(BytesEnd::new(name)))
}

fn write(writer: &mut XmlWriter, event: Event<'_>) -> Result<(), FeedError> {
    writer
        .write_event(event)
        .map_err(|e| FeedError::Xml(e.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};

    use super::*;

    fn sample_feed() -> Feed {
        let created = Local.with_ymd_and_hms(2024, 3, 15, 14, 30, 0).unwrap();
        let updated = Local.with_ymd_and_hms(2024, 3, 15, 15, 5, 0).unwrap();
        Feed {
            id: "4pda-100".to_string(),
            title: "Смартфон X & Co".to_string(),
            link: "http://4pda.ru/forum/index.php?showtopic=100".to_string(),
            description: "Latest messages".to_string(),
            items: vec![
                FeedItem {
                    id: "http://4pda.ru/p/1".to_string(),
                    title: "Первый".to_string(),
                    link: "http://4pda.ru/p/1".to_string(),
                    created: Some(created),
                    updated: None,
                    description: "<div class=\"quote\">q</div>text".to_string(),
                },
                FeedItem {
                    id: format!("2#{}", updated.timestamp()),
                    title: "Второй".to_string(),
                    link: String::new(),
                    created: Some(created),
                    updated: Some(updated),
                    description: "b".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_generate_rss_empty() {
        let rss = generate_rss(&Feed::default()).unwrap();
        assert!(rss.contains("<?xml version="));
        assert!(rss.contains("<rss version=\"2.0\""));
        assert!(rss.contains("<channel>"));
        assert!(!rss.contains("<item>"));
        assert!(!rss.contains("lastBuildDate"));
        assert!(!rss.contains("atom:id"));
    }

    #[test]
    fn test_generate_rss_items() {
        let rss = generate_rss(&sample_feed()).unwrap();

        assert!(rss.contains("<title>Смартфон X &amp; Co</title>"));
        assert!(rss.contains("<atom:id>4pda-100</atom:id>"));
        assert_eq!(rss.matches("<item>").count(), 2);
        assert!(rss.contains("<guid isPermaLink=\"false\">http://4pda.ru/p/1</guid>"));
        assert!(rss.contains(r#"<description><![CDATA[<div class="quote">q</div>text]]></description>"#));
        assert!(rss.contains("<pubDate>"));
        assert_eq!(rss.matches("<atom:updated>").count(), 1);
        assert_eq!(rss.matches("<link>").count(), 2);
        assert!(rss.contains("<lastBuildDate>"));
    }

    #[test]
    fn test_cdata_terminator_in_html_is_split() {
        let mut feed = sample_feed();
        feed.items[1].description = "<code>a]]>b</code>".to_string();
        let rss = generate_rss(&feed).unwrap();

        assert!(rss.contains("<![CDATA[<code>a]]]]><![CDATA[>b</code>]]>"));
    }

    #[test]
    fn test_items_keep_window_order() {
        let rss = generate_rss(&sample_feed()).unwrap();
        let first = rss.find("Первый").unwrap();
        let second = rss.find("Второй").unwrap();
        assert!(first < second);
    }
}
