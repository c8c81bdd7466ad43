//! RSS feed reader
//!
//! Fetches a feed URL and extracts its latest items. Only the fields
//! the newsletter needs are kept: title, link, description, publish
//! date. Parsing tolerates CDATA-wrapped content, which most of the
//! tracked feeds use for descriptions.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::errors::AppError;
use crate::xml::read_flat_text;

/// Newest items kept per feed.
pub const MAX_ITEMS_PER_FEED: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub published: String,
}

/// Fetch a feed and return its latest [`MAX_ITEMS_PER_FEED`] items in
/// document order.
pub async fn fetch_feed(client: &reqwest::Client, url: &str) -> Result<Vec<FeedItem>, AppError> {
    let res = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::FetchFailed(format!("feed request failed: {e}")))?;

    let status = res.status();
    if !status.is_success() {
        return Err(AppError::FetchFailed(format!("feed returned HTTP {status}")));
    }

    let body = res
        .text()
        .await
        .map_err(|e| AppError::FetchFailed(format!("feed body read failed: {e}")))?;

    let mut items = parse_rss_items(&body)?;
    items.truncate(MAX_ITEMS_PER_FEED);
    Ok(items)
}

/// Parse `<item>` entries out of an RSS document. Channel-level title
/// and description elements are ignored. Items without a publish date
/// fall back to the current time.
pub fn parse_rss_items(xml: &str) -> Result<Vec<FeedItem>, AppError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    struct Builder {
        title: String,
        link: String,
        description: String,
        published: Option<String>,
    }

    let mut items = Vec::new();
    let mut current: Option<Builder> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"item" => {
                        current = Some(Builder {
                            title: String::new(),
                            link: String::new(),
                            description: String::new(),
                            published: None,
                        });
                    }
                    b"title" | b"link" | b"description" | b"pubDate" => {
                        // Borrow scope: element name copied before the
                        // reader is advanced.
                        let tag = name.as_ref().to_vec();
                        let text = read_flat_text(&mut reader, &tag)
                            .map_err(|e| AppError::FetchFailed(format!("malformed feed: {e}")))?;
                        if let Some(item) = current.as_mut() {
                            match tag.as_slice() {
                                b"title" => item.title = text,
                                b"link" => item.link = text,
                                b"description" => item.description = text,
                                b"pubDate" => item.published = Some(text),
                                _ => unreachable!(),
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"item" => {
                if let Some(b) = current.take() {
                    items.push(FeedItem {
                        title: b.title,
                        link: b.link,
                        description: b.description,
                        published: b
                            .published
                            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
                    });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(AppError::FetchFailed(format!("malformed feed: {e}"))),
            _ => {}
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0"?>
        <rss version="2.0">
          <channel>
            <title>FierceBiotech</title>
            <link>https://example.com</link>
            <description>Channel level, must be ignored</description>
            <item>
              <title>Gene therapy milestone</title>
              <link>https://example.com/a</link>
              <description><![CDATA[A <b>big</b> deal for the field.]]></description>
              <pubDate>Mon, 24 Aug 2026 10:00:00 GMT</pubDate>
            </item>
            <item>
              <title>Series B round</title>
              <link>https://example.com/b</link>
              <description>Startup raises cash.</description>
            </item>
          </channel>
        </rss>"#;

    #[test]
    fn parses_items_not_channel_metadata() {
        let items = parse_rss_items(FEED).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Gene therapy milestone");
        assert_eq!(items[0].link, "https://example.com/a");
        assert_eq!(items[0].published, "Mon, 24 Aug 2026 10:00:00 GMT");
    }

    #[test]
    fn cdata_descriptions_are_flattened() {
        let items = parse_rss_items(FEED).unwrap();
        assert_eq!(items[0].description, "A <b>big</b> deal for the field.");
    }

    #[test]
    fn missing_pub_date_falls_back_to_now() {
        let items = parse_rss_items(FEED).unwrap();
        assert!(!items[1].published.is_empty());
    }

    #[test]
    fn malformed_feed_is_a_fetch_failure() {
        assert!(parse_rss_items("<rss><channel><item></rss>").is_err());
    }
}
