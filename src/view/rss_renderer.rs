use std::io::Cursor;

use chrono::{NaiveDate, TimeZone, Utc};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/* Shape of the output:
<?xml version="1.0" encoding="UTF-8" ?>
<rss version="2.0">
<channel>
  <title>My Writing</title>
  <link>https://example.com</link>
  <description>Notes and essays</description>
  <item>
    <title>Hello, World</title>
    <link>https://example.com/hello-world</link>
    <guid isPermaLink="false">hello-world</guid>
    <description><![CDATA[<p>...</p>]]></description>
    <pubDate>Tue, 2 Jan 2024 00:00:00 +0000</pubDate>
  </item>
</channel>
</rss>
*/

/// One feed entry, already flattened for the wire: plain-text title, HTML
/// description, `YYYY-MM-DD` date (possibly empty).
pub struct FeedItem {
    pub title: String,
    pub slug: String,
    pub date: String,
    pub description: String,
}

pub struct RssChannel<'a> {
    pub ch_title: &'a str,
    pub ch_link: &'a str,
    pub ch_desc: &'a str,
}

impl<'a> RssChannel<'a> {
    pub fn render(&self, items: &[FeedItem]) -> quick_xml::Result<Vec<u8>> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        let decl = Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None));
        writer.write_event(decl)?;

        let mut rss = BytesStart::new("rss");
        rss.push_attribute(("version", "2.0"));
        writer.write_event(Event::Start(rss))?;

        writer.write_event(Event::Start(BytesStart::new("channel")))?;

        push_text(&mut writer, "title", self.ch_title)?;
        push_text(&mut writer, "link", self.ch_link)?;
        push_text(&mut writer, "description", self.ch_desc)?;

        for item in items {
            writer.write_event(Event::Start(BytesStart::new("item")))?;

            push_text(&mut writer, "title", item.title.as_str())?;

            let link = full_link(self.ch_link, item.slug.as_str());
            push_text(&mut writer, "link", link.as_str())?;

            // The slug is the stable identity, not the URL
            let mut guid_elem = BytesStart::new("guid");
            guid_elem.push_attribute(("isPermaLink", "false"));
            writer.write_event(Event::Start(guid_elem))?;
            writer.write_event(Event::Text(BytesText::new(item.slug.as_str())))?;
            writer.write_event(Event::End(BytesEnd::new("guid")))?;

            push_cdata(&mut writer, "description", item.description.as_str())?;

            // Posts carry a date only; readers get midnight UTC. A date that
            // does not parse means no pubDate at all.
            if let Ok(date) = NaiveDate::parse_from_str(item.date.as_str(), "%Y-%m-%d") {
                if let Some(date_time) = date.and_hms_opt(0, 0, 0) {
                    let pub_date = Utc.from_utc_datetime(&date_time).to_rfc2822();
                    push_text(&mut writer, "pubDate", pub_date.as_str())?;
                }
            }

            writer.write_event(Event::End(BytesEnd::new("item")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("channel")))?;
        writer.write_event(Event::End(BytesEnd::new("rss")))?;

        Ok(writer.into_inner().into_inner())
    }
}

fn full_link(base_url: &str, slug: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), slug)
}

fn push_text(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn push_cdata(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    if text.contains("]]>") {
        let new_text = text.replace("]]>", "]] >");
        writer.write_event(Event::CData(BytesCData::new(&new_text)))?;
    } else {
        writer.write_event(Event::CData(BytesCData::new(text)))?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str;

    use super::*;

    #[test]
    fn render_xml() {
        let items = vec![
            FeedItem {
                title: "Hello, World".to_string(),
                slug: "hello-world".to_string(),
                date: "2024-01-02".to_string(),
                description: "<p>First</p>".to_string(),
            },
            FeedItem {
                title: "Undated".to_string(),
                slug: "undated".to_string(),
                date: String::new(),
                description: "<p>Second</p>".to_string(),
            },
        ];

        let rss = RssChannel {
            ch_title: "my feed",
            ch_link: "https://example.com/",
            ch_desc: "My blog feed",
        };
        let xml = rss.render(&items).unwrap();
        assert_eq!(str::from_utf8(&xml).unwrap(), EXPECTED);
    }

    const EXPECTED: &str = r##"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel><title>my feed</title><link>https://example.com/</link><description>My blog feed</description><item><title>Hello, World</title><link>https://example.com/hello-world</link><guid isPermaLink="false">hello-world</guid><description><![CDATA[<p>First</p>]]></description><pubDate>Tue, 2 Jan 2024 00:00:00 +0000</pubDate></item><item><title>Undated</title><link>https://example.com/undated</link><guid isPermaLink="false">undated</guid><description><![CDATA[<p>Second</p>]]></description></item></channel></rss>"##;
}
