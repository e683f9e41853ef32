//! Sitemap Module
//!
//! 生成済みの構造化データファイルを参照するサイトマップ（`<urlset>`）を
//! 組み立てて書き出すモジュール。

mod clients;
mod discovery;
mod simple;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::SheetSiteError;

pub use clients::{
    ClientRunOutcome, ClientSitemapAssembler, ClientSitemapBuilder, RowOutcome, RunReport,
};
pub use simple::{SitemapAssembler, SitemapBuilder, SitemapSummary};

/// サイトマッププロトコルの名前空間
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// `lastmod`の書式（秒精度、UTC）
pub const LASTMOD_FORMAT: &str = "%Y-%m-%dT%H:%M:%S+00:00";

/// サイトマップの1エントリー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    /// 絶対URL
    pub loc: String,
    /// 最終更新日時
    pub lastmod: DateTime<Utc>,
}

impl SitemapEntry {
    pub fn new(loc: impl Into<String>, lastmod: DateTime<Utc>) -> Self {
        Self {
            loc: loc.into(),
            lastmod,
        }
    }
}

/// `lastmod`要素の文字列表現
pub fn format_lastmod(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(LASTMOD_FORMAT).to_string()
}

/// ベースURLと相対パスを`/`で連結
pub fn join_url(base: &str, relative: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        relative.trim_start_matches('/')
    )
}

/// エントリーを`<urlset>`ドキュメントとして出力する
///
/// # 出力例
///
/// ```xml
/// <?xml version="1.0" encoding="UTF-8"?>
/// <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
///   <url>
///     <loc>https://acme.io/schema-files/faqs/faq.json</loc>
///     <lastmod>2025-01-01T00:00:00+00:00</lastmod>
///   </url>
/// </urlset>
/// ```
pub fn render_urlset<W: Write>(entries: &[SitemapEntry], writer: W) -> Result<(), SheetSiteError> {
    let mut xml = Writer::new_with_indent(writer, b' ', 2);

    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    xml.write_event(Event::Start(
        BytesStart::new("urlset").with_attributes([("xmlns", SITEMAP_NAMESPACE)]),
    ))?;

    for entry in entries {
        xml.write_event(Event::Start(BytesStart::new("url")))?;
        write_text_element(&mut xml, "loc", &entry.loc)?;
        write_text_element(&mut xml, "lastmod", &format_lastmod(&entry.lastmod))?;
        xml.write_event(Event::End(BytesEnd::new("url")))?;
    }

    xml.write_event(Event::End(BytesEnd::new("urlset")))?;
    xml.into_inner().flush()?;
    Ok(())
}

fn write_text_element<W: Write>(
    xml: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), SheetSiteError> {
    xml.write_event(Event::Start(BytesStart::new(name)))?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    xml.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// サイトマップをファイルに書き出す（既存ファイルは上書き）
pub fn write_sitemap(path: &Path, entries: &[SitemapEntry]) -> Result<(), SheetSiteError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    render_urlset(entries, BufWriter::new(File::create(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn render(entries: &[SitemapEntry]) -> String {
        let mut output = Vec::new();
        render_urlset(entries, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_format_lastmod() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(format_lastmod(&ts), "2025-03-04T05:06:07+00:00");
    }

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("https://acme.io/", "/schema-files/faqs/faq.json"),
            "https://acme.io/schema-files/faqs/faq.json"
        );
        assert_eq!(join_url("https://acme.io", "a.json"), "https://acme.io/a.json");
    }

    #[test]
    fn test_render_urlset() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let xml = render(&[SitemapEntry::new("https://acme.io/a.json", ts)]);

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(&format!("<urlset xmlns=\"{}\">", SITEMAP_NAMESPACE)));
        assert!(xml.contains("<loc>https://acme.io/a.json</loc>"));
        assert!(xml.contains("<lastmod>2025-01-01T00:00:00+00:00</lastmod>"));
        assert!(xml.trim_end().ends_with("</urlset>"));
        assert!(!xml.contains("priority"));
        assert!(!xml.contains("changefreq"));
    }

    #[test]
    fn test_render_escapes_text() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let xml = render(&[SitemapEntry::new("https://acme.io/a&b.json", ts)]);
        assert!(xml.contains("<loc>https://acme.io/a&amp;b.json</loc>"));
    }

    #[test]
    fn test_render_empty_urlset() {
        let xml = render(&[]);
        assert!(xml.contains("<urlset"));
        assert!(!xml.contains("<url>"));
    }

    #[test]
    fn test_write_sitemap_creates_parent() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("nested").join("sitemap.xml");
        write_sitemap(&path, &[]).unwrap();
        assert!(path.is_file());
    }
}
