//! Minification for generated HTML pages and sitemap XML.
//!
//! Controlled by `[build] minify`. Copied assets are never touched.

use crate::config::SiteConfig;
use regex::Regex;
use std::{borrow::Cow, sync::LazyLock};

/// Content type for minification.
pub enum MinifyType<'a> {
    Html(&'a [u8]),
    Xml(&'a [u8]),
}

/// Minify content based on type and config.
///
/// Returns `Cow::Borrowed` if minify disabled, `Cow::Owned` if minified.
pub fn minify<'a>(content: MinifyType<'a>, config: &SiteConfig) -> Cow<'a, [u8]> {
    match (config.build.minify, content) {
        (false, MinifyType::Html(bytes) | MinifyType::Xml(bytes)) => Cow::Borrowed(bytes),
        (true, MinifyType::Html(html)) => Cow::Owned(minify_html_inner(html)),
        (true, MinifyType::Xml(xml)) => Cow::Owned(minify_xml_inner(xml)),
    }
}

/// Minify HTML using `minify_html`.
///
/// Inline scripts are left as written: the template carries the client
/// bundle bootstrap and pages carry JSON-LD.
fn minify_html_inner(html: &[u8]) -> Vec<u8> {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = false;
    minify_html::minify(html, &cfg)
}

/// Minify XML by dropping whitespace between tags. Text content, including
/// line breaks inside it, is kept as is.
fn minify_xml_inner(xml: &[u8]) -> Vec<u8> {
    static RE_BETWEEN_TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r">\s+<").unwrap());

    let xml = String::from_utf8_lossy(xml);
    RE_BETWEEN_TAGS
        .replace_all(xml.trim(), "><")
        .into_owned()
        .into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_minify(enabled: bool) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.build.minify = enabled;
        config
    }

    #[test]
    fn test_minify_html_removes_whitespace() {
        let html = b"<html>\n  <head>\n  </head>\n  <body>\n    <p>Hello</p>\n  </body>\n</html>";
        let result = minify(MinifyType::Html(html), &config_with_minify(true));
        let result_str = String::from_utf8_lossy(&result);

        assert!(!result_str.contains("\n  "));
        assert!(result_str.contains("<p>Hello</p>"));
    }

    #[test]
    fn test_minify_html_keeps_json_ld() {
        let html = br#"<html><head><script type="application/ld+json">{"@type": "Article"}</script></head><body></body></html>"#;
        let result = minify(MinifyType::Html(html), &config_with_minify(true));
        let result_str = String::from_utf8_lossy(&result);

        assert!(result_str.contains("application/ld+json"));
        assert!(result_str.contains("Article"));
    }

    #[test]
    fn test_minify_disabled_borrows() {
        let html = b"<html>\n  <body>\n  </body>\n</html>";
        let result = minify(MinifyType::Html(html), &config_with_minify(false));

        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(&*result, html);
    }

    #[test]
    fn test_minify_xml_sitemap_like() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">

  <url>
    <loc>https://example.com/</loc>
    <lastmod>2025-01-01</lastmod>
  </url>
</urlset>"#;
        let result = minify(MinifyType::Xml(xml), &config_with_minify(true));

        assert_eq!(
            &*result,
            br#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><url><loc>https://example.com/</loc><lastmod>2025-01-01</lastmod></url></urlset>"#
                .as_slice()
        );
    }

    #[test]
    fn test_minify_xml_keeps_text_line_breaks() {
        let xml = b"<url>\n  <title>Teams\nupdate rollout</title>\n  <name> Site </name>\n</url>\n";
        let result = minify(MinifyType::Xml(xml), &config_with_minify(true));

        assert_eq!(
            &*result,
            b"<url><title>Teams\nupdate rollout</title><name> Site </name></url>".as_slice()
        );
    }

    #[test]
    fn test_minify_xml_disabled() {
        let xml = b"<root>\n  <item/>\n</root>";
        let result = minify(MinifyType::Xml(xml), &config_with_minify(false));
        assert_eq!(&*result, xml.as_slice());
    }
}
