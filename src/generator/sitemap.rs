//! Sitemap generation.
//!
//! Generates `sitemap.xml` listing the configured static routes followed by
//! one entry per eligible message, plus the optional XSL stylesheet that
//! renders it in a browser.
//!
//! # Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <?xml-stylesheet type="text/xsl" href="/sitemap.xsl"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/message/teams-update</loc>
//!     <lastmod>2025-01-01</lastmod>
//!     <changefreq>weekly</changefreq>
//!     <priority>0.7</priority>
//!   </url>
//! </urlset>
//! ```

use crate::{
    config::{ChangeFreq, PathResolver, RouteConfig, SiteConfig},
    log,
    message::SlugIndex,
    utils::{
        date,
        fs::write_file,
        minify::{MinifyType, minify},
        xml::escape,
    },
};
use anyhow::Result;
use chrono::{DateTime, Utc};

// ============================================================================
// Constants
// ============================================================================

/// XML namespace for sitemap
pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Every message entry uses the same hints.
const MESSAGE_CHANGEFREQ: ChangeFreq = ChangeFreq::Weekly;
const MESSAGE_PRIORITY: f32 = 0.7;

/// Browser-facing rendering of the sitemap.
const SITEMAP_XSL: &str = include_str!("../embed/sitemap.xsl");

// ============================================================================
// Public API
// ============================================================================

/// Write the sitemap (and stylesheet) if enabled, returning the URL count.
pub fn build_sitemap(config: &SiteConfig, index: &SlugIndex<'_>, now: DateTime<Utc>) -> Result<usize> {
    let sitemap_cfg = &config.build.sitemap;
    if !sitemap_cfg.enable {
        return Ok(0);
    }

    let paths = config.paths();
    let mut sitemap = Sitemap::build(&sitemap_cfg.routes, index, config.base_url(), now);

    if sitemap_cfg.xsl {
        let xsl_path = paths.output_file(&sitemap_cfg.xsl_path);
        write_file(&xsl_path, SITEMAP_XSL)?;
        sitemap = sitemap.with_stylesheet(paths.url_for(&sitemap_cfg.xsl_path));
    }

    let count = sitemap.len();
    let sitemap_path = paths.output_file(&sitemap_cfg.path);
    let xml = sitemap.into_xml();
    write_file(&sitemap_path, minify(MinifyType::Xml(xml.as_bytes()), config))?;

    log!("sitemap"; "{} urls ({} routes, {} messages)", count, sitemap_cfg.routes.len(), index.len());
    Ok(count)
}

// ============================================================================
// Sitemap Implementation
// ============================================================================

/// Sitemap data structure
#[derive(Debug, Clone)]
pub struct Sitemap {
    /// Site-relative stylesheet href for the `xml-stylesheet` instruction
    stylesheet: Option<String>,
    /// List of URL entries
    urls: Vec<UrlEntry>,
}

/// Single URL entry in the sitemap
#[derive(Debug, Clone, PartialEq)]
pub struct UrlEntry {
    /// Full URL location
    pub loc: String,
    /// Last modification date (YYYY-MM-DD format)
    pub lastmod: String,
    pub changefreq: ChangeFreq,
    pub priority: f32,
}

impl Sitemap {
    /// Static routes first, then messages in source order.
    ///
    /// Static routes carry the build date; messages their last-modified or
    /// published date, else the build date.
    pub fn build(
        routes: &[RouteConfig],
        index: &SlugIndex<'_>,
        base_url: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let today = date::to_ymd(now);

        let static_urls = routes.iter().map(|route| UrlEntry {
            loc: format!("{base_url}{}", route.path),
            lastmod: today.clone(),
            changefreq: route.changefreq,
            priority: route.priority,
        });

        let message_urls = index.entries.iter().map(|entry| UrlEntry {
            loc: format!("{base_url}{}", PathResolver::message_url(&entry.slug)),
            lastmod: date::to_ymd(entry.message.modified_or_published().unwrap_or(now)),
            changefreq: MESSAGE_CHANGEFREQ,
            priority: MESSAGE_PRIORITY,
        });

        Self {
            stylesheet: None,
            urls: static_urls.chain(message_urls).collect(),
        }
    }

    /// Reference an XSL stylesheet from the sitemap.
    pub fn with_stylesheet(mut self, href: String) -> Self {
        self.stylesheet = Some(href);
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.urls.len()
    }


    /// Generate sitemap XML string.
    pub fn into_xml(self) -> String {
        let mut xml = String::with_capacity(256 + self.urls.len() * 160);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        if let Some(href) = &self.stylesheet {
            xml.push_str(&format!(
                r#"<?xml-stylesheet type="text/xsl" href="{}"?>"#,
                escape(href)
            ));
            xml.push('\n');
        }
        xml.push_str(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#));
        xml.push('\n');

        for entry in self.urls {
            xml.push_str("  <url>\n");
            xml.push_str(&format!("    <loc>{}</loc>\n", escape(&entry.loc)));
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", entry.lastmod));
            xml.push_str(&format!(
                "    <changefreq>{}</changefreq>\n",
                entry.changefreq.as_str()
            ));
            xml.push_str(&format!("    <priority>{:.1}</priority>\n", entry.priority));
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }
}

// ============================================================================
// Tests
// ============================================================================
