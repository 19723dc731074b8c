//! Google News sitemap generation.
//!
//! ```xml
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"
//!         xmlns:news="http://www.google.com/schemas/sitemap-news/0.9">
//!   <url>
//!     <loc>https://example.com/message/teams-update</loc>
//!     <news:news>
//!       <news:publication>
//!         <news:name>Microsoft 365 Message Center</news:name>
//!         <news:language>en</news:language>
//!       </news:publication>
//!       <news:publication_date>2025-01-01T00:00:00Z</news:publication_date>
//!       <news:title>Teams update</news:title>
//!       <news:keywords>Microsoft Teams, Microsoft 365</news:keywords>
//!     </news:news>
//!   </url>
//! </urlset>
//! ```

use super::{seo, sitemap::SITEMAP_NS};
use crate::{
    config::{PathResolver, SiteConfig},
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

const NEWS_NS: &str = "http://www.google.com/schemas/sitemap-news/0.9";

/// Write the news sitemap if enabled, returning the entry count.
pub fn build_news_sitemap(
    config: &SiteConfig,
    index: &SlugIndex<'_>,
    now: DateTime<Utc>,
) -> Result<usize> {
    let sitemap_cfg = &config.build.sitemap;
    if !sitemap_cfg.enable || !sitemap_cfg.news {
        return Ok(0);
    }

    let news = NewsSitemap::build(config, index, now, sitemap_cfg.news_limit);
    if news.truncated > 0 {
        log!("news"; "limit {} reached, {} messages left out", sitemap_cfg.news_limit, news.truncated);
    }

    let count = news.len();
    let path = config.paths().output_file(&sitemap_cfg.news_path);
    let xml = news.into_xml();
    write_file(&path, minify(MinifyType::Xml(xml.as_bytes()), config))?;

    log!("news"; "{} entries", count);
    Ok(count)
}

/// News sitemap data structure
#[derive(Debug, Clone)]
pub struct NewsSitemap {
    /// Publication name
    name: String,
    language: String,
    entries: Vec<NewsEntry>,
    /// Messages dropped by the entry limit
    truncated: usize,
}

#[derive(Debug, Clone)]
struct NewsEntry {
    loc: String,
    publication_date: String,
    title: String,
    keywords: Vec<String>,
}

impl NewsSitemap {
    /// The first `limit` eligible messages, in source order.
    pub fn build(
        config: &SiteConfig,
        index: &SlugIndex<'_>,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Self {
        let entries = index
            .entries
            .iter()
            .take(limit)
            .map(|entry| {
                let msg = entry.message;
                let description = seo::description(msg);
                NewsEntry {
                    loc: config.absolute_url(&PathResolver::message_url(&entry.slug)),
                    publication_date: date::to_w3c(msg.published_or_modified().unwrap_or(now)),
                    title: msg.title.clone(),
                    keywords: seo::keywords(msg, &description),
                }
            })
            .collect();

        Self {
            name: config.base.title.clone(),
            language: config.base.language.clone(),
            entries,
            truncated: index.len().saturating_sub(limit),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn into_xml(self) -> String {
        let mut xml = String::with_capacity(256 + self.entries.len() * 512);
        let name = escape(&self.name);
        let language = escape(&self.language);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(
            r#"<urlset xmlns="{SITEMAP_NS}" xmlns:news="{NEWS_NS}">"#
        ));
        xml.push('\n');

        for entry in &self.entries {
            xml.push_str("  <url>\n");
            xml.push_str(&format!("    <loc>{}</loc>\n", escape(&entry.loc)));
            xml.push_str("    <news:news>\n");
            xml.push_str("      <news:publication>\n");
            xml.push_str(&format!("        <news:name>{name}</news:name>\n"));
            xml.push_str(&format!("        <news:language>{language}</news:language>\n"));
            xml.push_str("      </news:publication>\n");
            xml.push_str(&format!(
                "      <news:publication_date>{}</news:publication_date>\n",
                entry.publication_date
            ));
            xml.push_str(&format!("      <news:title>{}</news:title>\n", escape(&entry.title)));
            if !entry.keywords.is_empty() {
                xml.push_str(&format!(
                    "      <news:keywords>{}</news:keywords>\n",
                    escape(&entry.keywords.join(", "))
                ));
            }
            xml.push_str("    </news:news>\n");
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }
}
