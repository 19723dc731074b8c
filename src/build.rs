//! Site building orchestration.
//!
//! Coordinates tree copies, sitemap and page generation, and auxiliary files.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── ensure_output()           ── --clean removes the output first
//!     │
//!     ├── copy assets               → dist/
//!     ├── copy data                 → dist/{data_url}/  (overwrites assets)
//!     │
//!     ├── related::publish_latest()  ── newest blog CSV → {latest}
//!     │
//!     ├── MessageSet::load()        ── failure degrades to no messages
//!     │       └── slug_index()
//!     │
//!     ├── sitemap.xml, sitemap.xsl, news-sitemap.xml
//!     ├── message/{slug}/index.html, message/{slug}.html
//!     ├── sw.js, .nojekyll, build-info.json
//!     │
//!     └── size check
//! ```

use crate::{
    config::{NOJEKYLL_FILE, SiteConfig},
    generator::{
        build_info::{BuildInfo, Release},
        news::build_news_sitemap,
        page::{self, PageContext, Template},
        service_worker::build_service_worker,
        sitemap::build_sitemap,
    },
    log,
    message::{MessageSet, SlugIndex},
    related::{self, BlogPost},
    utils::fs::{copy_tree, dir_size, format_size, write_file},
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::{fs, path::Path};

/// Counts from one build, also recorded in `build-info.json`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Records in the feed
    pub messages: usize,
    /// Messages with a URL
    pub eligible: usize,
    /// Records without a usable title
    pub untitled: usize,
    /// Records dropped because an earlier message took their slug
    pub collisions: usize,
    pub pages: usize,
    pub failed_pages: usize,
    pub sitemap_urls: usize,
    pub news_urls: usize,
    pub output_bytes: u64,
}

/// Build the entire site into `config.build.output`.
///
/// `now` is the build timestamp used for static `lastmod`, missing message
/// dates, the service worker cache name and the manifest.
pub fn build_site(config: &SiteConfig, release: &Release, now: DateTime<Utc>) -> Result<BuildReport> {
    let paths = config.paths();
    let output = paths.output_dir();
    let mut report = BuildReport::default();

    ensure_output(output, config.build.clean)?;

    // The asset tree may carry its own `{data_url}/`; the data tree lands
    // second so its files replace those. Each copy is parallel per file.
    copy_source_tree("assets", &config.build.assets, output, config)?;
    copy_source_tree("data", &config.build.data, &paths.data_dir(), config)?;

    let posts = load_related(config);

    let feed = paths.feed();
    let messages = match MessageSet::load(&feed) {
        Ok(messages) if messages.is_empty() => {
            log!("warn"; "{} holds no messages", feed.display());
            messages
        }
        Ok(messages) => messages,
        Err(e) => {
            log!("warn"; "no messages loaded, building static routes only: {:#}", anyhow::Error::from(e));
            MessageSet::default()
        }
    };
    let index = messages.slug_index();
    report_index(&messages, &index, &mut report);

    report.sitemap_urls = build_sitemap(config, &index, now)?;
    report.news_urls = build_news_sitemap(config, &index, now)?;

    if config.build.pages.enable {
        let template = Template::load(&paths.output_file(&config.build.template))?;
        let ctx = PageContext {
            config,
            posts: &posts,
            now,
        };
        let emitted = page::emit_all(&template, &index, &ctx);
        report.pages = emitted.written;
        report.failed_pages = emitted.failed;
        log!("pages"; "{} written, {} failed", emitted.written, emitted.failed);
    }

    build_service_worker(config, now)?;
    write_file(&paths.output_file(NOJEKYLL_FILE), "")?;

    BuildInfo {
        messages: report.messages,
        pages: report.pages,
        sitemap_urls: report.sitemap_urls,
        ..BuildInfo::new(release, now)
    }
    .write(config)?;

    report.output_bytes = dir_size(output);
    check_size(report.output_bytes, config);

    log_summary(&report);
    Ok(report)
}

/// Ensure output directory exists.
///
/// When `clean` is true, removes all existing content first.
fn ensure_output(output: &Path, clean: bool) -> Result<()> {
    if clean && output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("Failed to clear output directory: {}", output.display()))?;
    }
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))
}

/// Copy a source tree, logging and skipping it when absent.
fn copy_source_tree(name: &str, src: &Path, dst: &Path, config: &SiteConfig) -> Result<()> {
    if !src.is_dir() {
        log!("warn"; "{} directory {} not found, skipping", name, src.display());
        return Ok(());
    }
    let copied = copy_tree(src, dst, &config.build.exclude)
        .with_context(|| format!("Failed to copy {name} from {}", src.display()))?;
    log!(name; "{} files", copied);
    Ok(())
}

/// Publish the newest blog CSV and parse it. Any failure means no related
/// articles, never a failed build.
fn load_related(config: &SiteConfig) -> Vec<BlogPost> {
    if !config.build.related.enable {
        return Vec::new();
    }

    let published = match related::publish_latest(config) {
        Ok(Some(path)) => path,
        Ok(None) => {
            log!("related"; "no {}*.csv in data, skipping", config.build.related.prefix);
            return Vec::new();
        }
        Err(e) => {
            log!("warn"; "related articles unavailable: {:#}", e);
            return Vec::new();
        }
    };

    match related::load(&published) {
        Ok(posts) => {
            log!("related"; "{} articles", posts.len());
            posts
        }
        Err(e) => {
            log!("warn"; "related articles unavailable: {:#}", e);
            Vec::new()
        }
    }
}

fn report_index(messages: &MessageSet, index: &SlugIndex<'_>, report: &mut BuildReport) {
    report.messages = messages.len();
    report.eligible = index.len();
    report.untitled = index.untitled;
    report.collisions = index.collisions.len();

    if index.untitled > 0 {
        log!("warn"; "{} messages without a usable title skipped", index.untitled);
    }
    for collision in &index.collisions {
        log!(
            "warn";
            "slug '{}' of \"{}\" already taken by \"{}\", skipped",
            collision.slug,
            collision.dropped.title,
            collision.kept.title
        );
    }
}

fn log_summary(report: &BuildReport) {
    log!(
        "build";
        "done, {} messages ({} with URLs, {} untitled, {} slug collisions), {} pages ({} failed), {} sitemap + {} news urls, {}",
        report.messages,
        report.eligible,
        report.untitled,
        report.collisions,
        report.pages,
        report.failed_pages,
        report.sitemap_urls,
        report.news_urls,
        format_size(report.output_bytes)
    );
}

/// Log a warning when the output exceeds `[build] size_warning`.
fn check_size(bytes: u64, config: &SiteConfig) {
    let limit = config.size_warning_bytes();
    if limit > 0 && bytes > limit {
        log!(
            "warn";
            "output is {}, above the {} warning threshold",
            format_size(bytes),
            config.build.size_warning
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    const TEMPLATE: &str = "<!doctype html><html><head><title>App</title></head>\
        <body><div id=\"root\"></div><script type=\"module\" src=\"/assets/app.js\"></script></body></html>";

    const MESSAGES: &str = r#"[
        {"id": "MC1", "title": "Updated: Teams now supports X!", "lastModifiedDateTime": "2024-06-03T08:00:00Z"},
        {"id": "MC2", "title": "", "body": "<p>No title</p>"},
        {"id": "MC3", "Title": "Exchange Online retires basic auth"},
        {"id": "MC4", "title": "Teams: now supports x"}
    ]"#;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 2, 12, 0, 0).unwrap()
    }

    struct Site {
        dir: TempDir,
        config: SiteConfig,
    }

    fn site(messages: Option<&str>) -> Site {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        fs::create_dir_all(root.join("public/assets")).unwrap();
        fs::create_dir_all(root.join("public/backup")).unwrap();
        fs::write(root.join("public/index.html"), TEMPLATE).unwrap();
        fs::write(root.join("public/assets/app.js"), "console.log(1)").unwrap();
        fs::write(root.join("public/backup/old.html"), "old").unwrap();

        fs::create_dir_all(root.join("data")).unwrap();
        if let Some(messages) = messages {
            fs::write(root.join("data/messages.json"), messages).unwrap();
        }
        fs::write(
            root.join("data/BlogPost_2024-05-01.csv"),
            "\"Title\",\"URL\",\"Date\"\n\"A post\",\"https://blog.example.net/a\",\"2024-05-01\"\n",
        )
        .unwrap();

        let mut config = SiteConfig::default();
        config.base.url = Some("https://example.com".into());
        config.build.assets = root.join("public");
        config.build.data = root.join("data");
        config.build.output = root.join("dist");

        Site { dir, config }
    }

    fn read(site: &Site, rel: &str) -> String {
        fs::read_to_string(site.dir.path().join("dist").join(rel)).unwrap()
    }

    #[test]
    fn test_full_build() {
        let site = site(Some(MESSAGES));
        let report = build_site(&site.config, &Release::default(), now()).unwrap();

        assert_eq!(report.messages, 4);
        assert_eq!(report.eligible, 2);
        assert_eq!(report.untitled, 1);
        assert_eq!(report.collisions, 1);
        assert_eq!(report.pages, 2);
        assert_eq!(report.failed_pages, 0);
        assert_eq!(report.sitemap_urls, 7);
        assert_eq!(report.news_urls, 2);

        let dist = site.dir.path().join("dist");
        assert!(dist.join("assets/app.js").exists());
        assert!(!dist.join("backup").exists());
        assert!(dist.join("data/messages.json").exists());
        assert!(dist.join("data/BlogPost_latest.csv").exists());
        assert!(dist.join("message/teams-now-supports-x/index.html").exists());
        assert!(dist.join("message/teams-now-supports-x.html").exists());
        assert!(dist.join("message/exchange-online-retires-basic-auth.html").exists());
        assert!(dist.join("sitemap.xsl").exists());
        assert!(dist.join("news-sitemap.xml").exists());
        assert!(dist.join("sw.js").exists());
        assert_eq!(fs::metadata(dist.join(".nojekyll")).unwrap().len(), 0);

        let sitemap = read(&site, "sitemap.xml");
        assert!(sitemap.contains("<loc>https://example.com/message/teams-now-supports-x</loc>"));
        assert!(sitemap.contains("<lastmod>2024-06-03</lastmod>"));

        let page = read(&site, "message/teams-now-supports-x.html");
        assert!(page.contains("https://blog.example.net/a"));
        assert!(page.contains(r#"<script type="module" src="/assets/app.js"></script>"#));

        let info: serde_json::Value = serde_json::from_str(&read(&site, "build-info.json")).unwrap();
        assert_eq!(info["messages"], 4);
        assert_eq!(info["pages"], 2);
        assert_eq!(info["sitemapUrls"], 7);
    }

    #[test]
    fn test_missing_feed_builds_static_routes_only() {
        let site = site(None);
        let report = build_site(&site.config, &Release::default(), now()).unwrap();

        assert_eq!(report.messages, 0);
        assert_eq!(report.pages, 0);
        assert_eq!(report.sitemap_urls, 5);
        assert!(!read(&site, "sitemap.xml").contains("/message/"));
        assert!(!site.dir.path().join("dist/message").exists());
    }

    #[test]
    fn test_invalid_feed_degrades() {
        let site = site(Some("{not json"));
        let report = build_site(&site.config, &Release::default(), now()).unwrap();
        assert_eq!(report.sitemap_urls, 5);
    }

    #[test]
    fn test_missing_template_is_fatal() {
        let site = site(Some(MESSAGES));
        fs::remove_file(site.dir.path().join("public/index.html")).unwrap();

        let err = build_site(&site.config, &Release::default(), now()).unwrap_err();
        assert!(format!("{err:#}").contains("index.html"));
    }

    #[test]
    fn test_pages_disabled_needs_no_template() {
        let mut site = site(Some(MESSAGES));
        fs::remove_file(site.dir.path().join("public/index.html")).unwrap();
        site.config.build.pages.enable = false;

        let report = build_site(&site.config, &Release::default(), now()).unwrap();
        assert_eq!(report.pages, 0);
        assert_eq!(report.sitemap_urls, 7);
    }

    #[test]
    fn test_build_is_deterministic() {
        let site = site(Some(MESSAGES));
        let release = Release::default();

        build_site(&site.config, &release, now()).unwrap();
        let first = (
            read(&site, "sitemap.xml"),
            read(&site, "news-sitemap.xml"),
            read(&site, "message/teams-now-supports-x.html"),
            read(&site, "build-info.json"),
        );

        build_site(&site.config, &release, now()).unwrap();
        let second = (
            read(&site, "sitemap.xml"),
            read(&site, "news-sitemap.xml"),
            read(&site, "message/teams-now-supports-x.html"),
            read(&site, "build-info.json"),
        );

        assert_eq!(first, second);
    }

    #[test]
    fn test_data_tree_replaces_asset_copy() {
        let site = site(Some(MESSAGES));
        let stale = site.dir.path().join("public/data/messages.json");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, r#"[{"title": "Stale message"}]"#).unwrap();

        for _ in 0..5 {
            let report = build_site(&site.config, &Release::default(), now()).unwrap();
            assert_eq!(report.messages, 4);
            assert_eq!(read(&site, "data/messages.json"), MESSAGES);
        }
    }

    #[test]
    fn test_clean_removes_stale_output() {
        let mut site = site(Some(MESSAGES));
        let stale = site.dir.path().join("dist/stale.txt");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "x").unwrap();

        site.config.build.clean = true;
        build_site(&site.config, &Release::default(), now()).unwrap();
        assert!(!stale.exists());
    }

    #[test]
    fn test_missing_asset_dir_is_skipped() {
        let mut site = site(Some(MESSAGES));
        site.config.build.assets = site.dir.path().join("nope");
        site.config.build.pages.enable = false;

        assert!(build_site(&site.config, &Release::default(), now()).is_ok());
    }
}
