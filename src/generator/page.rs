//! Prerendered message pages.
//!
//! Each eligible message gets a copy of the client template with
//! page-specific head metadata and a crawlable rendition of the message
//! injected. The client bundle `<script>` tags are left untouched so the
//! dashboard hydrates over it.
//!
//! # Output
//!
//! ```text
//! dist/message/
//! ├── teams-update/index.html   ← served for /message/teams-update/
//! └── teams-update.html         ← served for /message/teams-update
//! ```

use super::seo::{self, PageMeta};
use crate::{
    config::SiteConfig,
    log,
    logger::Progress,
    message::{Message, SlugIndex},
    related::{self, BlogPost},
    utils::{
        date,
        fs::write_file,
        minify::{MinifyType, minify},
        xml::{escape, json_for_script},
    },
};
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use regex::Regex;
use std::{
    fmt::Write as _,
    fs,
    path::Path,
    sync::{
        LazyLock,
        atomic::{AtomicUsize, Ordering},
    },
};

const ROBOTS: &str = "index, follow, max-image-preview:large";

// ============================================================================
// Template
// ============================================================================

/// The client's `index.html`, split where page content is injected.
#[derive(Debug, Clone)]
pub struct Template {
    /// Everything before `</head>`, with template-level SEO tags removed
    head: String,
    /// `</head>` up to (excluding) `</body>`
    middle: String,
    /// `</body>` to the end
    tail: String,
}

impl Template {
    /// Split a template. Fails unless it has `</head>` followed by `</body>`.
    pub fn new(html: &str) -> Result<Self> {
        // ASCII lowering keeps byte offsets valid for `html`.
        let lower = html.to_ascii_lowercase();
        let Some(head_close) = lower.find("</head>") else {
            bail!("template has no </head>");
        };
        let Some(body_close) = lower.rfind("</body>") else {
            bail!("template has no </body>");
        };
        if body_close < head_close {
            bail!("template has </body> before </head>");
        }

        Ok(Self {
            head: strip_template_meta(&html[..head_close]),
            middle: html[head_close..body_close].to_owned(),
            tail: html[body_close..].to_owned(),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let html = fs::read_to_string(path)
            .with_context(|| format!("Failed to read template {}", path.display()))?;
        Self::new(&html).with_context(|| format!("Unusable template {}", path.display()))
    }
}

/// Remove the title and every tag the page emitter writes itself.
fn strip_template_meta(head: &str) -> String {
    static RE_TEMPLATE_META: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(concat!(
            r#"(?is)\s*(?:"#,
            r#"<title\b[^>]*>.*?</title\s*>"#,
            r#"|<meta\b[^>]*\b(?:name|property)\s*=\s*["']?(?:description|keywords|robots|og:[^"'\s>]*|twitter:[^"'\s>]*|article:[^"'\s>]*)["']?[^>]*>"#,
            r#"|<link\b[^>]*\brel\s*=\s*["']?canonical["']?[^>]*>"#,
            r#"|<script\b[^>]*application/ld\+json[^>]*>.*?</script\s*>"#,
            r#")"#
        ))
        .unwrap()
    });
    RE_TEMPLATE_META.replace_all(head, "").into_owned()
}

// ============================================================================
// Rendering
// ============================================================================

/// Shared inputs for rendering every page of one build.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub config: &'a SiteConfig,
    /// Related-article pool, empty when no CSV was found
    pub posts: &'a [BlogPost],
    pub now: DateTime<Utc>,
}

/// Render one message page.
pub fn emit_page(template: &Template, msg: &Message, slug: &str, ctx: &PageContext<'_>) -> String {
    let meta = PageMeta::new(msg, slug, ctx.config, ctx.now);

    let mut html = String::with_capacity(
        template.head.len() + template.middle.len() + template.tail.len() + 8192,
    );
    html.push_str(&template.head);
    write_head(&mut html, msg, &meta, ctx.config);
    html.push_str(&template.middle);
    write_body(&mut html, msg, &meta, ctx);
    html.push_str(&template.tail);
    html
}

fn write_head(html: &mut String, msg: &Message, meta: &PageMeta, config: &SiteConfig) {
    let base = &config.base;
    let title = escape(&meta.title);
    let description = escape(&meta.description);
    let canonical = escape(&meta.canonical);

    let _ = writeln!(html, "<title>{title}</title>");
    let _ = writeln!(html, r#"<meta name="description" content="{description}">"#);
    let _ = writeln!(html, r#"<meta name="keywords" content="{}">"#, escape(&meta.keywords.join(", ")));
    let _ = writeln!(html, r#"<meta name="robots" content="{ROBOTS}">"#);
    let _ = writeln!(html, r#"<link rel="canonical" href="{canonical}">"#);

    // Open Graph
    let _ = writeln!(html, r#"<meta property="og:type" content="article">"#);
    let _ = writeln!(html, r#"<meta property="og:title" content="{}">"#, escape(&msg.title));
    let _ = writeln!(html, r#"<meta property="og:description" content="{description}">"#);
    let _ = writeln!(html, r#"<meta property="og:url" content="{canonical}">"#);
    let _ = writeln!(html, r#"<meta property="og:site_name" content="{}">"#, escape(&base.title));
    let _ = writeln!(html, r#"<meta property="og:locale" content="{}">"#, escape(&og_locale(&base.language)));
    let _ = writeln!(html, r#"<meta property="article:published_time" content="{}">"#, date::to_w3c(meta.published));
    let _ = writeln!(html, r#"<meta property="article:modified_time" content="{}">"#, date::to_w3c(meta.modified));
    if let Some(category) = &msg.category {
        let _ = writeln!(html, r#"<meta property="article:section" content="{}">"#, escape(category));
    }
    for tag in &msg.tags {
        let _ = writeln!(html, r#"<meta property="article:tag" content="{}">"#, escape(tag));
    }

    // Twitter Card
    let _ = writeln!(html, r#"<meta name="twitter:card" content="summary">"#);
    let _ = writeln!(html, r#"<meta name="twitter:title" content="{}">"#, escape(&msg.title));
    let _ = writeln!(html, r#"<meta name="twitter:description" content="{description}">"#);
    if let Some(handle) = &base.twitter {
        let _ = writeln!(html, r#"<meta name="twitter:site" content="{}">"#, escape(handle));
    }

    let data = seo::structured_data(msg, meta, config);
    let _ = writeln!(
        html,
        r#"<script type="application/ld+json">{}</script>"#,
        json_for_script(&data)
    );
}

/// `en-US` → `en_US`
fn og_locale(language: &str) -> String {
    language.replace('-', "_")
}

fn write_body(html: &mut String, msg: &Message, meta: &PageMeta, ctx: &PageContext<'_>) {
    html.push_str("<div id=\"mc-static-message\" class=\"mc-static-message\">\n<article>\n");
    let _ = writeln!(html, "<h1>{}</h1>", escape(&msg.title));

    html.push_str("<dl class=\"mc-message-meta\">\n");
    let mut field = |label: &str, value: &str| {
        let _ = writeln!(html, "<dt>{label}</dt><dd>{}</dd>", escape(value));
    };
    if let Some(id) = &msg.id {
        field("Message ID", id);
    }
    if let Some(category) = &msg.category {
        field("Category", category);
    }
    if let Some(severity) = &msg.severity {
        field("Severity", severity);
    }
    if !msg.services.is_empty() {
        field("Services", &msg.services.join(", "));
    }
    if msg.is_major_change {
        field("Major change", "Yes");
    }
    if msg.has_attachments {
        field("Attachments", "Yes");
    }
    for (label, value) in [
        ("Published", msg.published),
        ("Last modified", msg.last_modified),
        ("Action required by", msg.action_required_by),
        ("Ends", msg.end),
    ] {
        if let Some(dt) = value {
            let _ = writeln!(
                html,
                r#"<dt>{label}</dt><dd><time datetime="{}">{}</time></dd>"#,
                date::to_w3c(dt),
                date::to_display(dt)
            );
        }
    }
    html.push_str("</dl>\n");

    if let Some(body) = &msg.body {
        // Message bodies are HTML by contract.
        let _ = writeln!(html, "<div class=\"mc-message-body\">{body}</div>");
    }

    let picks = related::select(ctx.posts, msg.seed(), ctx.config.build.related.count);
    if !picks.is_empty() {
        html.push_str("<section class=\"mc-related-articles\">\n<h2>Related articles</h2>\n<ul>\n");
        for post in picks {
            let _ = writeln!(
                html,
                r#"<li><a href="{}" rel="noopener">{}</a> <time>{}</time></li>"#,
                escape(&post.url),
                escape(&post.title),
                escape(&post.date)
            );
        }
        html.push_str("</ul>\n</section>\n");
    }

    let canonical = escape(&meta.canonical);
    let _ = writeln!(
        html,
        r#"<p class="mc-message-source">Source: {}, <a href="{canonical}">{canonical}</a></p>"#,
        escape(&ctx.config.base.title)
    );
    html.push_str("</article>\n</div>\n");
}

// ============================================================================
// Batch emission
// ============================================================================

/// Outcome of [`emit_all`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EmitReport {
    /// Messages whose pages were written
    pub written: usize,
    /// Messages whose pages failed to write
    pub failed: usize,
}

/// Write both page files for every entry in parallel.
///
/// A failing message is logged and counted; the rest continue.
pub fn emit_all(template: &Template, index: &SlugIndex<'_>, ctx: &PageContext<'_>) -> EmitReport {
    if index.is_empty() {
        return EmitReport::default();
    }

    let paths = ctx.config.paths();
    let failed = AtomicUsize::new(0);
    let progress = Progress::start("pages", index.len());

    index.entries.par_iter().for_each(|entry| {
        let html = emit_page(template, entry.message, &entry.slug, ctx);
        let html = minify(MinifyType::Html(html.as_bytes()), ctx.config);
        let (index_path, flat_path) = paths.message_pages(&entry.slug);

        let result = write_file(&index_path, &html).and_then(|()| write_file(&flat_path, &html));
        if let Err(e) = result {
            failed.fetch_add(1, Ordering::Relaxed);
            log!("error"; "{}: {:#}", entry.slug, e);
        }
        if let Some(progress) = &progress {
            progress.tick();
        }
    });
    drop(progress);

    let failed = failed.into_inner();
    EmitReport {
        written: index.len() - failed,
        failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageSet;
    use chrono::TimeZone;
    use tempfile::TempDir;

    const TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <title>Microsoft 365 Message Center</title>
    <meta name="description" content="Generic site description" />
    <meta property="og:title" content="Generic" />
    <meta name="twitter:card" content="summary_large_image" />
    <link rel="canonical" href="https://example.com/" />
    <script type="module" crossorigin src="/assets/index-abc123.js"></script>
    <link rel="stylesheet" href="/assets/index-abc123.css">
  </head>
  <body>
    <div id="root"></div>
  </body>
</html>
"#;

    fn config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.base.url = Some("https://example.com".into());
        config.base.twitter = Some("@example".into());
        config
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 2, 12, 0, 0).unwrap()
    }

    fn message() -> Message {
        Message {
            id: Some("MC123456".into()),
            title: "Updated: Teams <now> supports X!".into(),
            body: Some("<p>We are rolling out <b>X</b> to all tenants in the coming weeks.</p>".into()),
            category: Some("planForChange".into()),
            severity: Some("normal".into()),
            published: Some(Utc.with_ymd_and_hms(2024, 5, 1, 17, 0, 0).unwrap()),
            services: vec!["Microsoft Teams".into()],
            tags: vec!["New feature".into()],
            is_major_change: true,
            ..Message::default()
        }
    }

    fn posts() -> Vec<BlogPost> {
        (0..5)
            .map(|i| BlogPost {
                title: format!("Post {i}"),
                url: format!("https://blog.example.net/{i}"),
                date: "2024-01-01".into(),
            })
            .collect()
    }

    fn render(msg: &Message, posts: &[BlogPost]) -> String {
        let config = config();
        let template = Template::new(TEMPLATE).unwrap();
        let ctx = PageContext {
            config: &config,
            posts,
            now: now(),
        };
        emit_page(&template, msg, "teams-now-supports-x", &ctx)
    }

    #[test]
    fn test_template_requires_head_and_body() {
        assert!(Template::new("<html><body></body></html>").is_err());
        assert!(Template::new("<html><head></head></html>").is_err());
        assert!(Template::new("<body></body><head></head>").is_err());
        assert!(Template::new("<HTML><HEAD></HEAD><BODY></BODY></HTML>").is_ok());
    }

    #[test]
    fn test_template_meta_is_replaced_not_duplicated() {
        let html = render(&message(), &[]);

        assert_eq!(html.matches("<title>").count(), 1);
        assert_eq!(html.matches(r#"name="description""#).count(), 1);
        assert_eq!(html.matches(r#"rel="canonical""#).count(), 1);
        assert_eq!(html.matches(r#"property="og:title""#).count(), 1);
        assert_eq!(html.matches(r#"name="twitter:card""#).count(), 1);
        assert!(!html.contains("Generic site description"));
        assert!(html.contains(r#"<meta charset="UTF-8" />"#));
    }

    #[test]
    fn test_page_head_metadata() {
        let html = render(&message(), &[]);

        assert!(html.contains(
            "<title>Updated: Teams &lt;now&gt; supports X! | Microsoft 365 Message Center</title>"
        ));
        assert!(html.contains(
            r#"<link rel="canonical" href="https://example.com/message/teams-now-supports-x">"#
        ));
        assert!(html.contains(r#"<meta name="robots" content="index, follow, max-image-preview:large">"#));
        assert!(html.contains(r#"<meta property="og:type" content="article">"#));
        assert!(html.contains(r#"<meta property="article:published_time" content="2024-05-01T17:00:00Z">"#));
        assert!(html.contains(r#"<meta property="article:section" content="planForChange">"#));
        assert!(html.contains(r#"<meta property="article:tag" content="New feature">"#));
        assert!(html.contains(r#"<meta name="twitter:site" content="@example">"#));
        assert!(html.contains(r#"<script type="application/ld+json">{"#));

        let head_end = html.find("</head>").unwrap();
        assert!(html.find("application/ld+json").unwrap() < head_end);
    }

    #[test]
    fn test_page_body_block() {
        let html = render(&message(), &[]);
        let body_start = html.find("<body>").unwrap();
        let block = &html[body_start..];

        assert!(block.contains(r#"<div id="root"></div>"#));
        assert!(block.contains("<h1>Updated: Teams &lt;now&gt; supports X!</h1>"));
        assert!(block.contains("<dt>Message ID</dt><dd>MC123456</dd>"));
        assert!(block.contains("<dt>Major change</dt><dd>Yes</dd>"));
        assert!(block.contains(r#"<time datetime="2024-05-01T17:00:00Z">May 1, 2024</time>"#));
        assert!(block.contains("<p>We are rolling out <b>X</b> to all tenants"));
        assert!(block.contains(r#"<a href="https://example.com/message/teams-now-supports-x">"#));
        assert!(!block.contains("Related articles"));
        assert!(html.ends_with("</body>\n</html>\n"));
    }

    #[test]
    fn test_page_body_end_and_attachments() {
        let msg = Message {
            end: Some(Utc.with_ymd_and_hms(2024, 9, 30, 7, 0, 0).unwrap()),
            has_attachments: true,
            ..message()
        };
        let html = render(&msg, &[]);

        assert!(html.contains("<dt>Attachments</dt><dd>Yes</dd>"));
        assert!(html.contains(
            r#"<dt>Ends</dt><dd><time datetime="2024-09-30T07:00:00Z">September 30, 2024</time></dd>"#
        ));

        let plain = render(&message(), &[]);
        assert!(!plain.contains("<dt>Attachments</dt>"));
        assert!(!plain.contains("<dt>Ends</dt>"));
    }

    #[test]
    fn test_emit_all_empty_index_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut config = config();
        config.build.output = dir.path().to_path_buf();
        let set = MessageSet::default();
        let template = Template::new(TEMPLATE).unwrap();
        let ctx = PageContext {
            config: &config,
            posts: &[],
            now: now(),
        };

        assert_eq!(emit_all(&template, &set.slug_index(), &ctx), EmitReport::default());
        assert!(!dir.path().join("message").exists());
    }

    #[test]
    fn test_client_bundle_untouched() {
        let html = render(&message(), &[]);
        assert!(html.contains(r#"<script type="module" crossorigin src="/assets/index-abc123.js"></script>"#));
        assert!(html.contains(r#"<link rel="stylesheet" href="/assets/index-abc123.css">"#));
    }

    #[test]
    fn test_related_articles_deterministic() {
        let posts = posts();
        let a = render(&message(), &posts);
        let b = render(&message(), &posts);

        assert_eq!(a, b);
        assert!(a.contains("Related articles"));
        assert_eq!(a.matches(r#"rel="noopener""#).count(), 3);
    }

    #[test]
    fn test_structured_data_cannot_close_script() {
        let mut msg = message();
        msg.title = "</script><script>alert(1)</script>".into();
        let html = render(&msg, &[]);

        let start = html.find(r#"<script type="application/ld+json">"#).unwrap();
        let json_end = html[start..].find("</script>").unwrap() + start;
        let json = &html[start..json_end];
        assert!(!json.contains("</script"));
    }

    #[test]
    fn test_emit_all_writes_both_files() {
        let dir = TempDir::new().unwrap();
        let mut config = config();
        config.build.output = dir.path().to_path_buf();

        let set = MessageSet::from_messages(vec![
            message(),
            Message {
                title: String::new(),
                ..message()
            },
            Message {
                title: "Exchange Online change".into(),
                ..Message::default()
            },
        ]);
        let index = set.slug_index();
        let template = Template::new(TEMPLATE).unwrap();
        let ctx = PageContext {
            config: &config,
            posts: &[],
            now: now(),
        };

        let report = emit_all(&template, &index, &ctx);

        assert_eq!(report, EmitReport { written: 2, failed: 0 });
        let message_dir = dir.path().join("message");
        assert!(message_dir.join("teams-now-supports-x/index.html").exists());
        assert!(message_dir.join("teams-now-supports-x.html").exists());
        assert!(message_dir.join("exchange-online-change.html").exists());
        assert_eq!(
            fs::read_to_string(message_dir.join("exchange-online-change.html")).unwrap(),
            fs::read_to_string(message_dir.join("exchange-online-change/index.html")).unwrap()
        );
    }

    #[test]
    fn test_template_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Template::load(&dir.path().join("index.html")).unwrap_err();
        assert!(format!("{err:#}").contains("index.html"));
    }
}
