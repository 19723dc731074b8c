//! `[build]` section configuration.
//!
//! Contains build settings: input trees, output layout, sitemap, static pages,
//! related articles and the service worker.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Enums
// ============================================================================

/// Sitemap `<changefreq>` hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFreq {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFreq {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Never => "never",
        }
    }
}

// ============================================================================
// Main BuildConfig
// ============================================================================

/// `[build]` section in mcsite.toml - build pipeline configuration.
///
/// # Example
/// ```toml
/// [build]
/// assets = "public"        # Static asset tree (client bundle + template)
/// data = "data"            # Message store tree
/// output = "dist"
///
/// [build.sitemap]
/// news = false
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Static asset tree copied verbatim into the output.
    #[serde(default = "defaults::build::assets")]
    #[educe(Default = defaults::build::assets())]
    pub assets: PathBuf,

    /// Message store tree (feed JSON, related-articles CSV).
    #[serde(default = "defaults::build::data")]
    #[educe(Default = defaults::build::data())]
    pub data: PathBuf,

    /// Directory name of the data tree inside the output, also its URL segment.
    #[serde(default = "defaults::build::data_url")]
    #[educe(Default = defaults::build::data_url())]
    pub data_url: String,

    /// Message feed file, relative to the data tree.
    #[serde(default = "defaults::build::messages")]
    #[educe(Default = defaults::build::messages())]
    pub messages: PathBuf,

    /// HTML template for static pages, relative to the output directory.
    #[serde(default = "defaults::build::template")]
    #[educe(Default = defaults::build::template())]
    pub template: PathBuf,

    /// Build output directory.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Directory names skipped while copying the asset and data trees.
    #[serde(default = "defaults::build::exclude")]
    #[educe(Default = defaults::build::exclude())]
    pub exclude: Vec<String>,

    /// Minify generated HTML and XML.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub minify: bool,

    /// Remove the output directory before building.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub clean: bool,

    /// Output size above which a warning is logged (e.g. "100MB").
    #[serde(default = "defaults::build::size_warning")]
    #[educe(Default = defaults::build::size_warning())]
    pub size_warning: String,

    /// Sitemap generation settings.
    #[serde(default)]
    pub sitemap: SitemapConfig,

    /// Static page generation settings.
    #[serde(default)]
    pub pages: PagesConfig,

    /// Related articles settings.
    #[serde(default)]
    pub related: RelatedConfig,

    /// Service worker settings.
    #[serde(default)]
    pub sw: ServiceWorkerConfig,
}

// ============================================================================
// Sub-configurations
// ============================================================================

/// `[build.sitemap]` section.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SitemapConfig {
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Output path, relative to the output directory.
    #[serde(default = "defaults::build::sitemap::path")]
    #[educe(Default = defaults::build::sitemap::path())]
    pub path: PathBuf,

    /// Write `sitemap.xsl` and reference it from the sitemap.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub xsl: bool,

    #[serde(default = "defaults::build::sitemap::xsl_path")]
    #[educe(Default = defaults::build::sitemap::xsl_path())]
    pub xsl_path: PathBuf,

    /// Write a Google News sitemap next to the regular one.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub news: bool,

    #[serde(default = "defaults::build::sitemap::news_path")]
    #[educe(Default = defaults::build::sitemap::news_path())]
    pub news_path: PathBuf,

    /// Maximum entries in the news sitemap.
    #[serde(default = "defaults::build::sitemap::news_limit")]
    #[educe(Default = defaults::build::sitemap::news_limit())]
    pub news_limit: usize,

    /// Fixed, hand-maintained routes listed before the messages.
    #[serde(default = "defaults::build::sitemap::routes")]
    #[educe(Default = defaults::build::sitemap::routes())]
    pub routes: Vec<RouteConfig>,
}

/// One `[[build.sitemap.routes]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    pub path: String,
    pub changefreq: ChangeFreq,
    pub priority: f32,
}

impl RouteConfig {
    pub fn new(path: &str, changefreq: ChangeFreq, priority: f32) -> Self {
        Self {
            path: path.to_owned(),
            changefreq,
            priority,
        }
    }
}

/// `[build.pages]` section.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct PagesConfig {
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,
}

/// `[build.related]` section - blog posts suggested on message pages.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct RelatedConfig {
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// File name prefix of dated CSV exports in the data tree.
    #[serde(default = "defaults::build::related::prefix")]
    #[educe(Default = defaults::build::related::prefix())]
    pub prefix: String,

    /// Name the newest export is published under.
    #[serde(default = "defaults::build::related::latest")]
    #[educe(Default = defaults::build::related::latest())]
    pub latest: String,

    /// Articles shown per message.
    #[serde(default = "defaults::build::related::count")]
    #[educe(Default = defaults::build::related::count())]
    pub count: usize,
}

/// `[build.sw]` section.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ServiceWorkerConfig {
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    #[serde(default = "defaults::build::sw::path")]
    #[educe(Default = defaults::build::sw::path())]
    pub path: PathBuf,

    /// Cache name prefix; the build date is appended.
    #[serde(default = "defaults::build::sw::cache_prefix")]
    #[educe(Default = defaults::build::sw::cache_prefix())]
    pub cache_prefix: String,

    /// Extra URLs to precache besides the shell and the feed.
    #[serde(default)]
    pub precache: Vec<String>,
}

// ============================================================================
// Tests
// ============================================================================
