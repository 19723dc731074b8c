//! Centralized path resolution for build artifacts.
//!
//! Every file the build writes, and every site-relative URL it links to,
//! is resolved here so producers and consumers agree on one layout.
//!
//! # Layout
//!
//! ```text
//! SiteConfig
//!     │
//!     └── paths() → PathResolver
//!                       │
//!                       ├── output_dir()          → /abs/dist
//!                       ├── data_dir()            → /abs/dist/data
//!                       ├── feed()                → /abs/dist/data/messages.json
//!                       ├── message_pages(slug)   → (…/message/slug/index.html, …/message/slug.html)
//!                       ├── feed_url()            → /data/messages.json
//!                       └── message_url(slug)     → /message/slug
//! ```

use std::path::{Path, PathBuf};

/// URL segment under which every message page lives.
pub const MESSAGE_ROUTE: &str = "message";

/// Output file names written by the orchestrator itself.
pub const NOJEKYLL_FILE: &str = ".nojekyll";
pub const BUILD_INFO_FILE: &str = "build-info.json";

/// Resolver over the configured output directory.
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    /// Absolute output directory
    output: &'a Path,
    /// Data tree name inside the output (also its URL segment)
    data_url: &'a str,
    /// Feed file relative to the data tree
    messages: &'a Path,
}

impl<'a> PathResolver<'a> {
    #[inline]
    pub const fn new(output: &'a Path, data_url: &'a str, messages: &'a Path) -> Self {
        Self {
            output,
            data_url,
            messages,
        }
    }

    #[inline]
    pub const fn output_dir(&self) -> &Path {
        self.output
    }

    /// Where the data tree is copied to.
    #[inline]
    pub fn data_dir(&self) -> PathBuf {
        self.output.join(self.data_url)
    }

    /// The deployed message feed.
    #[inline]
    pub fn feed(&self) -> PathBuf {
        self.data_dir().join(self.messages)
    }

    /// Resolve a path relative to the output directory.
    #[inline]
    pub fn output_file<P: AsRef<Path>>(&self, rel: P) -> PathBuf {
        self.output.join(rel)
    }

    /// Directory-style and flat file locations for a message page.
    pub fn message_pages(&self, slug: &str) -> (PathBuf, PathBuf) {
        let dir = self.output.join(MESSAGE_ROUTE);
        (
            dir.join(slug).join("index.html"),
            dir.join(format!("{slug}.html")),
        )
    }

    /// Site-relative URL of the message feed.
    pub fn feed_url(&self) -> String {
        url_for_rel_path(Path::new(self.data_url).join(self.messages))
    }

    /// Site-relative URL of a message page.
    pub fn message_url(slug: &str) -> String {
        format!("/{MESSAGE_ROUTE}/{slug}")
    }

    /// Site-relative URL of a file given relative to the output directory.
    pub fn url_for(&self, rel: &Path) -> String {
        url_for_rel_path(rel)
    }
}

fn url_for_rel_path<P: AsRef<Path>>(rel_path: P) -> String {
    let path_str = rel_path.as_ref().to_string_lossy().replace('\\', "/");
    format!("/{}", path_str.trim_start_matches('/'))
}
