//! Site configuration management for `mcsite.toml`.
//!
//! # Sections
//!
//! | Section           | Purpose                                        |
//! |-------------------|------------------------------------------------|
//! | `[base]`          | Site identity (name, url, language, logo)      |
//! | `[build]`         | Input trees, output layout, size warning       |
//! | `[build.sitemap]` | Static routes, XSL stylesheet, news sitemap    |
//! | `[build.pages]`   | Prerendered message pages                      |
//! | `[build.related]` | Blog-post CSV shown as related articles        |
//! | `[build.sw]`      | Service worker precache list                   |
//! | `[serve]`         | Preview server (interface, port)               |
//!
//! # Example
//!
//! ```toml
//! [base]
//! title = "Microsoft 365 Message Center"
//! url = "https://message.example.net"
//!
//! [build]
//! assets = "public"
//! data = "data"
//! output = "dist"
//!
//! [build.sitemap]
//! news_limit = 500
//! ```

mod base;
mod build;
pub mod defaults;
mod error;
mod paths;
mod serve;

pub use build::{ChangeFreq, RouteConfig};
pub use error::ConfigError;
pub use paths::{BUILD_INFO_FILE, MESSAGE_ROUTE, NOJEKYLL_FILE, PathResolver};

use base::BaseConfig;
use build::BuildConfig;
use serve::ServeConfig;

use crate::{
    cli::{Cli, Commands},
    log,
};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, MB, GB. Case-insensitive for the suffix.
///
/// # Examples
/// ```ignore
/// parse_size_string("20KB")  // → 20480
/// parse_size_string("100MB") // → 104857600
/// parse_size_string("100")   // → 100 (defaults to bytes)
/// ```
fn parse_size_string(s: &str) -> u64 {
    let s = s.trim().to_uppercase();
    let (multiplier, suffix_len) = if s.ends_with("GB") {
        (1024 * 1024 * 1024, 2)
    } else if s.ends_with("MB") {
        (1024 * 1024, 2)
    } else if s.ends_with("KB") {
        (1024, 2)
    } else if s.ends_with('B') {
        (1, 1)
    } else {
        (1, 0)
    };
    let value: u64 = s[..s.len() - suffix_len].trim().parse().unwrap_or(0);
    multiplier * value
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing mcsite.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Basic site information
    #[serde(default)]
    pub base: BaseConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Preview server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Load the config named on the command line, apply CLI overrides and validate.
    ///
    /// A missing config file is not an error: every field has a default and
    /// `--base-url` can supply the only required value.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let config_path = root.join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            log!("config"; "{} not found, using defaults", cli.config.display());
            Self::default()
        };
        config.update_with_cli(cli);

        if cli.build_args().is_some() {
            config.validate()?;
        }
        Ok(config)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Output path resolver.
    pub fn paths(&self) -> PathResolver<'_> {
        PathResolver::new(&self.build.output, &self.build.data_url, &self.build.messages)
    }

    /// Base URL without a trailing slash, empty when unset.
    pub fn base_url(&self) -> &str {
        self.base.url.as_deref().unwrap_or_default().trim_end_matches('/')
    }

    /// Absolute URL for a site-relative path.
    pub fn absolute_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Output size above which the build logs a warning.
    pub fn size_warning_bytes(&self) -> u64 {
        parse_size_string(&self.build.size_warning)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli
            .root
            .clone()
            .unwrap_or_else(|| self.get_root().to_owned());
        self.update_path_with_root(&root, cli);

        if let Some(args) = cli.build_args() {
            self.build.clean |= args.clean;
            Self::update_option(&mut self.build.minify, args.minify.as_ref());
            Self::update_option(&mut self.build.sitemap.enable, args.sitemap.as_ref());
            Self::update_option(&mut self.build.pages.enable, args.pages.as_ref());
            if let Some(url) = &args.base_url {
                self.base.url = Some(url.clone());
            }
        }

        if let Commands::Serve {
            interface,
            port,
            build_args,
        } = &cli.command
        {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
            if build_args.base_url.is_none() {
                self.base.url = Some(format!(
                    "http://{}:{}",
                    self.serve.interface, self.serve.port
                ));
            }
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Update all paths relative to root directory and normalize to absolute paths
    fn update_path_with_root(&mut self, root: &Path, cli: &Cli) {
        Self::update_option(&mut self.build.output, cli.output.as_ref());

        let root = Self::normalize_path(root);
        self.set_root(&root);

        self.build.assets = Self::normalize_path(&root.join(&self.build.assets));
        self.build.data = Self::normalize_path(&root.join(&self.build.data));
        self.build.output = Self::normalize_path(&root.join(&self.build.output));
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration before building
    pub fn validate(&self) -> Result<()> {
        let Some(base_url) = &self.base.url else {
            bail!(ConfigError::Validation(
                "[base.url] is required (or pass --base-url)".into()
            ));
        };

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            bail!(ConfigError::Validation(
                "[base.url] must start with http:// or https://".into()
            ));
        }

        if self.build.data_url.contains(['/', '\\']) {
            bail!(ConfigError::Validation(
                "[build.data_url] must be a single directory name".into()
            ));
        }

        if let Some(route) = self
            .build
            .sitemap
            .routes
            .iter()
            .find(|route| !route.path.starts_with('/'))
        {
            bail!(ConfigError::Validation(format!(
                "[build.sitemap.routes] path `{}` must start with /",
                route.path
            )));
        }

        let valid_size_suffixes = ["B", "KB", "MB", "GB"];
        let size = self.build.size_warning.trim().to_uppercase();
        if !valid_size_suffixes.iter().any(|s| size.ends_with(s)) {
            bail!(ConfigError::Validation(
                "[build.size_warning] must end with B, KB, MB, or GB".into()
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
