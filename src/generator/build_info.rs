//! `build-info.json`: what was deployed, from which commit, and how much.

use crate::{
    cli::BuildArgs,
    config::{BUILD_INFO_FILE, SiteConfig},
    utils::fs::write_file,
};
use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Release identity, from CLI flags or `MCSITE_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub version: String,
    pub commit: String,
    pub environment: String,
}

impl From<&BuildArgs> for Release {
    fn from(args: &BuildArgs) -> Self {
        Self {
            version: args.build_version.clone(),
            commit: args.commit.clone(),
            environment: args.environment.clone(),
        }
    }
}

impl Default for Release {
    fn default() -> Self {
        Self {
            version: "0.0.0-dev".into(),
            commit: "unknown".into(),
            environment: "development".into(),
        }
    }
}

/// Serialized manifest.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo<'a> {
    pub build_time: String,
    pub version: &'a str,
    pub commit: &'a str,
    pub environment: &'a str,
    /// Messages in the feed
    pub messages: usize,
    /// Message pages written
    pub pages: usize,
    pub sitemap_urls: usize,
}

impl<'a> BuildInfo<'a> {
    pub fn new(release: &'a Release, now: DateTime<Utc>) -> Self {
        Self {
            build_time: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            version: &release.version,
            commit: &release.commit,
            environment: &release.environment,
            messages: 0,
            pages: 0,
            sitemap_urls: 0,
        }
    }

    pub fn write(&self, config: &SiteConfig) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        write_file(&config.paths().output_file(BUILD_INFO_FILE), json)
    }
}
