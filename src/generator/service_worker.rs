//! Service worker generation.
//!
//! The cache name embeds the build date so each deploy activates a fresh
//! cache and the worker deletes the old ones.

use crate::{config::SiteConfig, log, utils::fs::write_file};
use anyhow::Result;
use chrono::{DateTime, Utc};

const SW_TEMPLATE: &str = include_str!("../embed/sw.js");

/// Write `sw.js` if enabled.
pub fn build_service_worker(config: &SiteConfig, now: DateTime<Utc>) -> Result<()> {
    let sw = &config.build.sw;
    if !sw.enable {
        return Ok(());
    }

    let path = config.paths().output_file(&sw.path);
    write_file(&path, render(config, now))?;
    log!("sw"; "cache {}", cache_name(&sw.cache_prefix, now));
    Ok(())
}

/// `{prefix}-{YYYYMMDD}`
pub fn cache_name(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{prefix}-{}", now.format("%Y%m%d"))
}

/// `/`, `/index.html`, the feed, then configured extras, without duplicates.
pub fn precache_urls(config: &SiteConfig) -> Vec<String> {
    let mut urls = vec![
        "/".to_owned(),
        "/index.html".to_owned(),
        config.paths().feed_url(),
    ];
    for extra in &config.build.sw.precache {
        if !urls.contains(extra) {
            urls.push(extra.clone());
        }
    }
    urls
}

fn render(config: &SiteConfig, now: DateTime<Utc>) -> String {
    let cache = serde_json::Value::from(cache_name(&config.build.sw.cache_prefix, now));
    let urls = serde_json::Value::from(precache_urls(config));
    SW_TEMPLATE
        .replace("__CACHE_NAME__", &cache.to_string())
        .replace("__PRECACHE_URLS__", &urls.to_string())
}
