//! Related blog articles shown on message pages.
//!
//! Articles come from dated CSV exports in the data tree
//! (`BlogPost_2024-05-01.csv`, ...). The newest export is published under a
//! fixed name so the client can fetch it, and each message page gets a
//! deterministic selection seeded by the message id.
//!
//! # CSV format
//!
//! ```text
//! "Title","URL","Date"
//! "Copilot rollout notes","https://blog.example.net/copilot","2024-05-01"
//! ```

use crate::config::SiteConfig;
use anyhow::{Context, Result};
use regex::Regex;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

/// One row of the blog-post export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogPost {
    pub title: String,
    pub url: String,
    pub date: String,
}

/// Parse CSV text, skipping the header row and any line that is not three
/// quoted fields.
pub fn parse_csv(content: &str) -> Vec<BlogPost> {
    static RE_ROW: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"^"(.+?)","(.+?)","(.+?)"\r?$"#).unwrap());

    content
        .split('\n')
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let caps = RE_ROW.captures(line)?;
            Some(BlogPost {
                title: caps[1].to_owned(),
                url: caps[2].to_owned(),
                date: caps[3].to_owned(),
            })
        })
        .collect()
}

/// Read and parse a CSV export.
pub fn load(path: &Path) -> Result<Vec<BlogPost>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(parse_csv(&content))
}

// ============================================================================
// Selection
// ============================================================================

/// 32-bit string hash over UTF-16 code units (`h = h * 31 + c`, wrapping).
fn seed_hash(seed: &str) -> i32 {
    seed.encode_utf16().fold(0i32, |h, c| {
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(c))
    })
}

/// Fisher-Yates shuffle driven by `h = (h * 9301 + 49297) mod 233280`.
fn seeded_shuffle<T>(items: &mut [T], seed: &str) {
    let mut h = i64::from(seed_hash(seed));
    for i in (1..items.len()).rev() {
        h = (h * 9301 + 49297) % 233_280;
        #[allow(clippy::cast_possible_truncation)] // |h| < 233280
        let j = (h.unsigned_abs() as usize) % (i + 1);
        items.swap(i, j);
    }
}

/// Pick `count` posts for a message. The same seed always yields the same
/// posts in the same order.
pub fn select<'a>(posts: &'a [BlogPost], seed: &str, count: usize) -> Vec<&'a BlogPost> {
    let mut shuffled: Vec<&BlogPost> = posts.iter().collect();
    seeded_shuffle(&mut shuffled, seed);
    shuffled.truncate(count);
    shuffled
}

// ============================================================================
// Publishing
// ============================================================================

/// Newest export in `dir`: the lexicographically last `{prefix}*.csv`,
/// excluding the published `latest` copy itself.
pub fn find_latest_csv(dir: &Path, prefix: &str, latest: &str) -> Option<PathBuf> {
    fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
        .filter_map(|e| {
            let name = e.file_name().into_string().ok()?;
            (name.starts_with(prefix) && name.ends_with(".csv") && name != latest)
                .then_some(name)
        })
        .max()
        .map(|name| dir.join(name))
}

/// Copy the newest export from the data source into the output data tree
/// under `[build.related] latest`, returning the published path.
pub fn publish_latest(config: &SiteConfig) -> Result<Option<PathBuf>> {
    let related = &config.build.related;
    let Some(source) = find_latest_csv(&config.build.data, &related.prefix, &related.latest)
    else {
        return Ok(None);
    };

    let dest = config.paths().data_dir().join(&related.latest);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(&source, &dest).with_context(|| {
        format!("Failed to copy {} to {}", source.display(), dest.display())
    })?;

    Ok(Some(dest))
}
