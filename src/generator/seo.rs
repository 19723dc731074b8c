//! Search metadata derived from a message.
//!
//! Shared by the page emitter (meta tags, Open Graph, JSON-LD) and the news
//! sitemap (keywords).

use crate::{config::SiteConfig, message::Message, utils::date};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::{Value, json};
use std::{collections::HashSet, sync::LazyLock};

/// Max description length in chars, including the ellipsis.
const DESCRIPTION_MAX: usize = 160;
/// A body paragraph shorter than this is only used when nothing longer exists.
const MEANINGFUL_PARAGRAPH: usize = 40;
const TITLE_KEYWORDS: usize = 5;
const DESCRIPTION_KEYWORDS: usize = 3;
/// Words of this many chars or fewer are not keywords.
const KEYWORD_MIN_EXCLUSIVE: usize = 4;
/// Appended to every keyword list.
const SITE_KEYWORDS: &[&str] = &["Microsoft 365", "Message Center"];

const DEFAULT_SERVICE: &str = "Microsoft 365";
const DEFAULT_CATEGORY: &str = "Service";
const DEFAULT_SEVERITY: &str = "Informational";

/// Everything the page head needs for one message.
#[derive(Debug, Clone)]
pub struct PageMeta {
    /// `{title} | {site}`
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    /// Absolute URL of the message page.
    pub canonical: String,
    pub published: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl PageMeta {
    pub fn new(msg: &Message, slug: &str, config: &SiteConfig, now: DateTime<Utc>) -> Self {
        let description = description(msg);
        let keywords = keywords(msg, &description);
        Self {
            title: page_title(msg, &config.base.title),
            canonical: config.absolute_url(&crate::config::PathResolver::message_url(slug)),
            published: msg.published_or_modified().unwrap_or(now),
            modified: msg.modified_or_published().unwrap_or(now),
            description,
            keywords,
        }
    }
}

pub fn page_title(msg: &Message, site: &str) -> String {
    format!("{} | {site}", msg.title)
}

// ============================================================================
// Description
// ============================================================================

/// Summary, else the first meaningful body paragraph, else a sentence built
/// from the message fields.
pub fn description(msg: &Message) -> String {
    if let Some(summary) = msg.summary.as_deref().map(normalize_text)
        && !summary.is_empty()
    {
        return truncate(&summary);
    }

    if let Some(paragraph) = msg.body.as_deref().and_then(first_paragraph) {
        return truncate(&paragraph);
    }

    format!(
        "{} {} update ({}): {}",
        msg.services.first().map_or(DEFAULT_SERVICE, String::as_str),
        msg.category.as_deref().unwrap_or(DEFAULT_CATEGORY),
        msg.severity.as_deref().unwrap_or(DEFAULT_SEVERITY),
        msg.title
    )
}

/// First paragraph with enough visible text, else the first non-empty one.
fn first_paragraph(html: &str) -> Option<String> {
    static RE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)</?(?:p|div|br|li|ul|ol|h[1-6]|tr|table|section|blockquote)\b[^>]*>")
            .unwrap()
    });

    let paragraphs: Vec<String> = RE_BLOCK
        .split(html)
        .map(normalize_text)
        .filter(|p| !p.is_empty())
        .collect();

    paragraphs
        .iter()
        .find(|p| p.chars().count() >= MEANINGFUL_PARAGRAPH)
        .or_else(|| paragraphs.first())
        .cloned()
}

/// Strip tags, decode entities and collapse whitespace.
fn normalize_text(html: &str) -> String {
    static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

    let text = RE_TAG.replace_all(html, " ");
    decode_entities(&text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode named (common) and numeric character references.
fn decode_entities(s: &str) -> String {
    static RE_ENTITY: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap());

    RE_ENTITY
        .replace_all(s, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            let decoded = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                "ndash" => Some('\u{2013}'),
                "mdash" => Some('\u{2014}'),
                "rsquo" => Some('\u{2019}'),
                "lsquo" => Some('\u{2018}'),
                "rdquo" => Some('\u{201D}'),
                "ldquo" => Some('\u{201C}'),
                "hellip" => Some('\u{2026}'),
                _ => name
                    .strip_prefix("#x")
                    .or_else(|| name.strip_prefix("#X"))
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| name.strip_prefix('#').map(str::parse::<u32>))
                    .and_then(Result::ok)
                    .and_then(char::from_u32)
                    .filter(|c| !c.is_control() || c.is_whitespace()),
            };
            decoded.map_or_else(|| caps[0].to_owned(), String::from)
        })
        .into_owned()
}

/// Cut to [`DESCRIPTION_MAX`] chars, ending in `...` when shortened.
fn truncate(text: &str) -> String {
    if text.chars().count() <= DESCRIPTION_MAX {
        return text.to_owned();
    }
    let cut: String = text.chars().take(DESCRIPTION_MAX - 3).collect();
    format!("{}...", cut.trim_end())
}

// ============================================================================
// Keywords
// ============================================================================

/// Keyword list in first-seen order, deduplicated case-insensitively.
pub fn keywords(msg: &Message, description: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let mut push = |word: &str| {
        let word = word.trim();
        if !word.is_empty() && seen.insert(word.to_lowercase()) {
            out.push(word.to_owned());
        }
    };

    msg.services.iter().for_each(|s| push(s));
    msg.category.iter().for_each(|s| push(s));
    msg.tags.iter().for_each(|s| push(s));
    msg.severity.iter().for_each(|s| push(s));
    msg.affected_workloads.iter().for_each(|s| push(s));
    long_words(&msg.title).take(TITLE_KEYWORDS).for_each(&mut push);
    long_words(description)
        .take(DESCRIPTION_KEYWORDS)
        .for_each(&mut push);
    SITE_KEYWORDS.iter().for_each(|s| push(s));

    out
}

fn long_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > KEYWORD_MIN_EXCLUSIVE)
}

// ============================================================================
// Structured data
// ============================================================================

/// schema.org `Article` JSON-LD for a message page.
pub fn structured_data(msg: &Message, meta: &PageMeta, config: &SiteConfig) -> Value {
    let base = &config.base;
    json!({
        "@context": "https://schema.org",
        "@type": "Article",
        "headline": msg.title,
        "description": meta.description,
        "keywords": meta.keywords.join(", "),
        "url": meta.canonical,
        "datePublished": date::to_w3c(meta.published),
        "dateModified": date::to_w3c(meta.modified),
        "author": {
            "@type": "Organization",
            "name": base.author,
        },
        "publisher": {
            "@type": "Organization",
            "name": base.title,
            "description": base.description,
            "logo": {
                "@type": "ImageObject",
                "url": config.absolute_url(&base.logo),
            },
        },
        "mainEntityOfPage": {
            "@type": "WebPage",
            "@id": meta.canonical,
        },
        "articleSection": msg.category.as_deref().unwrap_or(DEFAULT_CATEGORY),
        "inLanguage": base.language,
        "isAccessibleForFree": true,
    })
}
