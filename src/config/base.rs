//! `[base]` section configuration.
//!
//! Contains site identity used in page titles, meta tags and structured data.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[base]` section in mcsite.toml - site metadata.
///
/// # Example
/// ```toml
/// [base]
/// title = "Microsoft 365 Message Center"
/// url = "https://message.example.net"
/// twitter = "@example"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BaseConfig {
    /// Site name, appended to every page title.
    #[serde(default = "defaults::base::title")]
    #[educe(Default = defaults::base::title())]
    pub title: String,

    /// Site description for the home page and publisher metadata.
    #[serde(default = "defaults::base::description")]
    #[educe(Default = defaults::base::description())]
    pub description: String,

    /// Absolute base URL for canonical links and the sitemap.
    /// Required for `build`.
    #[serde(default = "defaults::base::url")]
    #[educe(Default = defaults::base::url())]
    pub url: Option<String>,

    /// BCP 47 language code (e.g., "en", "en-US").
    #[serde(default = "defaults::base::language")]
    #[educe(Default = defaults::base::language())]
    pub language: String,

    /// Organization credited as article author in structured data.
    #[serde(default = "defaults::base::author")]
    #[educe(Default = defaults::base::author())]
    pub author: String,

    /// Twitter handle for `twitter:site`.
    #[serde(default = "defaults::base::twitter")]
    #[educe(Default = defaults::base::twitter())]
    pub twitter: Option<String>,

    /// Publisher logo path, relative to the site root.
    #[serde(default = "defaults::base::logo")]
    #[educe(Default = defaults::base::logo())]
    pub logo: String,
}
