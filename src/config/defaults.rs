//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [base] Section Defaults
// ============================================================================

pub mod base {
    pub fn title() -> String {
        "Microsoft 365 Message Center".into()
    }

    pub fn description() -> String {
        "Track service updates, announcements, and changes for Microsoft 365 services.".into()
    }

    pub fn url() -> Option<String> {
        None
    }

    pub fn language() -> String {
        "en".into()
    }

    pub fn author() -> String {
        "Microsoft".into()
    }

    pub fn twitter() -> Option<String> {
        None
    }

    pub fn logo() -> String {
        "/logo.svg".into()
    }
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn assets() -> PathBuf {
        "public".into()
    }

    pub fn data() -> PathBuf {
        "data".into()
    }

    pub fn data_url() -> String {
        "data".into()
    }

    pub fn messages() -> PathBuf {
        "messages.json".into()
    }

    pub fn template() -> PathBuf {
        "index.html".into()
    }

    pub fn output() -> PathBuf {
        "dist".into()
    }

    pub fn exclude() -> Vec<String> {
        ["archive", "archives", "backup", "backups", "node_modules", ".git"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    pub fn size_warning() -> String {
        "100MB".into()
    }

    pub mod sitemap {
        use crate::config::{ChangeFreq, RouteConfig};
        use std::path::PathBuf;

        pub fn path() -> PathBuf {
            "sitemap.xml".into()
        }

        pub fn xsl_path() -> PathBuf {
            "sitemap.xsl".into()
        }

        pub fn news_path() -> PathBuf {
            "news-sitemap.xml".into()
        }

        pub fn news_limit() -> usize {
            1000
        }

        pub fn routes() -> Vec<RouteConfig> {
            vec![
                RouteConfig::new("/", ChangeFreq::Daily, 1.0),
                RouteConfig::new("/messages", ChangeFreq::Daily, 0.9),
                RouteConfig::new("/about", ChangeFreq::Monthly, 0.8),
                RouteConfig::new("/privacy", ChangeFreq::Monthly, 0.5),
                RouteConfig::new("/terms", ChangeFreq::Monthly, 0.5),
            ]
        }
    }

    pub mod related {
        pub fn prefix() -> String {
            "BlogPost_".into()
        }

        pub fn latest() -> String {
            "BlogPost_latest.csv".into()
        }

        pub fn count() -> usize {
            3
        }
    }

    pub mod sw {
        use std::path::PathBuf;

        pub fn path() -> PathBuf {
            "sw.js".into()
        }

        pub fn cache_prefix() -> String {
            "mc-site".into()
        }
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        3000
    }
}
