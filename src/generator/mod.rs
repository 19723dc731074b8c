//! Generated artifacts: sitemaps, message pages, service worker, manifest.

pub mod build_info;
pub mod news;
pub mod page;
pub mod seo;
pub mod service_worker;
pub mod sitemap;
