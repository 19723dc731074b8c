//! Utility modules for the site builder.

pub mod date;
pub mod fs;
pub mod minify;
pub mod slug;
pub mod xml;
