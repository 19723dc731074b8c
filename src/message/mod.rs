//! Message Center feed: canonical records and the per-build message set.
//!
//! # Flow
//!
//! ```text
//! messages.json ──► MessageSet::load() ──► Message::from_value() per record
//!                         │
//!                         └── slug_index() ──► [Entry { slug, &Message }]
//!                                               (untitled + collisions dropped)
//! ```

mod store;
mod types;

pub use store::{MessageSet, SlugIndex};
pub use types::Message;
