//! Loading the message feed and assigning URL slugs.
//!
//! The loaded [`MessageSet`] is passed explicitly to every build step;
//! nothing holds it globally.

use super::types::Message;
use crate::utils::slug::slugify;
use serde_json::Value;
use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Failure to read or parse the message feed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read message feed {0}")]
    Io(PathBuf, #[source] io::Error),

    #[error("message feed is not valid JSON")]
    Json(#[from] serde_json::Error),

    #[error("message feed must be an array or an object with a `value` array")]
    Shape,
}

/// All messages from one feed file, in source order.
#[derive(Debug, Clone, Default)]
pub struct MessageSet {
    messages: Vec<Message>,
}

impl MessageSet {
    /// Read and normalize a feed file.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content =
            fs::read_to_string(path).map_err(|err| StoreError::Io(path.to_path_buf(), err))?;
        Self::from_json(&content)
    }

    /// Parse a feed: a bare array, or a `{ "value": [...] }` envelope.
    pub fn from_json(content: &str) -> Result<Self, StoreError> {
        let root: Value = serde_json::from_str(content)?;
        let records = match &root {
            Value::Array(items) => items,
            Value::Object(map) => match map.get("value") {
                Some(Value::Array(items)) => items,
                _ => return Err(StoreError::Shape),
            },
            _ => return Err(StoreError::Shape),
        };

        Ok(Self {
            messages: records.iter().map(Message::from_value).collect(),
        })
    }

    #[cfg(test)]
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// Assign slugs, dropping untitled messages and slug collisions.
    ///
    /// The first message with a slug keeps it; later ones are reported in
    /// [`SlugIndex::collisions`] and get no URL.
    pub fn slug_index(&self) -> SlugIndex<'_> {
        let mut index = SlugIndex::default();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for message in &self.messages {
            let slug = slugify(&message.title);
            if message.title.is_empty() || slug.is_empty() {
                index.untitled += 1;
                continue;
            }

            if let Some(&first) = seen.get(&slug) {
                index.collisions.push(Collision {
                    slug,
                    kept: index.entries[first].message,
                    dropped: message,
                });
                continue;
            }

            seen.insert(slug.clone(), index.entries.len());
            index.entries.push(Entry { slug, message });
        }

        index
    }
}

/// A message with its URL slug.
#[derive(Debug, Clone)]
pub struct Entry<'a> {
    pub slug: String,
    pub message: &'a Message,
}

/// Two messages that produced the same slug.
#[derive(Debug, Clone)]
pub struct Collision<'a> {
    pub slug: String,
    pub kept: &'a Message,
    pub dropped: &'a Message,
}

/// Messages eligible for URLs, in source order.
#[derive(Debug, Default)]
pub struct SlugIndex<'a> {
    pub entries: Vec<Entry<'a>>,
    /// Messages without a title or with a title that slugs to nothing.
    pub untitled: usize,
    pub collisions: Vec<Collision<'a>>,
}

impl SlugIndex<'_> {
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
