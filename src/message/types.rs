//! Canonical message record and its normalization from feed JSON.
//!
//! Message Center exports have used several spellings for the same field
//! over time. Every alternate is resolved here, once; nothing downstream
//! looks at raw JSON.

use crate::utils::date;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Accepted spellings per canonical field, in priority order.
mod keys {
    pub const ID: &[&str] = &["id", "Id"];
    pub const TITLE: &[&str] = &["title", "Title"];
    pub const SUMMARY: &[&str] = &["summary", "Summary"];
    pub const BODY: &[&str] = &["content", "body", "Body", "messageBody"];
    pub const BODY_CONTENT: &[&str] = &["Content", "content"];
    pub const CATEGORY: &[&str] = &["category", "Category"];
    pub const SEVERITY: &[&str] = &["severity", "Severity"];
    pub const PUBLISHED: &[&str] = &["publishedDate", "startDate", "StartDateTime"];
    pub const LAST_MODIFIED: &[&str] = &[
        "lastModifiedDate",
        "LastModifiedDateTime",
        "lastModifiedDateTime",
        "lastModified",
    ];
    pub const END: &[&str] = &["endDate", "EndDateTime"];
    pub const ACTION_REQUIRED_BY: &[&str] = &["actionRequiredByDate", "ActionRequiredByDateTime"];
    pub const SERVICES: &[&str] = &["services", "Services"];
    pub const SERVICE: &[&str] = &["service"];
    pub const TAGS: &[&str] = &["tags", "Tags"];
    pub const WORKLOADS: &[&str] = &["affectedWorkloads"];
    pub const MAJOR_CHANGE: &[&str] = &["isMajorChange", "IsMajorChange"];
    pub const ATTACHMENTS: &[&str] = &["hasAttachments", "HasAttachments"];
}

/// One Message Center announcement in canonical shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    pub id: Option<String>,
    /// Trimmed title, empty when the record has none.
    pub title: String,
    pub summary: Option<String>,
    /// Message body, HTML by contract.
    pub body: Option<String>,
    pub category: Option<String>,
    pub severity: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub last_modified: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub action_required_by: Option<DateTime<Utc>>,
    pub services: Vec<String>,
    pub tags: Vec<String>,
    pub affected_workloads: Vec<String>,
    pub is_major_change: bool,
    pub has_attachments: bool,
}

impl Message {
    /// Normalize one raw feed record.
    ///
    /// Non-object values normalize to an empty message, which is then
    /// ineligible for URL generation.
    pub fn from_value(value: &Value) -> Self {
        let Some(raw) = value.as_object() else {
            return Self::default();
        };

        let mut services = string_list(raw, keys::SERVICES);
        if let Some(service) = string(raw, keys::SERVICE)
            && !services.contains(&service)
        {
            services.push(service);
        }

        Self {
            id: id(raw),
            title: string(raw, keys::TITLE).unwrap_or_default(),
            summary: string(raw, keys::SUMMARY),
            body: body(raw),
            category: string(raw, keys::CATEGORY),
            severity: string(raw, keys::SEVERITY),
            published: datetime(raw, keys::PUBLISHED),
            last_modified: datetime(raw, keys::LAST_MODIFIED),
            end: datetime(raw, keys::END),
            action_required_by: datetime(raw, keys::ACTION_REQUIRED_BY),
            services,
            tags: string_list(raw, keys::TAGS),
            affected_workloads: string_list(raw, keys::WORKLOADS),
            is_major_change: flag(raw, keys::MAJOR_CHANGE),
            has_attachments: flag(raw, keys::ATTACHMENTS),
        }
    }

    /// Key for per-message deterministic choices: id, else title.
    pub fn seed(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.title)
    }

    /// Last-modified, then published.
    pub fn modified_or_published(&self) -> Option<DateTime<Utc>> {
        self.last_modified.or(self.published)
    }

    /// Published, then last-modified.
    pub fn published_or_modified(&self) -> Option<DateTime<Utc>> {
        self.published.or(self.last_modified)
    }
}

// ============================================================================
// Field extraction
// ============================================================================

/// Non-blank trimmed string.
fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_owned())
}

/// First non-blank string among `keys`.
fn string(raw: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| raw.get(*k)?.as_str())
        .find_map(non_blank)
}

/// Ids arrive as strings or numbers.
fn id(raw: &Map<String, Value>) -> Option<String> {
    keys::ID.iter().find_map(|k| match raw.get(*k)? {
        Value::String(s) => non_blank(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Body is a string under several names, or an object with a `Content` field.
fn body(raw: &Map<String, Value>) -> Option<String> {
    keys::BODY.iter().find_map(|k| match raw.get(*k)? {
        Value::String(s) => non_blank(s),
        Value::Object(inner) => string(inner, keys::BODY_CONTENT),
        _ => None,
    })
}

/// First key whose value parses as a date.
fn datetime(raw: &Map<String, Value>, keys: &[&str]) -> Option<DateTime<Utc>> {
    date::parse_first(keys.iter().filter_map(|k| raw.get(*k)?.as_str()))
}

/// First non-empty list among `keys`; a bare string counts as one item.
fn string_list(raw: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .filter_map(|k| raw.get(*k))
        .map(|value| -> Vec<String> {
            match value {
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter_map(non_blank)
                    .collect(),
                Value::String(s) => non_blank(s).into_iter().collect(),
                _ => Vec::new(),
            }
        })
        .find(|list| !list.is_empty())
        .unwrap_or_default()
}

/// Booleans, also accepting `"true"` strings.
fn flag(raw: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter().any(|k| match raw.get(*k) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_graph_shape() {
        let msg = Message::from_value(&json!({
            "Id": "MC123456",
            "Title": "  Updated: Teams now supports X  ",
            "Category": "planForChange",
            "Severity": "normal",
            "StartDateTime": "2024-05-01T17:00:00Z",
            "LastModifiedDateTime": "2024-05-03T08:30:00Z",
            "ActionRequiredByDateTime": null,
            "Services": ["Microsoft Teams"],
            "Tags": ["New feature", "User impact"],
            "IsMajorChange": true,
            "Body": { "ContentType": "Html", "Content": "<p>Hello</p>" }
        }));

        assert_eq!(msg.id.as_deref(), Some("MC123456"));
        assert_eq!(msg.title, "Updated: Teams now supports X");
        assert_eq!(msg.category.as_deref(), Some("planForChange"));
        assert_eq!(msg.body.as_deref(), Some("<p>Hello</p>"));
        assert_eq!(
            msg.published,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 17, 0, 0).unwrap())
        );
        assert_eq!(
            msg.last_modified,
            Some(Utc.with_ymd_and_hms(2024, 5, 3, 8, 30, 0).unwrap())
        );
        assert_eq!(msg.action_required_by, None);
        assert_eq!(msg.services, vec!["Microsoft Teams"]);
        assert_eq!(msg.tags.len(), 2);
        assert!(msg.is_major_change);
        assert!(!msg.has_attachments);
    }

    #[test]
    fn test_camel_case_shape() {
        let msg = Message::from_value(&json!({
            "id": 42,
            "title": "Exchange Online change",
            "summary": "Short summary",
            "messageBody": "<p>Body</p>",
            "publishedDate": "2024-05-01",
            "lastModifiedDate": "not a date",
            "lastModifiedDateTime": "2024-05-02",
            "service": "Exchange Online",
            "affectedWorkloads": ["Exchange"],
            "hasAttachments": "true"
        }));

        assert_eq!(msg.id.as_deref(), Some("42"));
        assert_eq!(msg.summary.as_deref(), Some("Short summary"));
        assert_eq!(msg.body.as_deref(), Some("<p>Body</p>"));
        assert_eq!(
            msg.last_modified,
            Some(Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap())
        );
        assert_eq!(msg.services, vec!["Exchange Online"]);
        assert_eq!(msg.affected_workloads, vec!["Exchange"]);
        assert!(msg.has_attachments);
    }

    #[test]
    fn test_first_non_blank_spelling_wins() {
        let msg = Message::from_value(&json!({
            "title": "   ",
            "Title": "From Title",
            "content": "",
            "body": "<p>from body</p>"
        }));
        assert_eq!(msg.title, "From Title");
        assert_eq!(msg.body.as_deref(), Some("<p>from body</p>"));
    }

    #[test]
    fn test_services_merge_scalar_service() {
        let msg = Message::from_value(&json!({
            "services": ["Microsoft Teams", " "],
            "service": "SharePoint Online"
        }));
        assert_eq!(msg.services, vec!["Microsoft Teams", "SharePoint Online"]);

        let msg = Message::from_value(&json!({
            "services": ["Microsoft Teams"],
            "service": "Microsoft Teams"
        }));
        assert_eq!(msg.services, vec!["Microsoft Teams"]);
    }

    #[test]
    fn test_non_object_is_empty() {
        assert_eq!(Message::from_value(&json!("oops")), Message::default());
        assert_eq!(Message::from_value(&Value::Null).title, "");
    }

    #[test]
    fn test_seed_and_date_fallbacks() {
        let published = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut msg = Message {
            title: "Title".into(),
            published: Some(published),
            ..Message::default()
        };

        assert_eq!(msg.seed(), "Title");
        assert_eq!(msg.modified_or_published(), Some(published));

        msg.id = Some("MC1".into());
        assert_eq!(msg.seed(), "MC1");
    }
}
