//! Escaping for text interpolated into XML and HTML output.

use quick_xml::escape::escape as quick_escape;
use std::borrow::Cow;

/// Escape `& < > " '` for element text and attribute values.
///
/// Valid for both the XML documents and the HTML pages we emit.
#[inline]
pub fn escape(s: &str) -> Cow<'_, str> {
    quick_escape(s)
}

/// Serialize JSON for an inline `<script>` block.
///
/// `</` is written as `<\/` so message text can never close the element.
pub fn json_for_script(value: &serde_json::Value) -> String {
    value.to_string().replace("</", "<\\/")
}
