use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::api::types::DocumentId;

/// Attribute carried by every inserted page reference. Display text is never
/// consulted: labels can be edited or aliased, the id cannot.
pub const PAGE_ID_ATTR: &str = "data-page-id";

static PAGE_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s(?i:data-page-id)\s*=\s*(?:"([^"<>]*)"|'([^'<>]*)')"#).unwrap()
});

/// Collect the ids of all pages referenced from serialized rich text.
///
/// Malformed markers (empty or unterminated values) are skipped.
pub fn extract_targets(content: &str) -> BTreeSet<DocumentId> {
    if content.trim().is_empty() {
        return BTreeSet::new();
    }

    PAGE_ID_RE
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| decode_entities(m.as_str().trim()))
        .filter(|id| !id.is_empty())
        .collect()
}

fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    raw.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
