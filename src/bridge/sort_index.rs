//! Ordering key and position synthesis
//!
//! Annotations are displayed in the order of their ordering key,
//! `NNNNN|NNNNNN|NNNNN` (page index, character offset, character length). The
//! store compares keys as plain strings, so every group must keep its width.

use serde_json::Value;

use crate::request::{integer_prefix, parse_integer_prefix};

/// Largest page index that fits the five-digit leading group
pub const MAX_PAGE_INDEX: i64 = 99_999;

/// Offset and length groups; not derivable from what callers send
const OFFSET_AND_LENGTH: &str = "000000|00000";

/// Ordering key for a new annotation
///
/// An explicit key wins verbatim. Otherwise the page index comes from
/// `position.pageIndex`, then from the 1-based page label, then defaults to 0.
pub fn synthesize_sort_index(
    explicit: Option<&str>,
    position: Option<&Value>,
    page_label: Option<&str>,
) -> String {
    if let Some(key) = explicit.filter(|k| !k.is_empty()) {
        return key.to_string();
    }

    format_sort_index(page_index(position, page_label))
}

pub fn format_sort_index(page_index: i64) -> String {
    format!(
        "{:05}|{}",
        page_index.clamp(0, MAX_PAGE_INDEX),
        OFFSET_AND_LENGTH
    )
}

fn page_index(position: Option<&Value>, page_label: Option<&str>) -> i64 {
    let from_position = position
        .and_then(Value::as_object)
        .and_then(|p| p.get("pageIndex"))
        .and_then(integer_prefix);
    if let Some(index) = from_position {
        return index;
    }

    page_label
        .and_then(parse_integer_prefix)
        .map(|page| page - 1)
        .unwrap_or(0)
}

/// Position payload as stored: mappings are serialized, strings kept verbatim
pub fn serialize_position(position: Option<&Value>) -> String {
    match position {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
