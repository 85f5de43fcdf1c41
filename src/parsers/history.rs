use serde_json::Value;

use super::{entry_list, first_bool, first_f64, first_i64, first_str, first_text, now_millis, ParseError};
use crate::entries::{domain_of, HistoryEntry};

const LIST_KEYS: [&str; 2] = ["Browser History", "history"];

/// Reads a history export: either a JSON array of visits or an object
/// holding one under `"Browser History"` or `"history"`.
///
/// Items without a url are dropped. Items without an id get a fresh ULID.
pub fn parse_history_json(content: &str) -> Result<Vec<HistoryEntry>, ParseError> {
    let doc: Value = serde_json::from_str(content)?;
    let items = entry_list(&doc, &LIST_KEYS).ok_or(ParseError::Shape("\"Browser History\""))?;

    let entries = items
        .iter()
        .filter_map(|item| {
            let url = first_str(item, &["url", "URL"])?;
            let now = now_millis() as f64;

            Some(HistoryEntry {
                id: first_text(item, &["id", "visitId"])
                    .unwrap_or_else(rusty_ulid::generate_ulid_string),
                title: Some(first_str(item, &["title", "name"]).unwrap_or_else(|| url.clone())),
                visit_time: first_f64(item, &["visitTime", "last_visit_time", "lastVisitTime"])
                    .unwrap_or(now),
                last_visit_time: Some(
                    first_f64(item, &["lastVisitTime", "last_visit_time", "visitTime"])
                        .unwrap_or(now),
                ),
                visit_count: first_i64(item, &["visitCount", "visit_count"]).unwrap_or(1),
                typed_count: first_i64(item, &["typedCount", "typed_count"]).unwrap_or(0),
                transition: Some(
                    first_str(item, &["transition"]).unwrap_or_else(|| "link".to_string()),
                ),
                domain: domain_of(&url),
                is_local: first_bool(item, &["isLocal"]).unwrap_or(false),
                url,
            })
        })
        .collect::<Vec<_>>();

    log::debug!("parsed {} of {} history items", entries.len(), items.len());
    Ok(entries)
}
