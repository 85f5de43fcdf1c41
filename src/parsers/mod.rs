//! Readers for exported browser data.
//!
//! Exports come from several tools with slightly different key names, so
//! every field is looked up under a list of aliases.

mod bookmarks;
mod history;

use serde_json::Value;

pub use bookmarks::parse_bookmarks_file;
pub use history::parse_history_json;

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a list of entries or an object holding one under {0}")]
    Shape(&'static str),

    #[error("unsupported bookmark file {0:?}, expected .json, .html or .htm")]
    UnsupportedFormat(String),
}

/// Finds the entry list in a document that is either a bare array or an
/// object holding the array under one of `keys`.
fn entry_list<'a>(doc: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    match doc {
        Value::Array(items) => Some(items),
        Value::Object(map) => keys
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array)),
        _ => None,
    }
}

fn first<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| item.get(*key))
        .find(|value| !value.is_null())
}

fn first_str(item: &Value, keys: &[&str]) -> Option<String> {
    first(item, keys)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Strings and numbers both count; some exports write ids as numbers.
fn first_text(item: &Value, keys: &[&str]) -> Option<String> {
    match first(item, keys)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_f64(item: &Value, keys: &[&str]) -> Option<f64> {
    first(item, keys).and_then(|value| match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    })
}

fn first_i64(item: &Value, keys: &[&str]) -> Option<i64> {
    first_f64(item, keys).map(|value| value as i64)
}

fn first_bool(item: &Value, keys: &[&str]) -> Option<bool> {
    first(item, keys).and_then(Value::as_bool)
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
