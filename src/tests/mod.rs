mod search;

use std::time::Duration;

use crate::entries::{domain_of, BookmarkCreate, HistoryEntry};
use crate::store::Store;

/// A fresh, initialized store in its own temp directory so parallel tests
/// never share a database file.
pub fn create_store() -> (Store, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let store = Store::open(tmp.path().join("data/hub.db"), Duration::from_secs(5))
        .expect("failed to open store");
    store.init_schema().expect("failed to init schema");
    (store, tmp)
}

pub fn visit(id: &str, url: &str, title: &str, visit_time: f64) -> HistoryEntry {
    HistoryEntry {
        id: id.to_string(),
        url: url.to_string(),
        title: Some(title.to_string()),
        visit_time,
        last_visit_time: Some(visit_time),
        visit_count: 1,
        typed_count: 0,
        transition: Some("link".to_string()),
        domain: domain_of(url),
        is_local: false,
    }
}

pub fn bookmark(url: &str, title: &str, folder_path: &str, add_date: i64) -> BookmarkCreate {
    BookmarkCreate {
        url: url.to_string(),
        title: title.to_string(),
        folder_path: folder_path.to_string(),
        add_date: Some(add_date),
        ..Default::default()
    }
}

pub fn history_titles(store: &Store, term: &str) -> Vec<String> {
    store
        .search_history(term, 100)
        .unwrap()
        .into_iter()
        .filter_map(|entry| entry.title)
        .collect()
}

pub fn bookmark_titles(store: &Store, term: &str) -> Vec<String> {
    store
        .search_bookmarks(term, 100)
        .unwrap()
        .into_iter()
        .map(|bmark| bmark.title)
        .collect()
}
