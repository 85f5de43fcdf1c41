use serde::Serialize;

/// A single browser history record.
///
/// `id` is the business key: inserting another entry with the same `id`
/// overwrites this one.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HistoryEntry {
    pub id: String,
    pub url: String,
    pub title: Option<String>,

    /// Epoch milliseconds.
    pub visit_time: f64,
    pub last_visit_time: Option<f64>,

    pub visit_count: i64,
    pub typed_count: i64,

    pub transition: Option<String>,
    pub domain: Option<String>,

    pub is_local: bool,
}

/// A stored bookmark. `id` is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Bookmark {
    pub id: i64,

    pub url: String,
    pub title: String,
    pub folder_path: String,

    pub add_date: Option<i64>,
    pub last_visit: Option<String>,
    pub visit_count: i64,
    pub is_bookmarklet: bool,
}

/// A bookmark as read from an export, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkCreate {
    pub url: String,
    pub title: String,
    pub folder_path: String,

    pub add_date: Option<i64>,
    pub last_visit: Option<String>,
    pub visit_count: i64,
}

impl Default for BookmarkCreate {
    fn default() -> Self {
        Self {
            url: String::new(),
            title: String::new(),
            folder_path: root_folder(),
            add_date: None,
            last_visit: None,
            visit_count: 0,
        }
    }
}

impl BookmarkCreate {
    pub fn is_bookmarklet(&self) -> bool {
        is_bookmarklet(&self.url)
    }
}

pub fn root_folder() -> String {
    "/".to_string()
}

pub fn is_bookmarklet(url: &str) -> bool {
    url.starts_with("javascript:")
}

/// Host component of `url`, if it parses and has one.
pub fn domain_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|host| host.to_string()))
}

/// A search result from either index, tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum SearchHit {
    History(HistoryEntry),
    Bookmark(Bookmark),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HistoryStats {
    pub total_entries: i64,
    pub unique_domains: i64,
    pub total_visits: i64,
    pub first_visit: Option<f64>,
    pub last_visit: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainStats {
    pub domain: String,
    pub page_count: i64,
    pub total_visits: i64,
    pub last_visit: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderStats {
    pub folder_path: String,
    pub bookmark_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BookmarkTotals {
    pub total: i64,
    pub folders: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DashboardStats {
    pub history: HistoryStats,
    pub top_domains: Vec<DomainStats>,
    pub bookmarks: BookmarkTotals,
}

/// Outcome of one ingestion batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IngestReport {
    pub received: usize,
    pub written: usize,
    pub skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_is_host_component() {
        assert_eq!(
            domain_of("https://docs.rs/rusqlite/latest").as_deref(),
            Some("docs.rs")
        );
        assert_eq!(domain_of("not a url"), None);
        assert_eq!(domain_of("javascript:alert(1)"), None);
    }

    #[test]
    fn search_hit_serializes_with_source_tag() {
        let hit = SearchHit::History(HistoryEntry {
            id: "h1".into(),
            url: "https://a.com".into(),
            domain: domain_of("https://a.com"),
            visit_time: 1.0,
            ..Default::default()
        });
        let value = serde_json::to_value(&hit).unwrap();
        assert_eq!(value["source"], "history");
        assert_eq!(value["url"], "https://a.com");
        assert_eq!(value["domain"], "a.com");

        let hit = SearchHit::Bookmark(Bookmark {
            id: 3,
            url: "https://b.com".into(),
            ..Default::default()
        });
        let value = serde_json::to_value(&hit).unwrap();
        assert_eq!(value["source"], "bookmark");
        assert_eq!(value["id"], 3);
    }
}
