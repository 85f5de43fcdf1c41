use super::{bookmark, create_store, history_titles, visit};
use crate::entries::SearchHit;
use crate::store::{Store, StoreError};

/// `history` history matches and `bmarks` bookmark matches for "rust".
fn seeded(history: usize, bmarks: usize) -> Store {
    let store = Store::open_in_memory().unwrap();
    store.init_schema().unwrap();

    let entries = (0..history)
        .map(|i| {
            visit(
                &format!("h{i}"),
                &format!("https://example.com/{i}"),
                &format!("Rust page {i}"),
                i as f64,
            )
        })
        .collect::<Vec<_>>();
    store.insert_history(&entries).unwrap();

    let entries = (0..bmarks)
        .map(|i| {
            bookmark(
                &format!("https://example.org/{i}"),
                &format!("Rust bookmark {i}"),
                "/",
                i as i64,
            )
        })
        .collect::<Vec<_>>();
    store.insert_bookmarks(&entries).unwrap();

    store
}

fn sources(hits: &[SearchHit]) -> Vec<&'static str> {
    hits.iter()
        .map(|hit| match hit {
            SearchHit::History(_) => "history",
            SearchHit::Bookmark(_) => "bookmark",
        })
        .collect()
}

#[test]
fn history_is_newest_first() {
    let (store, _tmp) = create_store();
    store
        .insert_history(&[
            visit("h1", "https://a.com", "Rust middle", 2.0),
            visit("h2", "https://b.com", "Rust oldest", 1.0),
            visit("h3", "https://c.com", "Rust newest", 3.0),
            visit("h4", "https://d.com", "Go newest", 4.0),
        ])
        .unwrap();

    assert_eq!(
        history_titles(&store, "rust"),
        vec!["Rust newest", "Rust middle", "Rust oldest"]
    );
}

#[test]
fn bookmarks_are_newest_first() {
    let (store, _tmp) = create_store();
    store
        .insert_bookmarks(&[
            bookmark("https://a.com", "Rust book", "/", 20),
            bookmark("https://b.com", "Rust reference", "/", 30),
            bookmark("https://c.com", "Rust nomicon", "/", 10),
        ])
        .unwrap();

    let titles = store
        .search_bookmarks("rust", 10)
        .unwrap()
        .into_iter()
        .map(|bmark| bmark.title)
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["Rust reference", "Rust book", "Rust nomicon"]);
}

#[test]
fn limit_is_respected() {
    let store = seeded(6, 6);
    assert_eq!(store.search_history("rust", 4).unwrap().len(), 4);
    assert_eq!(store.search_bookmarks("rust", 2).unwrap().len(), 2);
    assert!(store.search_history("rust", 0).unwrap().is_empty());
}

#[test]
fn matches_url_domain_and_folder() {
    let (store, _tmp) = create_store();
    store
        .insert_history(&[visit(
            "h1",
            "https://github.com/rust-lang/rust",
            "Language repository",
            1.0,
        )])
        .unwrap();
    store
        .insert_bookmarks(&[bookmark(
            "https://docs.rs",
            "Crate docs",
            "/Programming/",
            1,
        )])
        .unwrap();

    assert_eq!(history_titles(&store, "github"), vec!["Language repository"]);
    let found = store.search_bookmarks("programming", 10).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].folder_path, "/Programming/");
}

#[test]
fn fts_syntax_is_honored() {
    let (store, _tmp) = create_store();
    store
        .insert_history(&[
            visit("h1", "https://a.com", "Async runtime guide", 1.0),
            visit("h2", "https://b.com", "Async book", 2.0),
            visit("h3", "https://c.com", "Runtime internals", 3.0),
        ])
        .unwrap();

    assert_eq!(
        history_titles(&store, "async AND runtime"),
        vec!["Async runtime guide"]
    );
    assert_eq!(
        history_titles(&store, "\"runtime guide\""),
        vec!["Async runtime guide"]
    );
    assert_eq!(
        history_titles(&store, "async NOT book"),
        vec!["Async runtime guide"]
    );
    assert_eq!(history_titles(&store, "intern*"), vec!["Runtime internals"]);
}

#[test]
fn search_all_splits_limit_between_sources() {
    let store = seeded(6, 6);
    let hits = store.search_all("rust", 10).unwrap();
    assert_eq!(
        sources(&hits),
        vec![
            "history", "history", "history", "history", "history", "bookmark", "bookmark",
            "bookmark", "bookmark", "bookmark",
        ]
    );

    let hits = store.search_all("rust", 3).unwrap();
    assert_eq!(sources(&hits), vec!["history", "bookmark"]);
}

#[test]
fn search_all_does_not_reassign_unused_share() {
    let store = seeded(1, 6);
    let hits = store.search_all("rust", 10).unwrap();
    assert_eq!(
        sources(&hits),
        vec!["history", "bookmark", "bookmark", "bookmark", "bookmark", "bookmark"]
    );

    // each half is still newest first
    match &hits[1] {
        SearchHit::Bookmark(bmark) => assert_eq!(bmark.add_date, Some(5)),
        other => panic!("expected a bookmark, got {other:?}"),
    }
}

#[test]
fn search_all_with_tiny_limit_is_empty() {
    let store = seeded(3, 3);
    assert!(store.search_all("rust", 1).unwrap().is_empty());
}

#[test]
fn blank_term_is_rejected() {
    let store = seeded(1, 1);
    for term in ["", "   "] {
        assert!(matches!(
            store.search_history(term, 10),
            Err(StoreError::EmptyTerm)
        ));
        assert!(matches!(
            store.search_bookmarks(term, 10),
            Err(StoreError::EmptyTerm)
        ));
        assert!(matches!(
            store.search_all(term, 10),
            Err(StoreError::EmptyTerm)
        ));
    }
}

#[test]
fn malformed_term_is_reported() {
    let store = seeded(1, 1);
    let err = store.search_history("\"unbalanced", 10).unwrap_err();
    assert!(err.is_invalid_input(), "unexpected error: {err}");
    assert!(matches!(err, StoreError::InvalidTerm { .. }));

    let err = store.search_bookmarks("AND", 10).unwrap_err();
    assert!(err.is_invalid_input(), "unexpected error: {err}");
}

#[test]
fn no_match_is_empty_not_error() {
    let store = seeded(2, 2);
    assert!(store.search_history("zanzibar", 10).unwrap().is_empty());
    assert!(store.search_bookmarks("zanzibar", 10).unwrap().is_empty());
    assert!(store.search_all("zanzibar", 10).unwrap().is_empty());
}
