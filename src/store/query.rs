use rusqlite::{params, Connection, Row};

use super::{Store, StoreError, StoreResult};
use crate::entries::{
    Bookmark, BookmarkTotals, DashboardStats, DomainStats, FolderStats, HistoryEntry,
    HistoryStats, SearchHit,
};

const DASHBOARD_TOP_DOMAINS: usize = 10;

const HISTORY_COLUMNS: &str = "h.id AS id, h.url AS url, h.title AS title, \
     h.visit_time AS visit_time, h.last_visit_time AS last_visit_time, \
     h.visit_count AS visit_count, h.typed_count AS typed_count, \
     h.transition AS transition, h.domain AS domain, h.is_local AS is_local";

const BOOKMARK_COLUMNS: &str = "b.id AS id, b.url AS url, b.title AS title, \
     b.folder_path AS folder_path, b.add_date AS add_date, b.last_visit AS last_visit, \
     b.visit_count AS visit_count, b.is_bookmarklet AS is_bookmarklet";

fn history_from_row(row: &Row) -> rusqlite::Result<HistoryEntry> {
    Ok(HistoryEntry {
        id: row.get("id")?,
        url: row.get("url")?,
        title: row.get("title")?,
        visit_time: row.get("visit_time")?,
        last_visit_time: row.get("last_visit_time")?,
        visit_count: row.get("visit_count")?,
        typed_count: row.get("typed_count")?,
        transition: row.get("transition")?,
        domain: row.get("domain")?,
        is_local: row.get("is_local")?,
    })
}

fn bookmark_from_row(row: &Row) -> rusqlite::Result<Bookmark> {
    Ok(Bookmark {
        id: row.get("id")?,
        url: row.get("url")?,
        title: row.get("title")?,
        folder_path: row.get("folder_path")?,
        add_date: row.get("add_date")?,
        last_visit: row.get("last_visit")?,
        visit_count: row.get("visit_count")?,
        is_bookmarklet: row.get("is_bookmarklet")?,
    })
}

/// Rejects blank terms. Anything else is handed to FTS5 `MATCH` untouched,
/// so malformed expressions come back as [`StoreError::InvalidTerm`].
fn require_term(term: &str) -> StoreResult<&str> {
    if term.trim().is_empty() {
        return Err(StoreError::EmptyTerm);
    }
    Ok(term)
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn history_matches(conn: &Connection, term: &str, limit: usize) -> StoreResult<Vec<HistoryEntry>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {HISTORY_COLUMNS}
         FROM history_fts fts
         JOIN history h ON h.seq = fts.rowid
         WHERE history_fts MATCH ?1
         ORDER BY h.visit_time DESC
         LIMIT ?2"
    ))?;

    let entries = stmt
        .query_map(params![term, sql_limit(limit)], history_from_row)
        .map_err(|err| StoreError::from_match(term, err))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| StoreError::from_match(term, err))?;

    log::debug!("history search {term:?} matched {} entries", entries.len());
    Ok(entries)
}

fn bookmark_matches(conn: &Connection, term: &str, limit: usize) -> StoreResult<Vec<Bookmark>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {BOOKMARK_COLUMNS}
         FROM bookmarks_fts fts
         JOIN bookmarks b ON b.id = fts.rowid
         WHERE bookmarks_fts MATCH ?1
         ORDER BY b.add_date DESC
         LIMIT ?2"
    ))?;

    let bmarks = stmt
        .query_map(params![term, sql_limit(limit)], bookmark_from_row)
        .map_err(|err| StoreError::from_match(term, err))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| StoreError::from_match(term, err))?;

    log::debug!("bookmark search {term:?} matched {} bookmarks", bmarks.len());
    Ok(bmarks)
}

fn history_stats(conn: &Connection) -> StoreResult<HistoryStats> {
    let stats = conn.query_row(
        "SELECT
            COUNT(*) AS total_entries,
            COUNT(DISTINCT domain) AS unique_domains,
            COALESCE(SUM(visit_count), 0) AS total_visits,
            MIN(visit_time) AS first_visit,
            MAX(visit_time) AS last_visit
         FROM history",
        [],
        |row| {
            Ok(HistoryStats {
                total_entries: row.get("total_entries")?,
                unique_domains: row.get("unique_domains")?,
                total_visits: row.get("total_visits")?,
                first_visit: row.get("first_visit")?,
                last_visit: row.get("last_visit")?,
            })
        },
    )?;
    Ok(stats)
}

fn top_domains(conn: &Connection, limit: usize) -> StoreResult<Vec<DomainStats>> {
    let mut stmt = conn.prepare_cached(
        "SELECT
            domain,
            COUNT(*) AS page_count,
            SUM(visit_count) AS total_visits,
            MAX(visit_time) AS last_visit
         FROM history
         WHERE domain IS NOT NULL
         GROUP BY domain
         ORDER BY total_visits DESC
         LIMIT ?1",
    )?;

    let domains = stmt
        .query_map([sql_limit(limit)], |row| {
            Ok(DomainStats {
                domain: row.get("domain")?,
                page_count: row.get("page_count")?,
                total_visits: row.get("total_visits")?,
                last_visit: row.get("last_visit")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(domains)
}

fn bookmark_folders(conn: &Connection) -> StoreResult<Vec<FolderStats>> {
    let mut stmt = conn.prepare_cached(
        "SELECT folder_path, COUNT(*) AS bookmark_count
         FROM bookmarks
         WHERE folder_path IS NOT NULL
         GROUP BY folder_path
         ORDER BY folder_path",
    )?;

    let folders = stmt
        .query_map([], |row| {
            Ok(FolderStats {
                folder_path: row.get("folder_path")?,
                bookmark_count: row.get("bookmark_count")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(folders)
}

fn bookmark_count(conn: &Connection) -> StoreResult<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM bookmarks", [], |row| row.get(0))?;
    Ok(count)
}

impl Store {
    /// History entries whose title, url or domain match `term`, newest
    /// visit first.
    pub fn search_history(&self, term: &str, limit: usize) -> StoreResult<Vec<HistoryEntry>> {
        let term = require_term(term)?;
        history_matches(&self.conn(), term, limit)
    }

    /// Bookmarks whose title, url or folder match `term`, newest first.
    pub fn search_bookmarks(&self, term: &str, limit: usize) -> StoreResult<Vec<Bookmark>> {
        let term = require_term(term)?;
        bookmark_matches(&self.conn(), term, limit)
    }

    /// Searches both indexes with half of `limit` each, inside one read
    /// transaction.
    ///
    /// Relevance scores from the two indexes are not comparable, so the
    /// results are not interleaved: history hits come first, then bookmark
    /// hits. A source with fewer matches than its half leaves the rest of
    /// the budget unused.
    pub fn search_all(&self, term: &str, limit: usize) -> StoreResult<Vec<SearchHit>> {
        let term = require_term(term)?;
        let share = limit / 2;

        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let history = history_matches(&tx, term, share)?;
        let bmarks = bookmark_matches(&tx, term, share)?;
        tx.commit()?;

        let mut hits = Vec::with_capacity(history.len() + bmarks.len());
        hits.extend(history.into_iter().map(SearchHit::History));
        hits.extend(bmarks.into_iter().map(SearchHit::Bookmark));
        Ok(hits)
    }

    pub fn history_stats(&self) -> StoreResult<HistoryStats> {
        history_stats(&self.conn())
    }

    /// Domains ranked by total visits across their pages.
    pub fn top_domains(&self, limit: usize) -> StoreResult<Vec<DomainStats>> {
        top_domains(&self.conn(), limit)
    }

    pub fn bookmark_folders(&self) -> StoreResult<Vec<FolderStats>> {
        bookmark_folders(&self.conn())
    }

    /// Bookmarks filed exactly under `folder_path`; subfolders are not
    /// included.
    pub fn bookmarks_by_folder(&self, folder_path: &str) -> StoreResult<Vec<Bookmark>> {
        let conn = self.conn();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {BOOKMARK_COLUMNS}
             FROM bookmarks b
             WHERE b.folder_path = ?1
             ORDER BY b.add_date DESC"
        ))?;

        let bmarks = stmt
            .query_map([folder_path], bookmark_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(bmarks)
    }

    pub fn bookmark_count(&self) -> StoreResult<i64> {
        bookmark_count(&self.conn())
    }

    /// All dashboard aggregates, read from a single snapshot.
    pub fn dashboard_stats(&self) -> StoreResult<DashboardStats> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let history = history_stats(&tx)?;
        let top_domains = top_domains(&tx, DASHBOARD_TOP_DOMAINS)?;
        let total = bookmark_count(&tx)?;
        let folders = bookmark_folders(&tx)?.len() as i64;

        tx.commit()?;

        Ok(DashboardStats {
            history,
            top_domains,
            bookmarks: BookmarkTotals { total, folders },
        })
    }
}
