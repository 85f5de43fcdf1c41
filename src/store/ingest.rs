use std::time::Instant;

use rusqlite::params;

use super::{Store, StoreResult};
use crate::entries::{BookmarkCreate, HistoryEntry, IngestReport};

// Re-inserting an id must update in place: a plain REPLACE would delete the
// old row without firing the delete trigger and hand the entry a new `seq`.
const UPSERT_HISTORY: &str = "
    INSERT INTO history
        (id, url, title, visit_time, last_visit_time, visit_count,
         typed_count, transition, domain, is_local)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
    ON CONFLICT(id) DO UPDATE SET
        url = excluded.url,
        title = excluded.title,
        visit_time = excluded.visit_time,
        last_visit_time = excluded.last_visit_time,
        visit_count = excluded.visit_count,
        typed_count = excluded.typed_count,
        transition = excluded.transition,
        domain = excluded.domain,
        is_local = excluded.is_local,
        created_at = CURRENT_TIMESTAMP
";

// Only the (url, folder_path) conflict is skipped; every other constraint
// still fails the batch.
const INSERT_BOOKMARK: &str = "
    INSERT INTO bookmarks
        (url, title, folder_path, add_date, last_visit, visit_count, is_bookmarklet)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    ON CONFLICT(url, folder_path) DO NOTHING
";

impl Store {
    /// Inserts or replaces history entries by `id`, all in one transaction.
    pub fn insert_history(&self, entries: &[HistoryEntry]) -> StoreResult<IngestReport> {
        let now = Instant::now();
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let mut written = 0;
        {
            let mut stmt = tx.prepare_cached(UPSERT_HISTORY)?;
            for entry in entries {
                written += stmt.execute(params![
                    entry.id,
                    entry.url,
                    entry.title,
                    entry.visit_time,
                    entry.last_visit_time,
                    entry.visit_count,
                    entry.typed_count,
                    entry.transition,
                    entry.domain,
                    entry.is_local,
                ])?;
            }
        }

        tx.commit()?;

        log::debug!(
            "wrote {written} history entries in {}ms",
            now.elapsed().as_millis()
        );

        Ok(IngestReport {
            received: entries.len(),
            written,
            skipped: entries.len() - written,
        })
    }

    /// Inserts bookmarks, silently skipping any whose (url, folder_path)
    /// pair is already stored. One transaction per call.
    pub fn insert_bookmarks(&self, entries: &[BookmarkCreate]) -> StoreResult<IngestReport> {
        let now = Instant::now();
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let mut written = 0;
        {
            let mut stmt = tx.prepare_cached(INSERT_BOOKMARK)?;
            for entry in entries {
                written += stmt.execute(params![
                    entry.url,
                    entry.title,
                    entry.folder_path,
                    entry.add_date,
                    entry.last_visit,
                    entry.visit_count,
                    entry.is_bookmarklet(),
                ])?;
            }
        }

        tx.commit()?;

        let skipped = entries.len() - written;
        if skipped > 0 {
            log::debug!("skipped {skipped} duplicate bookmarks");
        }
        log::debug!(
            "wrote {written} bookmarks in {}ms",
            now.elapsed().as_millis()
        );

        Ok(IngestReport {
            received: entries.len(),
            written,
            skipped,
        })
    }

    /// Removes one history entry by its business key.
    pub fn delete_history(&self, id: &str) -> StoreResult<bool> {
        let conn = self.conn();
        let removed = conn.execute("DELETE FROM history WHERE id = ?1", [id])?;
        Ok(removed > 0)
    }

    pub fn delete_bookmark(&self, id: i64) -> StoreResult<bool> {
        let conn = self.conn();
        let removed = conn.execute("DELETE FROM bookmarks WHERE id = ?1", [id])?;
        Ok(removed > 0)
    }
}
