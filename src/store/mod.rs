pub mod errors;
pub mod ingest;
pub mod query;
pub mod schema;

use std::{
    path::Path,
    sync::{Mutex, MutexGuard},
    time::{Duration, Instant},
};

use rusqlite::Connection;

pub use errors::{StoreError, StoreResult};

/// Handle to the on-disk history/bookmark database.
///
/// All access goes through a single connection behind a mutex, so a batch
/// and the index updates its triggers make are never observed half-applied.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Opens (or creates) the database file, creating parent directories.
    /// The schema is not touched; see [`Store::init_schema`].
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(schema::PRAGMAS)?;
        conn.busy_timeout(busy_timeout)?;

        log::debug!("opened database at {}", path.display());

        Ok(Store {
            conn: Mutex::new(conn),
        })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::PRAGMAS)?;
        Ok(Store {
            conn: Mutex::new(conn),
        })
    }

    /// Creates tables, indexes, full-text tables and sync triggers if absent.
    pub fn init_schema(&self) -> StoreResult<()> {
        let mut conn = self.conn();
        schema::apply(&mut conn)?;
        log::info!("database schema initialized");
        Ok(())
    }

    /// Deletes every history entry and bookmark, then vacuums the file.
    ///
    /// The delete triggers empty both full-text indexes along the way.
    pub fn clean(&self) -> StoreResult<()> {
        let now = Instant::now();
        let mut conn = self.conn();

        let tx = conn.transaction()?;
        let history = tx.execute("DELETE FROM history", [])?;
        let bookmarks = tx.execute("DELETE FROM bookmarks", [])?;
        tx.commit()?;

        conn.execute_batch("VACUUM")?;

        log::info!(
            "database cleaned: {history} history entries and {bookmarks} bookmarks removed in {}ms",
            now.elapsed().as_millis()
        );
        Ok(())
    }

    /// Verifies both full-text indexes against their base tables.
    pub fn check_index(&self) -> StoreResult<()> {
        let conn = self.conn();
        schema::fts_command(&conn, "integrity-check")?;
        Ok(())
    }

    /// Rebuilds both full-text indexes from their base tables.
    pub fn rebuild_index(&self) -> StoreResult<()> {
        let now = Instant::now();
        let conn = self.conn();
        schema::fts_command(&conn, "rebuild")?;
        log::info!(
            "full-text indexes rebuilt in {}ms",
            now.elapsed().as_millis()
        );
        Ok(())
    }

    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|err| {
            log::warn!("database mutex was poisoned, recovering: {err}");
            err.into_inner()
        })
    }
}
