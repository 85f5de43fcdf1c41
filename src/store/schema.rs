//! Table, index and trigger definitions.
//!
//! Both full-text tables are FTS5 external-content tables: they hold only
//! the inverted index and are kept in step with their base table by the
//! `*_ai`, `*_ad` and `*_au` triggers below. Everything is created with
//! `IF NOT EXISTS` so applying the schema to an initialized store is a no-op.

use rusqlite::Connection;

pub const PRAGMAS: &str = "
    PRAGMA journal_mode = WAL;
    PRAGMA foreign_keys = ON;
    PRAGMA synchronous = NORMAL;
    PRAGMA cache_size = -64000;
";

/// `seq` is the row identity the index is keyed on. `id` stays the
/// business key, and re-inserting an `id` updates the row in place so
/// `seq` never moves.
const HISTORY_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS history (
        seq             INTEGER PRIMARY KEY AUTOINCREMENT,
        id              TEXT NOT NULL UNIQUE,
        url             TEXT NOT NULL CHECK (length(url) > 0),
        title           TEXT,
        visit_time      REAL NOT NULL,
        last_visit_time REAL,
        visit_count     INTEGER NOT NULL DEFAULT 1 CHECK (visit_count >= 0),
        typed_count     INTEGER NOT NULL DEFAULT 0 CHECK (typed_count >= 0),
        transition      TEXT,
        domain          TEXT,
        is_local        INTEGER NOT NULL DEFAULT 0,
        created_at      DATETIME DEFAULT CURRENT_TIMESTAMP
    );

    CREATE INDEX IF NOT EXISTS idx_history_url ON history(url);
    CREATE INDEX IF NOT EXISTS idx_history_domain ON history(domain);
    CREATE INDEX IF NOT EXISTS idx_history_visit_time ON history(visit_time DESC);

    CREATE VIRTUAL TABLE IF NOT EXISTS history_fts USING fts5(
        title, url, domain,
        content='history',
        content_rowid='seq'
    );

    CREATE TRIGGER IF NOT EXISTS history_ai AFTER INSERT ON history BEGIN
        INSERT INTO history_fts(rowid, title, url, domain)
        VALUES (new.seq, new.title, new.url, new.domain);
    END;

    CREATE TRIGGER IF NOT EXISTS history_ad AFTER DELETE ON history BEGIN
        INSERT INTO history_fts(history_fts, rowid, title, url, domain)
        VALUES ('delete', old.seq, old.title, old.url, old.domain);
    END;

    CREATE TRIGGER IF NOT EXISTS history_au AFTER UPDATE ON history BEGIN
        INSERT INTO history_fts(history_fts, rowid, title, url, domain)
        VALUES ('delete', old.seq, old.title, old.url, old.domain);
        INSERT INTO history_fts(rowid, title, url, domain)
        VALUES (new.seq, new.title, new.url, new.domain);
    END;
";

const BOOKMARKS_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS bookmarks (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        url             TEXT NOT NULL CHECK (length(url) > 0),
        title           TEXT NOT NULL,
        folder_path     TEXT NOT NULL DEFAULT '/',
        add_date        INTEGER,
        last_visit      TEXT,
        visit_count     INTEGER NOT NULL DEFAULT 0 CHECK (visit_count >= 0),
        is_bookmarklet  INTEGER NOT NULL DEFAULT 0,
        created_at      DATETIME DEFAULT CURRENT_TIMESTAMP,
        UNIQUE(url, folder_path)
    );

    CREATE INDEX IF NOT EXISTS idx_bookmarks_url ON bookmarks(url);
    CREATE INDEX IF NOT EXISTS idx_bookmarks_folder ON bookmarks(folder_path);
    CREATE INDEX IF NOT EXISTS idx_bookmarks_add_date ON bookmarks(add_date DESC);

    CREATE VIRTUAL TABLE IF NOT EXISTS bookmarks_fts USING fts5(
        title, url, folder_path,
        content='bookmarks',
        content_rowid='id'
    );

    CREATE TRIGGER IF NOT EXISTS bookmarks_ai AFTER INSERT ON bookmarks BEGIN
        INSERT INTO bookmarks_fts(rowid, title, url, folder_path)
        VALUES (new.id, new.title, new.url, new.folder_path);
    END;

    CREATE TRIGGER IF NOT EXISTS bookmarks_ad AFTER DELETE ON bookmarks BEGIN
        INSERT INTO bookmarks_fts(bookmarks_fts, rowid, title, url, folder_path)
        VALUES ('delete', old.id, old.title, old.url, old.folder_path);
    END;

    CREATE TRIGGER IF NOT EXISTS bookmarks_au AFTER UPDATE ON bookmarks BEGIN
        INSERT INTO bookmarks_fts(bookmarks_fts, rowid, title, url, folder_path)
        VALUES ('delete', old.id, old.title, old.url, old.folder_path);
        INSERT INTO bookmarks_fts(rowid, title, url, folder_path)
        VALUES (new.id, new.title, new.url, new.folder_path);
    END;
";

pub const FTS_TABLES: [&str; 2] = ["history_fts", "bookmarks_fts"];

/// Creates whatever part of the schema is missing, atomically.
pub fn apply(conn: &mut Connection) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(HISTORY_SCHEMA)?;
    tx.execute_batch(BOOKMARKS_SCHEMA)?;
    tx.commit()
}

/// Runs an FTS5 special command (`'rebuild'`, `'integrity-check'`, ...)
/// against every full-text table.
pub fn fts_command(conn: &Connection, command: &'static str) -> rusqlite::Result<()> {
    for table in FTS_TABLES {
        conn.execute_batch(&format!(
            "INSERT INTO {table}({table}) VALUES ('{command}')"
        ))?;
    }
    Ok(())
}
