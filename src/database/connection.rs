//! The single SQLite connection behind the record store and identity service.
//!
//! Every connection is configured the same way before migrations run:
//! foreign keys on (sessions cascade with their viewer) and a busy timeout
//! so a second process holding the file briefly does not fail writes.

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

use super::migrations;

/// How long a write waits on a locked database file.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the database file at `path`, switches it to WAL and
    /// brings the schema up to date.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        let db = Self::prepare(conn)?;
        tracing::info!(
            path = %path.display(),
            schema = migrations::get_schema_version(&db.conn),
            "database ready"
        );
        Ok(db)
    }

    /// Private in-memory database, gone when dropped.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::prepare(Connection::open_in_memory()?)
    }

    fn prepare(conn: Connection) -> Result<Self, rusqlite::Error> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        migrations::run_all(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Whether foreign key enforcement is on for this connection.
    pub fn foreign_keys_enabled(&self) -> bool {
        self.conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get::<_, i64>(0))
            .map(|v| v == 1)
            .unwrap_or(false)
    }
}
