//! Unit tests for the SmartMark database layer (connection + migrations).

use smartmark::database::migrations::{get_schema_version, run_all, CURRENT_SCHEMA_VERSION};
use smartmark::database::Database;
use tempfile::TempDir;

fn object_exists(db: &Database, kind: &str, name: &str) -> bool {
    db.connection()
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = ?1 AND name = ?2",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap_or(false)
}

#[test]
fn test_open_in_memory_succeeds() {
    assert!(Database::open_in_memory().is_ok());
}

#[test]
fn test_migrations_create_all_tables() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    for table in ["viewers", "bookmarks", "sessions", "schema_version"] {
        assert!(object_exists(&db, "table", table), "Table '{}' should exist", table);
    }
}

#[test]
fn test_migrations_create_indexes() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    for index in ["idx_bookmarks_owner_created", "idx_sessions_viewer"] {
        assert!(object_exists(&db, "index", index), "Index '{}' should exist", index);
    }
}

#[test]
fn test_migrations_are_idempotent() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    assert!(run_all(db.connection()).is_ok());
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);

    let recorded: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(recorded, CURRENT_SCHEMA_VERSION as i64);
}

#[test]
fn test_empty_title_is_rejected_by_schema() {
    let db = Database::open_in_memory().unwrap();
    let result = db.connection().execute(
        "INSERT INTO bookmarks (id, title, url, owner, created_at) VALUES ('1', '', 'https://x.com', 'u1', 0)",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn test_open_file_database_persists() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("smartmark.db");

    {
        let db = Database::open(&path).unwrap();
        db.connection()
            .execute(
                "INSERT INTO bookmarks (id, title, url, owner, created_at) VALUES ('1', 'Docs', 'https://x.com', 'u1', 0)",
                [],
            )
            .unwrap();
    }

    let db = Database::open(&path).unwrap();
    let count: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM bookmarks", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_foreign_keys_are_enforced() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.foreign_keys_enabled());

    let orphan = db.connection().execute(
        "INSERT INTO sessions (token_hash, viewer_id, created_at) VALUES ('h', 'missing', 0)",
        [],
    );
    assert!(orphan.is_err());
}

#[test]
fn test_file_database_uses_wal() {
    let dir = TempDir::new().unwrap();
    let db = Database::open(dir.path().join("smartmark.db")).unwrap();
    let mode: String = db
        .connection()
        .query_row("PRAGMA journal_mode", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_lowercase(), "wal");
    assert!(db.foreign_keys_enabled());
}
