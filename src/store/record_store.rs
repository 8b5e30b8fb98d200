//! Record store for bookmarks.
//!
//! Implements `RecordStoreTrait` on SQLite via `rusqlite`. Every query is
//! scoped by owner, which is the store's access policy: a viewer can neither
//! read nor change another viewer's rows. Each successful write is published
//! on the [`ChangeFeed`].

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use super::change_feed::ChangeFeed;
use crate::database::connection::Database;
use crate::types::bookmark::Bookmark;
use crate::types::errors::StoreError;
use crate::types::feed::ChangeEvent;

/// Trait defining record store operations.
pub trait RecordStoreTrait {
    /// Inserts a bookmark and returns it with its assigned id and timestamp.
    fn insert(&self, owner: &str, title: &str, url: &str) -> Result<Bookmark, StoreError>;
    /// Replaces title and url of an owned bookmark and returns the new row.
    fn update(&self, owner: &str, id: &str, title: &str, url: &str) -> Result<Bookmark, StoreError>;
    /// Deletes an owned bookmark. Returns `false` when there was nothing to delete.
    fn delete(&self, owner: &str, id: &str) -> Result<bool, StoreError>;
    fn get(&self, owner: &str, id: &str) -> Result<Bookmark, StoreError>;
    /// All bookmarks of `owner`, newest first.
    fn list_for_owner(&self, owner: &str) -> Result<Vec<Bookmark>, StoreError>;
}

const SELECT_COLUMNS: &str = "SELECT id, title, url, owner, created_at FROM bookmarks";

/// Bookmark store backed by SQLite.
pub struct RecordStore {
    db: Arc<Database>,
    feed: ChangeFeed,
}

impl RecordStore {
    pub fn new(db: Arc<Database>, feed: ChangeFeed) -> Self {
        Self { db, feed }
    }

    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    /// Current UNIX timestamp in milliseconds.
    fn now_millis() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }

    fn check_fields(title: &str, url: &str) -> Result<(), StoreError> {
        if title.is_empty() || url.is_empty() {
            return Err(StoreError::Invalid("title and url must not be empty".to_string()));
        }
        Ok(())
    }

    fn row_to_bookmark(row: &rusqlite::Row) -> rusqlite::Result<Bookmark> {
        Ok(Bookmark {
            id: row.get(0)?,
            title: row.get(1)?,
            url: row.get(2)?,
            owner: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

impl RecordStoreTrait for RecordStore {
    fn insert(&self, owner: &str, title: &str, url: &str) -> Result<Bookmark, StoreError> {
        Self::check_fields(title, url)?;

        let record = Bookmark {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            url: url.to_string(),
            owner: owner.to_string(),
            created_at: Self::now_millis(),
        };

        self.db.connection().execute(
            "INSERT INTO bookmarks (id, title, url, owner, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![record.id, record.title, record.url, record.owner, record.created_at],
        )?;

        tracing::info!(id = %record.id, owner, "bookmark inserted");
        self.feed.publish(ChangeEvent::Insert(record.clone()));
        Ok(record)
    }

    fn update(&self, owner: &str, id: &str, title: &str, url: &str) -> Result<Bookmark, StoreError> {
        Self::check_fields(title, url)?;

        let affected = self.db.connection().execute(
            "UPDATE bookmarks SET title = ?1, url = ?2 WHERE id = ?3 AND owner = ?4",
            params![title, url, id, owner],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }

        let record = self.get(owner, id)?;
        tracing::info!(id, owner, "bookmark updated");
        self.feed.publish(ChangeEvent::Update(record.clone()));
        Ok(record)
    }

    fn delete(&self, owner: &str, id: &str) -> Result<bool, StoreError> {
        let affected = self.db.connection().execute(
            "DELETE FROM bookmarks WHERE id = ?1 AND owner = ?2",
            params![id, owner],
        )?;
        if affected == 0 {
            tracing::debug!(id, owner, "delete matched no bookmark");
            return Ok(false);
        }

        tracing::info!(id, owner, "bookmark deleted");
        self.feed.publish(ChangeEvent::Delete {
            id: id.to_string(),
            owner: owner.to_string(),
        });
        Ok(true)
    }

    fn get(&self, owner: &str, id: &str) -> Result<Bookmark, StoreError> {
        self.db
            .connection()
            .query_row(
                &format!("{} WHERE id = ?1 AND owner = ?2", SELECT_COLUMNS),
                params![id, owner],
                Self::row_to_bookmark,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn list_for_owner(&self, owner: &str) -> Result<Vec<Bookmark>, StoreError> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare(&format!(
            "{} WHERE owner = ?1 ORDER BY created_at DESC, rowid DESC",
            SELECT_COLUMNS
        ))?;

        let rows = stmt.query_map(params![owner], Self::row_to_bookmark)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }
}
