use serde::{Deserialize, Serialize};

/// A saved bookmark as stored in the record store.
///
/// `id`, `owner` and `created_at` are assigned by the store at creation and
/// never change afterwards. `created_at` is UNIX milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    pub owner: String,
    pub created_at: i64,
}

/// Rendered state of a bookmark list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRender {
    pub items: Vec<Bookmark>,
    /// "1 Bookmark" or "N Bookmarks".
    pub count_label: String,
    /// Set when there is nothing to show.
    pub empty_state: Option<String>,
    /// Set when the change feed dropped events and the list may be behind.
    pub stale: bool,
}
