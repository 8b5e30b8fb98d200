//! Single-bookmark edit state.
//!
//! Holds the values being typed, the last error to show, and the bookmark as
//! it was when editing began so `cancel` can put everything back.

use crate::store::record_store::RecordStoreTrait;
use crate::types::bookmark::Bookmark;
use crate::types::errors::ViewError;
use crate::validation::validate;

use super::bookmark_view::SAVE_FAILED;

#[derive(Debug, Clone)]
pub struct EditDraft {
    original: Bookmark,
    title: String,
    url: String,
    error: Option<String>,
}

impl EditDraft {
    pub fn begin(bookmark: Bookmark) -> Self {
        Self {
            title: bookmark.title.clone(),
            url: bookmark.url.clone(),
            original: bookmark,
            error: None,
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn original(&self) -> &Bookmark {
        &self.original
    }

    /// Drops the typed values and any error.
    pub fn cancel(&mut self) {
        self.title = self.original.title.clone();
        self.url = self.original.url.clone();
        self.error = None;
    }

    /// Validates and writes the draft. The returned record should be merged
    /// into the list view with `apply_local_update`.
    ///
    /// On failure the error text is kept on the draft and nothing is written.
    pub fn save<S: RecordStoreTrait + ?Sized>(&mut self, store: &S) -> Result<Bookmark, ViewError> {
        self.error = None;

        let valid = match validate(&self.title, &self.url) {
            Ok(valid) => valid,
            Err(e) => {
                self.error = Some(e.to_string());
                return Err(e.into());
            }
        };

        match store.update(&self.original.owner, &self.original.id, &valid.title, &valid.url) {
            Ok(record) => {
                self.title = record.title.clone();
                self.url = record.url.clone();
                self.original = record.clone();
                Ok(record)
            }
            Err(e) => {
                tracing::warn!(error = %e, id = %self.original.id, "draft save failed");
                self.error = Some(SAVE_FAILED.to_string());
                Err(ViewError::WriteFailed(SAVE_FAILED.to_string()))
            }
        }
    }
}
