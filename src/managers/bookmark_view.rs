//! Bookmark list view for one signed-in viewer.
//!
//! Owns the [`ListReconciler`] and exactly one change feed subscription for
//! as long as the view is open. Local writes go straight to the record store
//! and their results are merged immediately; the feed later delivers the same
//! change and the merge turns into a no-op. Dropping the view releases the
//! subscription.

use crate::managers::edit_draft::EditDraft;
use crate::reconciler::ListReconciler;
use crate::store::change_feed::{ChangeFeed, FeedFilter, Subscription};
use crate::store::record_store::RecordStoreTrait;
use crate::types::bookmark::{Bookmark, ListRender};
use crate::types::errors::{FeedError, ViewError};
use crate::validation::validate;

pub const ADD_FAILED: &str = "Failed to add bookmark. Try again.";
pub const SAVE_FAILED: &str = "Failed to save. Try again.";
pub const DELETE_FAILED: &str = "Failed to delete bookmark. Try again.";
pub const EMPTY_STATE: &str = "No bookmarks yet";

pub struct BookmarkListView {
    viewer: String,
    reconciler: ListReconciler,
    subscription: Subscription,
    stale: bool,
}

impl BookmarkListView {
    /// Opens the view: subscribes to the viewer's changes, then seeds the
    /// list from a snapshot.
    ///
    /// Subscribing first means nothing written between the two steps is
    /// missed; anything seen twice merges away.
    pub fn open<S: RecordStoreTrait + ?Sized>(
        store: &S,
        feed: &ChangeFeed,
        viewer: &str,
    ) -> Result<Self, ViewError> {
        Self::open_with_filter(store, feed, FeedFilter::owner(viewer))
    }

    /// Same as [`BookmarkListView::open`] with an explicit feed filter.
    pub fn open_with_filter<S: RecordStoreTrait + ?Sized>(
        store: &S,
        feed: &ChangeFeed,
        filter: FeedFilter,
    ) -> Result<Self, ViewError> {
        let viewer = filter.owner_id().to_string();
        let subscription = feed.subscribe(filter);
        let snapshot = store
            .list_for_owner(&viewer)
            .map_err(|e| ViewError::LoadFailed(e.to_string()))?;

        let mut reconciler = ListReconciler::new();
        reconciler.seed(snapshot);
        tracing::debug!(viewer = %viewer, items = reconciler.len(), "view opened");

        Ok(Self {
            viewer,
            reconciler,
            subscription,
            stale: false,
        })
    }

    pub fn viewer(&self) -> &str {
        &self.viewer
    }

    /// Validates and creates a bookmark, then shows it at the top.
    pub fn submit_new<S: RecordStoreTrait + ?Sized>(
        &mut self,
        store: &S,
        title: &str,
        url: &str,
    ) -> Result<Bookmark, ViewError> {
        let valid = validate(title, url)?;
        let record = store
            .insert(&self.viewer, &valid.title, &valid.url)
            .map_err(|e| {
                tracing::warn!(error = %e, "insert failed");
                ViewError::WriteFailed(ADD_FAILED.to_string())
            })?;
        self.reconciler.apply_local_insert(record.clone());
        Ok(record)
    }

    /// Validates and saves an edit through an [`EditDraft`], then replaces
    /// the entry in place.
    ///
    /// The draft starts from the entry shown in this view, or from the
    /// viewer's stored copy when the feed has not delivered it yet, so the
    /// write is always made as this view's viewer.
    pub fn submit_edit<S: RecordStoreTrait + ?Sized>(
        &mut self,
        store: &S,
        id: &str,
        title: &str,
        url: &str,
    ) -> Result<Bookmark, ViewError> {
        let valid = validate(title, url)?;
        let original = match self.get(id) {
            Some(bookmark) => bookmark,
            None => store.get(&self.viewer, id).map_err(|e| {
                tracing::warn!(error = %e, id, "edit target not found");
                ViewError::WriteFailed(SAVE_FAILED.to_string())
            })?,
        };

        let mut draft = EditDraft::begin(original);
        draft.set_title(valid.title);
        draft.set_url(valid.url);
        let record = draft.save(store)?;
        self.apply_local_update(record.clone());
        Ok(record)
    }

    /// Merges the result of an edit saved elsewhere (see `EditDraft`).
    pub fn apply_local_update(&mut self, record: Bookmark) -> bool {
        self.reconciler.apply_local_update(record)
    }

    /// Deletes a bookmark and removes it locally once the store confirms.
    ///
    /// Deleting something that is already gone counts as success.
    pub fn delete<S: RecordStoreTrait + ?Sized>(&mut self, store: &S, id: &str) -> Result<(), ViewError> {
        store.delete(&self.viewer, id).map_err(|e| {
            tracing::warn!(error = %e, id, "delete failed");
            ViewError::WriteFailed(DELETE_FAILED.to_string())
        })?;
        self.reconciler.remove_by_id(id);
        Ok(())
    }

    /// Applies every pending feed event. Returns whether the rendered list
    /// or the stale flag ended up different from before.
    ///
    /// Echoes of this view's own writes can pass through intermediate states
    /// (an insert re-added, then deleted again), so the answer compares the
    /// list before and after the drain rather than each event.
    ///
    /// Lost events (lag) or a closed feed leave the list possibly behind, so
    /// the view is marked stale until [`BookmarkListView::resync`].
    pub fn pump(&mut self) -> bool {
        let before = self.reconciler.items();
        let was_stale = self.stale;
        loop {
            match self.subscription.try_next() {
                Ok(Some(event)) => {
                    self.reconciler.apply(event);
                }
                Ok(None) => break,
                Err(FeedError::Lagged(dropped)) => {
                    tracing::warn!(viewer = %self.viewer, dropped, "view fell behind the change feed");
                    self.stale = true;
                }
                Err(FeedError::Closed) => {
                    tracing::warn!(viewer = %self.viewer, "change feed closed");
                    self.stale = true;
                    break;
                }
            }
        }
        self.stale != was_stale || self.reconciler.items() != before
    }

    /// Reloads the list from the store and clears the stale flag.
    pub fn resync<S: RecordStoreTrait + ?Sized>(&mut self, store: &S) -> Result<(), ViewError> {
        // Anything still queued is already reflected in the fresh snapshot.
        while let Ok(Some(_)) | Err(FeedError::Lagged(_)) = self.subscription.try_next() {}

        let snapshot = store
            .list_for_owner(&self.viewer)
            .map_err(|e| ViewError::LoadFailed(e.to_string()))?;
        self.reconciler.seed(snapshot);
        self.stale = false;
        tracing::info!(viewer = %self.viewer, items = self.reconciler.len(), "view resynced");
        Ok(())
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn items(&self) -> Vec<Bookmark> {
        self.reconciler.items()
    }

    pub fn get(&self, id: &str) -> Option<Bookmark> {
        self.reconciler.raw().iter().find(|b| b.id == id).cloned()
    }

    pub fn render(&self) -> ListRender {
        let items = self.reconciler.items();
        let count_label = match items.len() {
            1 => "1 Bookmark".to_string(),
            n => format!("{} Bookmarks", n),
        };
        let empty_state = items.is_empty().then(|| EMPTY_STATE.to_string());
        ListRender {
            items,
            count_label,
            empty_state,
            stale: self.stale,
        }
    }
}
