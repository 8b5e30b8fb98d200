//! Open list views, keyed by a view id handed to the client.

use std::collections::HashMap;

use uuid::Uuid;

use super::bookmark_view::BookmarkListView;
use crate::types::bookmark::ListRender;

#[derive(Default)]
pub struct ViewRegistry {
    views: HashMap<String, BookmarkListView>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a view and returns its id.
    pub fn insert(&mut self, view: BookmarkListView) -> String {
        let id = Uuid::new_v4().to_string();
        self.views.insert(id.clone(), view);
        id
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut BookmarkListView> {
        self.views.get_mut(id)
    }

    /// Closes a view, releasing its subscription. Returns whether it existed.
    pub fn close(&mut self, id: &str) -> bool {
        self.views.remove(id).is_some()
    }

    /// Closes every view belonging to `viewer` (used on sign-out).
    pub fn close_for_viewer(&mut self, viewer: &str) -> usize {
        let before = self.views.len();
        self.views.retain(|_, v| v.viewer() != viewer);
        before - self.views.len()
    }

    /// Pumps every view and returns the renders of those that changed,
    /// ordered by view id.
    pub fn pump_all(&mut self) -> Vec<(String, ListRender)> {
        let mut changed: Vec<(String, ListRender)> = self
            .views
            .iter_mut()
            .filter_map(|(id, view)| view.pump().then(|| (id.clone(), view.render())))
            .collect();
        changed.sort_by(|a, b| a.0.cmp(&b.0));
        changed
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}
