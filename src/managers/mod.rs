// SmartMark state managers
// Managers hold per-view state: the live bookmark list, edit drafts, and the registry of open views.

pub mod bookmark_view;
pub mod edit_draft;
pub mod view_registry;
