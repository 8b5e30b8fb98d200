// SmartMark storage collaborators
// The record store persists bookmarks; the change feed announces every write.

pub mod change_feed;
pub mod record_store;

pub use change_feed::{ChangeFeed, FeedFilter, Subscription};
pub use record_store::{RecordStore, RecordStoreTrait};
