//! Unit tests for the SQLite record store, using an in-memory database.

use std::sync::Arc;

use smartmark::database::Database;
use smartmark::store::{ChangeFeed, FeedFilter, RecordStore, RecordStoreTrait};
use smartmark::types::errors::StoreError;
use smartmark::types::feed::ChangeEvent;

fn setup() -> RecordStore {
    let db = Database::open_in_memory().expect("Failed to open in-memory database");
    RecordStore::new(Arc::new(db), ChangeFeed::new(16))
}

#[test]
fn test_insert_assigns_id_and_timestamp() {
    let store = setup();
    let bm = store.insert("u1", "Docs", "https://x.com").unwrap();
    assert!(!bm.id.is_empty());
    assert!(bm.created_at > 0);
    assert_eq!(bm.owner, "u1");
    assert_eq!(store.get("u1", &bm.id).unwrap(), bm);
}

#[test]
fn test_insert_rejects_empty_fields() {
    let store = setup();
    assert!(matches!(
        store.insert("u1", "", "https://x.com"),
        Err(StoreError::Invalid(_))
    ));
    assert!(matches!(store.insert("u1", "Docs", ""), Err(StoreError::Invalid(_))));
}

#[test]
fn test_list_is_newest_first_and_owner_scoped() {
    let store = setup();
    let a = store.insert("u1", "A", "https://a.com").unwrap();
    let b = store.insert("u1", "B", "https://b.com").unwrap();
    store.insert("u2", "Other", "https://o.com").unwrap();

    let list = store.list_for_owner("u1").unwrap();
    let ids: Vec<&str> = list.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec![b.id.as_str(), a.id.as_str()]);
}

#[test]
fn test_update_returns_new_row_and_keeps_identity() {
    let store = setup();
    let bm = store.insert("u1", "Docs", "https://x.com").unwrap();
    let updated = store.update("u1", &bm.id, "Docs2", "https://y.com").unwrap();
    assert_eq!(updated.id, bm.id);
    assert_eq!(updated.owner, "u1");
    assert_eq!(updated.created_at, bm.created_at);
    assert_eq!(updated.title, "Docs2");
    assert_eq!(updated.url, "https://y.com");
}

#[test]
fn test_other_owner_cannot_see_or_change_rows() {
    let store = setup();
    let bm = store.insert("u1", "Docs", "https://x.com").unwrap();

    assert!(matches!(store.get("u2", &bm.id), Err(StoreError::NotFound(_))));
    assert!(matches!(
        store.update("u2", &bm.id, "Hijack", "https://evil.com"),
        Err(StoreError::NotFound(_))
    ));
    assert!(!store.delete("u2", &bm.id).unwrap());
    assert_eq!(store.get("u1", &bm.id).unwrap().title, "Docs");
}

#[test]
fn test_delete_is_idempotent() {
    let store = setup();
    let bm = store.insert("u1", "Docs", "https://x.com").unwrap();
    assert!(store.delete("u1", &bm.id).unwrap());
    assert!(!store.delete("u1", &bm.id).unwrap());
    assert!(store.list_for_owner("u1").unwrap().is_empty());
}

#[test]
fn test_writes_publish_change_events() {
    let store = setup();
    let mut sub = store.feed().subscribe(FeedFilter::owner("u1"));

    let bm = store.insert("u1", "Docs", "https://x.com").unwrap();
    let updated = store.update("u1", &bm.id, "Docs2", "https://x.com").unwrap();
    store.delete("u1", &bm.id).unwrap();

    assert_eq!(sub.try_next().unwrap(), Some(ChangeEvent::Insert(bm.clone())));
    assert_eq!(sub.try_next().unwrap(), Some(ChangeEvent::Update(updated)));
    assert_eq!(
        sub.try_next().unwrap(),
        Some(ChangeEvent::Delete {
            id: bm.id.clone(),
            owner: "u1".to_string()
        })
    );
    assert_eq!(sub.try_next().unwrap(), None);
}

#[test]
fn test_failed_writes_publish_nothing() {
    let store = setup();
    let mut sub = store.feed().subscribe(FeedFilter::owner("u1"));

    let _ = store.insert("u1", "", "https://x.com");
    let _ = store.update("u1", "missing", "T", "https://x.com");
    store.delete("u1", "missing").unwrap();

    assert_eq!(sub.try_next().unwrap(), None);
}
