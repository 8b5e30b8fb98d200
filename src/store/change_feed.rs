//! Change feed: in-process publish/subscribe of bookmark row changes.
//!
//! Built on `tokio::sync::broadcast`. Every subscriber sees every published
//! event and keeps only the ones its [`FeedFilter`] accepts. A
//! [`Subscription`] is a scoped resource: dropping it releases the channel
//! and decrements [`ChangeFeed::active_subscriptions`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

use crate::types::errors::FeedError;
use crate::types::feed::{ChangeEvent, ChangeKind};

/// Which events a subscription receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedFilter {
    owner: String,
    scope_deletes: bool,
}

impl FeedFilter {
    /// Inserts, updates and deletes for rows owned by `owner`.
    pub fn owner(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            scope_deletes: true,
        }
    }

    /// Inserts and updates scoped to `owner`, deletes for every owner.
    ///
    /// Matches the asymmetric channel the hosted feed was originally
    /// subscribed with. Only kept so the difference stays testable.
    pub fn legacy_unscoped_deletes(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            scope_deletes: false,
        }
    }

    pub fn matches(&self, event: &ChangeEvent) -> bool {
        match event.kind() {
            ChangeKind::Delete if !self.scope_deletes => true,
            _ => event.owner() == self.owner,
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner
    }
}

/// Largest per-subscriber buffer a feed will allocate.
pub const MAX_CAPACITY: usize = 1 << 16;

/// Publishing side of the feed. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
    active: Arc<AtomicUsize>,
}

impl ChangeFeed {
    /// Creates a feed that buffers up to `capacity` events per subscriber,
    /// clamped to `1..=MAX_CAPACITY`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.clamp(1, MAX_CAPACITY));
        Self {
            sender,
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Publishes an event. Having no subscribers is not an error.
    pub fn publish(&self, event: ChangeEvent) {
        tracing::debug!(
            kind = ?event.kind(),
            id = event.record_id(),
            receivers = self.sender.receiver_count(),
            "publishing change"
        );
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self, filter: FeedFilter) -> Subscription {
        let count = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(owner = filter.owner_id(), active = count, "feed subscription opened");
        Subscription {
            receiver: self.sender.subscribe(),
            filter,
            active: Arc::clone(&self.active),
        }
    }

    /// Number of subscriptions that have not been dropped yet.
    pub fn active_subscriptions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

/// One live subscription. Released on drop.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<ChangeEvent>,
    filter: FeedFilter,
    active: Arc<AtomicUsize>,
}

impl Subscription {
    /// Returns the next matching event without waiting.
    ///
    /// `Ok(None)` means nothing is pending. After `Err(FeedError::Lagged)`
    /// the subscription keeps working from the oldest event still buffered.
    pub fn try_next(&mut self) -> Result<Option<ChangeEvent>, FeedError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.filter.matches(&event) => return Ok(Some(event)),
                Ok(_) => continue,
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Lagged(n)) => return Err(FeedError::Lagged(n)),
                Err(TryRecvError::Closed) => return Err(FeedError::Closed),
            }
        }
    }

    /// Waits for the next matching event.
    pub async fn next(&mut self) -> Result<ChangeEvent, FeedError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Ok(event),
                Ok(_) => continue,
                Err(RecvError::Lagged(n)) => return Err(FeedError::Lagged(n)),
                Err(RecvError::Closed) => return Err(FeedError::Closed),
            }
        }
    }

    pub fn filter(&self) -> &FeedFilter {
        &self.filter
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let remaining = self.active.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        tracing::info!(
            owner = self.filter.owner_id(),
            active = remaining,
            "feed subscription released"
        );
    }
}
