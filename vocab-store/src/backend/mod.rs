//! Document backend abstraction for vocab-store.
//!
//! This module provides a pluggable backend layer that abstracts the
//! remote document service (a hosted store in production, a mock for
//! testing).
//!
//! # Design
//!
//! The backend trait is async and collection-oriented:
//! - `subscribe()` opens a standing subscription delivering whole-collection
//!   snapshots, with an explicit cancellation handle
//! - `add_document()` persists a new document and returns its assigned id
//! - `delete_document()` removes a single document by id
//!
//! # Example
//!
//! ```ignore
//! let backend = MockBackend::new();
//! let mut sub = backend.subscribe(&path, OrderBy::descending("createdAt")).await?;
//! while let Some(event) = sub.events.recv().await {
//!     // snapshot or error
//! }
//! sub.handle.cancel();
//! ```

mod mock;

pub use mock::MockBackend;

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use vocab_types::{CollectionPath, Snapshot, VocabularyId};

/// Backend errors.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Opening a subscription failed.
    #[error("subscribe failed: {0}")]
    SubscribeFailed(String),

    /// A standing subscription reported an error (permission denied,
    /// network failure). The subscription itself may keep running.
    #[error("subscription error: {0}")]
    Subscription(String),

    /// Persisting a new document failed.
    #[error("add failed: {0}")]
    AddFailed(String),

    /// Deleting a document failed.
    #[error("delete failed: {0}")]
    DeleteFailed(String),

    /// The subscription stream has closed and will deliver no more events.
    #[error("subscription closed")]
    Closed,
}

/// Sort direction for a subscription's query order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Smallest field value first.
    Ascending,
    /// Largest field value first.
    Descending,
}

/// Query ordering for a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// The document field to order by.
    pub field: String,
    /// The sort direction.
    pub direction: Direction,
}

impl OrderBy {
    /// Order by the given field, largest first.
    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Descending,
        }
    }

    /// Order by the given field, smallest first.
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Ascending,
        }
    }
}

/// One item of a subscription stream: a fresh snapshot, or an error the
/// backend chose to surface without tearing the stream down.
pub type SnapshotEvent = Result<Snapshot, BackendError>;

/// Cancellation handle for a standing subscription.
///
/// Cancellation is idempotent. After `cancel()` the backend must deliver
/// no further events on the subscription's channel.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionHandle {
    cancelled: Arc<AtomicBool>,
}

impl SubscriptionHandle {
    /// Create a new, not-yet-cancelled handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the subscription.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether the subscription has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A standing subscription: the event stream plus its cancellation handle.
#[derive(Debug)]
pub struct Subscription {
    /// Stream of snapshot-or-error events, in delivery order.
    pub events: mpsc::Receiver<SnapshotEvent>,
    /// Handle to detach the subscription.
    pub handle: SubscriptionHandle,
}

/// Backend trait for a remote document collection.
///
/// Implementations wrap the actual document service (hosted store SDK,
/// mock, etc).
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Open a standing subscription to the given collection.
    ///
    /// Every change to the collection delivers a whole-collection
    /// [`Snapshot`] in the requested order. Opening a new subscription
    /// to the same collection supersedes any previous one.
    async fn subscribe(
        &self,
        path: &CollectionPath,
        order: OrderBy,
    ) -> Result<Subscription, BackendError>;

    /// Persist a new document and return its assigned id.
    async fn add_document(
        &self,
        path: &CollectionPath,
        data: serde_json::Value,
    ) -> Result<VocabularyId, BackendError>;

    /// Delete a single document by id.
    async fn delete_document(
        &self,
        path: &CollectionPath,
        id: &VocabularyId,
    ) -> Result<(), BackendError>;
}
