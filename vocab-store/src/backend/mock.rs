//! Mock document backend for testing.
//!
//! Allows scripting snapshot deliveries and capturing add/delete
//! requests for verification.

use super::{BackendError, DocumentBackend, OrderBy, Subscription, SubscriptionHandle};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use vocab_types::{CollectionPath, Snapshot, VocabularyId};

/// Buffered events per subscription. Tests never queue anywhere near this.
const CHANNEL_CAPACITY: usize = 32;

/// Mock document backend for testing.
///
/// Records every add and delete request, assigns predictable `doc-N`
/// ids, and lets tests push snapshots or errors into live subscriptions.
#[derive(Debug, Default)]
pub struct MockBackend {
    inner: Arc<Mutex<MockBackendInner>>,
}

#[derive(Debug, Default)]
struct MockBackendInner {
    subscriptions: HashMap<CollectionPath, ActiveSubscription>,
    added: Vec<(CollectionPath, VocabularyId, serde_json::Value)>,
    deleted: Vec<(CollectionPath, VocabularyId)>,
    fail_next_subscribe: Option<String>,
    fail_next_add: Option<String>,
    fail_next_delete: Option<String>,
    next_id: u64,
}

#[derive(Debug)]
struct ActiveSubscription {
    sender: mpsc::Sender<super::SnapshotEvent>,
    handle: SubscriptionHandle,
}

impl MockBackend {
    /// Create a new mock backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a snapshot to the live subscription for `path`, if any.
    ///
    /// Events emitted after the subscription was cancelled (or after a
    /// newer subscription superseded it) are dropped.
    pub fn emit_snapshot(&self, path: &CollectionPath, snapshot: Snapshot) {
        self.emit(path, Ok(snapshot));
    }

    /// Deliver a stream error to the live subscription for `path`, if any.
    pub fn emit_error(&self, path: &CollectionPath, error: &str) {
        self.emit(path, Err(BackendError::Subscription(error.to_string())));
    }

    fn emit(&self, path: &CollectionPath, event: super::SnapshotEvent) {
        let inner = self.inner.lock().unwrap();
        if let Some(sub) = inner.subscriptions.get(path) {
            if sub.handle.is_cancelled() {
                return;
            }
            // Receiver dropped means the consumer detached; drop the event.
            let _ = sub.sender.try_send(event);
        }
    }

    /// All documents that were added, with their assigned ids.
    pub fn added_documents(&self) -> Vec<(CollectionPath, VocabularyId, serde_json::Value)> {
        self.inner.lock().unwrap().added.clone()
    }

    /// Ids of all documents that a delete was requested for, in order.
    pub fn deleted_ids(&self) -> Vec<VocabularyId> {
        self.inner
            .lock()
            .unwrap()
            .deleted
            .iter()
            .map(|(_, id)| id.clone())
            .collect()
    }

    /// All delete requests with their collection paths.
    pub fn delete_requests(&self) -> Vec<(CollectionPath, VocabularyId)> {
        self.inner.lock().unwrap().deleted.clone()
    }

    /// Whether a live (non-superseded) subscription exists for `path`.
    pub fn has_subscription(&self, path: &CollectionPath) -> bool {
        self.inner.lock().unwrap().subscriptions.contains_key(path)
    }

    /// Cause the next subscribe() to fail with the given error.
    pub fn fail_next_subscribe(&self, error: &str) {
        self.inner.lock().unwrap().fail_next_subscribe = Some(error.to_string());
    }

    /// Cause the next add_document() to fail with the given error.
    pub fn fail_next_add(&self, error: &str) {
        self.inner.lock().unwrap().fail_next_add = Some(error.to_string());
    }

    /// Cause the next delete_document() to fail with the given error.
    ///
    /// The delete request is still recorded.
    pub fn fail_next_delete(&self, error: &str) {
        self.inner.lock().unwrap().fail_next_delete = Some(error.to_string());
    }

    /// Clear all state (subscriptions, records, forced failures).
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        *inner = MockBackendInner::default();
    }
}

impl Clone for MockBackend {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl DocumentBackend for MockBackend {
    async fn subscribe(
        &self,
        path: &CollectionPath,
        _order: OrderBy,
    ) -> Result<Subscription, BackendError> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(error) = inner.fail_next_subscribe.take() {
            return Err(BackendError::SubscribeFailed(error));
        }

        let (sender, events) = mpsc::channel(CHANNEL_CAPACITY);
        let handle = SubscriptionHandle::new();
        // A new subscription supersedes any previous one for this path;
        // dropping the old sender closes the old stream.
        inner.subscriptions.insert(
            path.clone(),
            ActiveSubscription {
                sender,
                handle: handle.clone(),
            },
        );

        Ok(Subscription { events, handle })
    }

    async fn add_document(
        &self,
        path: &CollectionPath,
        data: serde_json::Value,
    ) -> Result<VocabularyId, BackendError> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(error) = inner.fail_next_add.take() {
            return Err(BackendError::AddFailed(error));
        }

        inner.next_id += 1;
        let id = VocabularyId::new(format!("doc-{}", inner.next_id))
            .expect("formatted id is non-empty");
        inner.added.push((path.clone(), id.clone(), data));
        Ok(id)
    }

    async fn delete_document(
        &self,
        path: &CollectionPath,
        id: &VocabularyId,
    ) -> Result<(), BackendError> {
        let mut inner = self.inner.lock().unwrap();
        inner.deleted.push((path.clone(), id.clone()));

        if let Some(error) = inner.fail_next_delete.take() {
            return Err(BackendError::DeleteFailed(error));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocab_types::{Document, ListId};

    fn vocab_path(list: &str) -> CollectionPath {
        CollectionPath::vocabulary(&ListId::new(list).unwrap())
    }

    fn one_doc_snapshot(id: &str) -> Snapshot {
        Snapshot::new(vec![Document::new(
            VocabularyId::new(id).unwrap(),
            serde_json::json!({ "foreignName": "x" }),
        )])
    }

    // ===========================================
    // Subscription Tests
    // ===========================================

    #[tokio::test]
    async fn subscribe_then_emit_delivers_snapshot() {
        let backend = MockBackend::new();
        let path = vocab_path("list-1");
        let mut sub = backend
            .subscribe(&path, OrderBy::descending("createdAt"))
            .await
            .unwrap();

        backend.emit_snapshot(&path, one_doc_snapshot("a"));

        let event = sub.events.recv().await.unwrap();
        assert_eq!(event.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn emit_error_delivers_error_event() {
        let backend = MockBackend::new();
        let path = vocab_path("list-1");
        let mut sub = backend
            .subscribe(&path, OrderBy::descending("createdAt"))
            .await
            .unwrap();

        backend.emit_error(&path, "permission denied");

        let event = sub.events.recv().await.unwrap();
        assert!(matches!(event, Err(BackendError::Subscription(_))));
    }

    #[tokio::test]
    async fn cancelled_subscription_drops_events() {
        let backend = MockBackend::new();
        let path = vocab_path("list-1");
        let mut sub = backend
            .subscribe(&path, OrderBy::descending("createdAt"))
            .await
            .unwrap();

        sub.handle.cancel();
        backend.emit_snapshot(&path, one_doc_snapshot("a"));

        assert!(sub.events.try_recv().is_err());
    }

    #[tokio::test]
    async fn new_subscription_supersedes_old() {
        let backend = MockBackend::new();
        let path = vocab_path("list-1");
        let mut first = backend
            .subscribe(&path, OrderBy::descending("createdAt"))
            .await
            .unwrap();
        let mut second = backend
            .subscribe(&path, OrderBy::descending("createdAt"))
            .await
            .unwrap();

        backend.emit_snapshot(&path, one_doc_snapshot("a"));

        // The superseded stream is closed; only the new one gets events.
        assert!(second.events.try_recv().is_ok());
        assert!(first.events.recv().await.is_none());
    }

    #[tokio::test]
    async fn forced_subscribe_failure() {
        let backend = MockBackend::new();
        backend.fail_next_subscribe("network unreachable");

        let result = backend
            .subscribe(&vocab_path("list-1"), OrderBy::descending("createdAt"))
            .await;
        assert!(matches!(result, Err(BackendError::SubscribeFailed(_))));

        // Next subscribe works.
        assert!(backend
            .subscribe(&vocab_path("list-1"), OrderBy::descending("createdAt"))
            .await
            .is_ok());
    }

    // ===========================================
    // Add / Delete Tests
    // ===========================================

    #[tokio::test]
    async fn add_assigns_sequential_ids() {
        let backend = MockBackend::new();
        let path = vocab_path("list-1");

        let first = backend
            .add_document(&path, serde_json::json!({ "foreignName": "a" }))
            .await
            .unwrap();
        let second = backend
            .add_document(&path, serde_json::json!({ "foreignName": "b" }))
            .await
            .unwrap();

        assert_eq!(first.as_str(), "doc-1");
        assert_eq!(second.as_str(), "doc-2");
        assert_eq!(backend.added_documents().len(), 2);
    }

    #[tokio::test]
    async fn forced_add_failure() {
        let backend = MockBackend::new();
        backend.fail_next_add("quota exceeded");
        let path = vocab_path("list-1");

        let result = backend.add_document(&path, serde_json::json!({})).await;
        assert!(matches!(result, Err(BackendError::AddFailed(_))));
        assert!(backend.added_documents().is_empty());
    }

    #[tokio::test]
    async fn delete_records_path_and_id() {
        let backend = MockBackend::new();
        let path = vocab_path("list-1");
        let id = VocabularyId::new("doc-3").unwrap();

        backend.delete_document(&path, &id).await.unwrap();

        assert_eq!(backend.deleted_ids(), vec![id.clone()]);
        assert_eq!(backend.delete_requests(), vec![(path, id)]);
    }

    #[tokio::test]
    async fn forced_delete_failure_still_records_request() {
        let backend = MockBackend::new();
        backend.fail_next_delete("not found");
        let path = vocab_path("list-1");
        let id = VocabularyId::new("doc-3").unwrap();

        let result = backend.delete_document(&path, &id).await;
        assert!(matches!(result, Err(BackendError::DeleteFailed(_))));
        assert_eq!(backend.deleted_ids().len(), 1);
    }

    // ===========================================
    // Clone and Shared State Tests
    // ===========================================

    #[tokio::test]
    async fn clone_shares_state() {
        let backend1 = MockBackend::new();
        let backend2 = backend1.clone();
        let path = vocab_path("list-1");

        backend1
            .add_document(&path, serde_json::json!({}))
            .await
            .unwrap();

        assert_eq!(backend2.added_documents().len(), 1);
    }

    #[tokio::test]
    async fn reset_clears_all() {
        let backend = MockBackend::new();
        let path = vocab_path("list-1");
        backend
            .add_document(&path, serde_json::json!({}))
            .await
            .unwrap();
        backend
            .subscribe(&path, OrderBy::descending("createdAt"))
            .await
            .unwrap();

        backend.reset();

        assert!(backend.added_documents().is_empty());
        assert!(!backend.has_subscription(&path));
    }
}
