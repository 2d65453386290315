//! VocabularyStore - the main interface for vocab-sync.
//!
//! This module provides [`VocabularyStore`], the primary API for
//! presenting a live, locally-observable view of one vocabulary list
//! stored in a remote document collection.
//!
//! # Architecture
//!
//! The store owns a published sequence of entries (a `tokio::sync::watch`
//! channel) and a standing subscription to the remote collection. The
//! subscription's watcher task is the sole writer of the published state,
//! except for the optimistic-removal step of [`VocabularyStore::delete`].
//!
//! ```text
//! UI ← watch channel ← VocabularyStore ← DocumentBackend ← remote store
//! ```
//!
//! # Consistency
//!
//! The remote store is the single source of truth. `add` and `delete`
//! are fire-and-forget; the locally visible list converges to whatever
//! the next snapshot reports. An optimistic removal whose remote delete
//! failed is visibly undone by that snapshot rather than rolled back.

use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use vocab_types::{CollectionPath, ListId, Snapshot, VocabError, Vocabulary, VocabularyId};

use crate::backend::{
    BackendError, DocumentBackend, OrderBy, SnapshotEvent, SubscriptionHandle,
};

/// The document field entries are ordered by (interop-critical name).
const CREATED_AT_FIELD: &str = "createdAt";

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An outgoing entry could not be serialized for `add`.
    #[error("encoding error: {0}")]
    Encoding(#[from] VocabError),

    /// An argument was rejected before any state was touched
    /// (out-of-range or duplicate delete offsets).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The backend rejected an operation synchronously.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// The active subscription, if any.
///
/// The generation counter guards the published state: a watcher task
/// may only publish while its generation is current, so late events
/// from a superseded subscription can never write.
#[derive(Default)]
struct Active {
    generation: u64,
    handle: Option<SubscriptionHandle>,
    watcher: Option<JoinHandle<()>>,
}

impl Active {
    fn detach(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.cancel();
        }
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
    }
}

/// Live view of one vocabulary list backed by a remote document collection.
///
/// `load_all` establishes the standing subscription; `add` and `delete`
/// mutate the remote collection and let the subscription reconcile the
/// local view.
pub struct VocabularyStore<B: DocumentBackend> {
    backend: Arc<B>,
    vocabulary: Arc<watch::Sender<Vec<Vocabulary>>>,
    active: Arc<Mutex<Active>>,
}

impl<B: DocumentBackend + 'static> VocabularyStore<B> {
    /// Create a new store over the given backend. No list is loaded yet.
    pub fn new(backend: B) -> Self {
        let (vocabulary, _) = watch::channel(Vec::new());
        Self {
            backend: Arc::new(backend),
            vocabulary: Arc::new(vocabulary),
            active: Arc::new(Mutex::new(Active::default())),
        }
    }

    /// The current entries of the loaded list, newest first.
    pub fn vocabulary(&self) -> Vec<Vocabulary> {
        self.vocabulary.borrow().clone()
    }

    /// Observe replacements of the entry sequence.
    ///
    /// The receiver always holds the latest value; use
    /// [`watch::Receiver::changed`] to await the next replacement.
    pub fn watch(&self) -> watch::Receiver<Vec<Vocabulary>> {
        self.vocabulary.subscribe()
    }

    /// Load all entries of the given list and keep them in sync.
    ///
    /// Establishes a standing subscription ordered by `createdAt`
    /// descending. Any previously loaded list is detached first; its
    /// late notifications are ignored. Snapshots arrive asynchronously
    /// and replace the published sequence wholesale; per-document decode
    /// failures and stream errors are logged, never surfaced.
    ///
    /// Only a synchronous failure to open the subscription is returned.
    pub async fn load_all(&self, list_id: &ListId) -> Result<(), StoreError> {
        let path = CollectionPath::vocabulary(list_id);

        let generation = {
            let mut active = self.active.lock().await;
            active.detach();
            active.generation += 1;
            active.generation
        };

        let subscription = match self
            .backend
            .subscribe(&path, OrderBy::descending(CREATED_AT_FIELD))
            .await
        {
            Ok(subscription) => subscription,
            Err(e) => {
                tracing::warn!(%path, error = %e, "could not subscribe to vocabulary list");
                return Err(e.into());
            }
        };

        let handle = subscription.handle.clone();
        let watcher = tokio::spawn(watch_collection(
            subscription.events,
            Arc::clone(&self.vocabulary),
            Arc::clone(&self.active),
            generation,
            path,
        ));

        let mut active = self.active.lock().await;
        if active.generation != generation {
            // A concurrent load_all superseded us while subscribing.
            handle.cancel();
            watcher.abort();
            return Ok(());
        }
        active.handle = Some(handle);
        active.watcher = Some(watcher);
        Ok(())
    }

    /// Add a new entry to the given list.
    ///
    /// Any local `id` on the entry is ignored; the remote store assigns
    /// one. Encoding failures are returned (and logged); the remote
    /// request itself is fire-and-forget, so the published sequence only
    /// changes once the standing subscription delivers the new entry.
    /// No duplicate check is performed.
    pub async fn add(&self, entry: &Vocabulary, list_id: &ListId) -> Result<(), StoreError> {
        let data = match entry.to_document() {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(
                    foreign_name = %entry.foreign_name,
                    list_id = %list_id,
                    error = %e,
                    "could not encode vocabulary entry"
                );
                return Err(e.into());
            }
        };

        let path = CollectionPath::vocabulary(list_id);
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            match backend.add_document(&path, data).await {
                Ok(id) => tracing::debug!(%path, %id, "added vocabulary entry"),
                Err(e) => {
                    tracing::warn!(%path, error = %e, "could not add vocabulary entry");
                }
            }
        });
        Ok(())
    }

    /// Delete the entries at the given offsets from the given list.
    ///
    /// Offsets index into the current published sequence and must be
    /// in range and free of duplicates; otherwise nothing is touched and
    /// `InvalidArgument` is returned.
    ///
    /// Valid offsets are removed locally right away (optimistic update),
    /// then one fire-and-forget remote delete is issued per removed
    /// entry that has a remote id. Entries never persisted (no id) are
    /// removed locally only. Remote failures are logged, not surfaced,
    /// and not rolled back; a later snapshot may reintroduce the entry.
    pub async fn delete(&self, offsets: &[usize], list_id: &ListId) -> Result<(), StoreError> {
        let deleted_ids = {
            // Lock out the watcher so the read-modify-publish is atomic.
            let _active = self.active.lock().await;
            let mut entries = self.vocabulary.borrow().clone();
            let deleted_ids = remove_at_offsets(&mut entries, offsets)?;
            self.vocabulary.send_replace(entries);
            deleted_ids
        };

        let path = CollectionPath::vocabulary(list_id);
        for id in deleted_ids {
            let backend = Arc::clone(&self.backend);
            let path = path.clone();
            tokio::spawn(async move {
                if let Err(e) = backend.delete_document(&path, &id).await {
                    tracing::warn!(
                        %path,
                        %id,
                        error = %e,
                        "remote delete failed; entry may reappear on next snapshot"
                    );
                }
            });
        }
        Ok(())
    }

    /// Get a reference to the underlying backend (for testing).
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: DocumentBackend> Drop for VocabularyStore<B> {
    fn drop(&mut self) {
        // Best effort; an un-detached watcher dies with the runtime.
        if let Ok(mut active) = self.active.try_lock() {
            active.detach();
        }
    }
}

/// Remove the entries at `offsets` in place and return the remote ids
/// that disappeared from the sequence.
///
/// Pure sequence logic, no I/O. Fails fast on out-of-range or duplicate
/// offsets without modifying `entries`. Entries without a remote id are
/// removed but contribute nothing to the returned ids.
fn remove_at_offsets(
    entries: &mut Vec<Vocabulary>,
    offsets: &[usize],
) -> Result<Vec<VocabularyId>, StoreError> {
    let mut sorted: Vec<usize> = offsets.to_vec();
    sorted.sort_unstable();
    if let Some(&offset) = sorted.last() {
        if offset >= entries.len() {
            return Err(StoreError::InvalidArgument(format!(
                "offset {} out of range for {} entries",
                offset,
                entries.len()
            )));
        }
    }
    if sorted.windows(2).any(|pair| pair[0] == pair[1]) {
        return Err(StoreError::InvalidArgument(
            "duplicate delete offsets".to_string(),
        ));
    }

    let all_ids: Vec<VocabularyId> = entries.iter().filter_map(|e| e.id.clone()).collect();
    // Back to front so earlier offsets stay valid.
    for &offset in sorted.iter().rev() {
        entries.remove(offset);
    }
    let remaining: HashSet<&VocabularyId> = entries.iter().filter_map(|e| e.id.as_ref()).collect();

    Ok(all_ids
        .into_iter()
        .filter(|id| !remaining.contains(id))
        .collect())
}

/// Watcher task body: consume subscription events until the stream
/// closes or the subscription is superseded.
async fn watch_collection(
    mut events: mpsc::Receiver<SnapshotEvent>,
    vocabulary: Arc<watch::Sender<Vec<Vocabulary>>>,
    active: Arc<Mutex<Active>>,
    generation: u64,
    path: CollectionPath,
) {
    while let Some(event) = events.recv().await {
        match event {
            Ok(snapshot) => {
                let entries = decode_snapshot(&path, &snapshot);
                let guard = active.lock().await;
                if guard.generation != generation {
                    // Superseded while decoding; this event is stale.
                    return;
                }
                vocabulary.send_replace(entries);
            }
            Err(e) => {
                // Stale-but-available: keep the last known entries.
                tracing::warn!(
                    %path,
                    error = %e,
                    "vocabulary subscription reported an error; keeping current entries"
                );
            }
        }
    }
    tracing::debug!(%path, "vocabulary subscription closed");
}

/// Decode every document of a snapshot, best-effort, newest first.
///
/// Documents that fail to decode are dropped with a warning. The sort is
/// stable, so snapshot order is preserved among equal timestamps.
fn decode_snapshot(path: &CollectionPath, snapshot: &Snapshot) -> Vec<Vocabulary> {
    let mut entries: Vec<Vocabulary> = snapshot
        .documents
        .iter()
        .filter_map(|doc| match Vocabulary::from_document(doc.id.clone(), &doc.data) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(%path, id = %doc.id, error = %e, "skipping undecodable document");
                None
            }
        })
        .collect();
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    entries
}
