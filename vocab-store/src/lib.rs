//! # vocab-store
//!
//! Synchronization wrapper for vocabulary lists backed by a remote
//! document collection.
//!
//! [`VocabularyStore`] presents a live, locally-observable view of one
//! list's entries: a standing subscription replaces the view on every
//! remote change, `add` persists new entries remotely, and `delete`
//! removes entries optimistically and lets the next authoritative
//! snapshot reconcile.
//!
//! ## Features
//!
//! - **Backend Abstraction**: Pluggable document store ([`DocumentBackend`])
//!   with a scriptable [`MockBackend`] for tests
//! - **Observable State**: Published via a `tokio::sync::watch` channel
//! - **Best-Effort Decoding**: Malformed documents are skipped, not fatal
//!
//! ## Example
//!
//! ```ignore
//! use vocab_store::{MockBackend, VocabularyStore};
//! use vocab_types::{ListId, Vocabulary};
//!
//! let store = VocabularyStore::new(MockBackend::new());
//! let list = ListId::new("spanish-basics").unwrap();
//!
//! store.load_all(&list).await?;
//! store.add(&Vocabulary::new("la casa", "the house"), &list).await?;
//! store.delete(&[0], &list).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod store;

pub use backend::{
    BackendError, Direction, DocumentBackend, MockBackend, OrderBy, SnapshotEvent, Subscription,
    SubscriptionHandle,
};
pub use store::{StoreError, VocabularyStore};
