//! # vocab-types
//!
//! Foundational types for vocab-sync, a thin synchronization wrapper
//! around a remote document collection of vocabulary entries.
//!
//! This crate provides the types shared by the rest of the workspace:
//! - [`ListId`], [`VocabularyId`] - Identifier types
//! - [`Vocabulary`] - A single flashcard-like entry
//! - [`Document`], [`Snapshot`] - Raw collection contents as delivered
//!   by the remote store
//! - [`CollectionPath`] - Typed document paths
//! - [`VocabError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod document;
mod entry;
mod error;
mod ids;
mod path;

pub use document::{Document, Snapshot};
pub use entry::Vocabulary;
pub use error::VocabError;
pub use ids::{ListId, VocabularyId};
pub use path::CollectionPath;
