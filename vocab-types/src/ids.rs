//! Identifier types for vocab-sync.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The identifier of a vocabulary list.
///
/// Lists are created and named elsewhere; the sync wrapper only ever
/// references them by id. Empty ids are rejected at construction so
/// every `ListId` in circulation addresses a real document path.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(String);

impl ListId {
    /// Create a ListId, rejecting empty strings.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListId({})", self.0)
    }
}

/// The remote-assigned identifier of a vocabulary document.
///
/// Assigned by the document store when an entry is persisted. Entries
/// constructed locally carry no id until the store hands one back.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VocabularyId(String);

impl VocabularyId {
    /// Create a VocabularyId, rejecting empty strings.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    /// Create a random VocabularyId (UUID v4 format).
    ///
    /// Backends that assign ids locally (the mock, offline queues) use
    /// this; real remote stores assign their own.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VocabularyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for VocabularyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VocabularyId({})", self.0)
    }
}
