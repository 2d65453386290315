//! Typed document paths.
//!
//! The path convention `lists/{listId}/vocabulary/{vocabularyId}` is
//! shared with existing deployments and must not change.

use std::fmt;

use crate::{ListId, VocabularyId};

/// Path to the vocabulary sub-collection of one list.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath {
    list_id: ListId,
}

impl CollectionPath {
    /// Path to the vocabulary collection under the given list.
    pub fn vocabulary(list_id: &ListId) -> Self {
        Self {
            list_id: list_id.clone(),
        }
    }

    /// The owning list's id.
    pub fn list_id(&self) -> &ListId {
        &self.list_id
    }

    /// Render the path of a single document within this collection.
    pub fn document(&self, id: &VocabularyId) -> String {
        format!("{}/{}", self, id)
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lists/{}/vocabulary", self.list_id)
    }
}

impl fmt::Debug for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CollectionPath({})", self)
    }
}
