//! Raw collection contents as delivered by the remote store.

use serde::{Deserialize, Serialize};

use crate::VocabularyId;

/// One stored document: its remote-assigned id plus its field data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// The document's id within its collection.
    pub id: VocabularyId,
    /// The document's fields as a JSON value.
    pub data: serde_json::Value,
}

impl Document {
    /// Create a document from an id and its field data.
    pub fn new(id: VocabularyId, data: serde_json::Value) -> Self {
        Self { id, data }
    }
}

/// A point-in-time view of every document in a collection.
///
/// Delivered to subscribers on every change. Document order is the
/// subscription's query order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// All documents in the collection at this point in time.
    pub documents: Vec<Document>,
}

impl Snapshot {
    /// Create a snapshot from a list of documents.
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    /// Number of documents in the snapshot.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the snapshot contains no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
