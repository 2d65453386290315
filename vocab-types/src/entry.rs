//! The vocabulary entry and its document encoding.
//!
//! Entries are stored as JSON-shaped documents in the remote collection.
//! The document id is the entry's identity and is *not* part of the
//! stored fields; it is attached on decode and stripped on encode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{VocabError, VocabularyId};

/// A single flashcard-like vocabulary entry.
///
/// `id` is absent until the remote store assigns one. Field names on the
/// wire are camelCase (`foreignName`, `nativeName`, `createdAt`) for
/// interop with existing deployments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vocabulary {
    /// Remote-assigned document id, absent until persisted.
    #[serde(skip)]
    pub id: Option<VocabularyId>,
    /// The word or phrase in the language being learned.
    pub foreign_name: String,
    /// The translation in the learner's native language.
    pub native_name: String,
    /// Creation time, used for newest-first ordering.
    pub created_at: DateTime<Utc>,
}

impl Vocabulary {
    /// Create a new, not-yet-persisted entry stamped with the current time.
    pub fn new(foreign_name: impl Into<String>, native_name: impl Into<String>) -> Self {
        Self {
            id: None,
            foreign_name: foreign_name.into(),
            native_name: native_name.into(),
            created_at: Utc::now(),
        }
    }

    /// Encode this entry as a document value for the remote store.
    ///
    /// Any local `id` is ignored; the store assigns one. Fails when a
    /// required field is missing (empty).
    pub fn to_document(&self) -> Result<serde_json::Value, VocabError> {
        if self.foreign_name.is_empty() {
            return Err(VocabError::Encode("foreignName is empty".to_string()));
        }
        if self.native_name.is_empty() {
            return Err(VocabError::Encode("nativeName is empty".to_string()));
        }
        serde_json::to_value(self).map_err(|e| VocabError::Encode(e.to_string()))
    }

    /// Decode a document value into an entry, attaching the document id.
    pub fn from_document(
        id: VocabularyId,
        data: &serde_json::Value,
    ) -> Result<Self, VocabError> {
        let mut entry: Vocabulary = serde_json::from_value(data.clone())
            .map_err(|e| VocabError::Decode(e.to_string()))?;
        entry.id = Some(id);
        Ok(entry)
    }
}
