//! Error types for vocab-sync.

use thiserror::Error;

/// Errors that can occur when working with vocabulary values.
#[derive(Debug, Error)]
pub enum VocabError {
    /// An entry could not be serialized into a document value.
    #[error("encoding failed: {0}")]
    Encode(String),

    /// A document value could not be parsed into an entry.
    #[error("decoding failed: {0}")]
    Decode(String),

    /// An identifier was structurally invalid (e.g. empty).
    #[error("invalid id: {0}")]
    InvalidId(String),
}
