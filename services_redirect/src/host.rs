//! Editor host boundary
//!
//! The few editor operations redirection needs. A real editor integration
//! and the simulated editor both implement [`EditorHost`].

use overlay_types::DocumentUri;
use serde::{Deserialize, Serialize};
use services_overlay_fs::ProviderError;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Identifier of an open document (an editor tab)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Creates a new document ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc:{}", self.0)
    }
}

/// How a document is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShowOptions {
    /// Show as a preview tab, which the next preview open replaces
    pub preview: bool,
}

/// Editor host errors
#[derive(Debug, Error)]
pub enum HostError {
    #[error("No active document")]
    NoActiveDocument,

    #[error("Unknown document: {0}")]
    UnknownDocument(DocumentId),

    #[error("Unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },
}

/// Editor operations used by redirection
pub trait EditorHost {
    /// Returns the locator of the active document
    fn active_document(&self) -> Option<DocumentUri>;

    /// Closes the active view
    fn close_active(&mut self) -> Result<(), HostError>;

    /// Opens (or finds) the document for `uri` without showing it
    fn open_document(&mut self, uri: &DocumentUri) -> Result<DocumentId, HostError>;

    /// Shows an open document and makes it active
    fn show_document(&mut self, id: DocumentId, options: ShowOptions) -> Result<(), HostError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_display() {
        assert!(DocumentId::new().to_string().starts_with("doc:"));
    }

    #[test]
    fn test_show_options_default_is_not_preview() {
        assert!(!ShowOptions::default().preview);
    }
}
