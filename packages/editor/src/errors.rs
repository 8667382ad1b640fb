//! Error types for the editor

use crate::editor::EditorState;
use crate::mutations::MutationError;
use thiserror::Error;

/// Failure to fetch a document from the persistence backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Malformed document: {0}")]
    Malformed(String),

    #[error("Backend unavailable: {0}")]
    Backend(String),
}

/// Failure to store a document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SaveError {
    #[error("Save rejected: {0}")]
    Rejected(String),

    #[error("Backend unavailable: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Save error: {0}")]
    Save(#[from] SaveError),

    #[error("Editor is not ready (currently {0:?})")]
    NotReady(EditorState),

    #[error("Editor is closed")]
    Closed,

    #[error("Editor requires a Tokio runtime: {0}")]
    Runtime(String),
}

impl EditorError {
    /// True for errors caused by rejected input rather than I/O
    pub fn is_validation(&self) -> bool {
        matches!(self, EditorError::Mutation(MutationError::Validation(_)))
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Malformed(e.to_string())
    }
}
