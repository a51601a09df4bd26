//! Error types for the semantic indexing stage.

use std::path::PathBuf;

use abstracta_common::AbstractaError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EmbedError>;

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("Embedding server does not appear to be running at {url}: {source}")]
    Unreachable {
        url: String,
        source: reqwest::Error,
    },

    #[error("Embedding server returned HTTP {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Embedding server is running, but model '{model}' is not responding as expected: {reason}")]
    NotReady { model: String, reason: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Embedding response contained no vector")]
    EmptyEmbedding,

    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    InvalidEmbeddingDimension { expected: usize, actual: usize },

    #[error("LanceDB error: {0}")]
    LanceDb(String),

    #[error("Arrow error: {0}")]
    Arrow(String),

    #[error("Vector store at {0} has no stored embeddings")]
    EmptyIndex(PathBuf),

    #[error("Chart template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] AbstractaError),
}

impl EmbedError {
    /// Failures worth retrying after a pause: the server answered with an
    /// error (usually because it is busy) or the request timed out.
    pub fn is_transient(&self) -> bool {
        match self {
            EmbedError::Service { .. } => true,
            EmbedError::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}

impl From<lancedb::Error> for EmbedError {
    fn from(err: lancedb::Error) -> Self {
        EmbedError::LanceDb(err.to_string())
    }
}

impl From<arrow_schema::ArrowError> for EmbedError {
    fn from(err: arrow_schema::ArrowError) -> Self {
        EmbedError::Arrow(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_errors_are_transient() {
        let busy = EmbedError::Service { status: 503, message: "busy".into() };
        assert!(busy.is_transient());
        assert!(!EmbedError::EmptyEmbedding.is_transient());
        assert!(!EmbedError::NotReady { model: "m".into(), reason: "r".into() }.is_transient());
    }
}
