//! Error types for the lexical contrast stage.

use abstracta_common::AbstractaError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LexicalError>;

#[derive(Debug, Error)]
pub enum LexicalError {
    #[error("Category '{0}' has no documents in the corpus")]
    UnknownCategory(String),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Chart serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] AbstractaError),
}
