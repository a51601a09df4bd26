//! Error types for the preprocessing stage.

use abstracta_common::AbstractaError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, NlpError>;

#[derive(Debug, Error)]
pub enum NlpError {
    #[error("Invalid non-content pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Phrase model serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Common(#[from] AbstractaError),
}
