//! Error types for the harvest stage.

use abstracta_common::AbstractaError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarvestError>;

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CrossRef returned HTTP {status} for {query}")]
    Status { status: u16, query: String },

    #[error("CrossRef API query failed for {query} (status: {status})")]
    Api { status: String, query: String },

    #[error("Unexpected CrossRef response for {query}: {source}")]
    Decode {
        query: String,
        source: serde_json::Error,
    },

    #[error("Supplementary table error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Common(#[from] AbstractaError),
}
