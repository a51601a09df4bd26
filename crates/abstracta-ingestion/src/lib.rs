//! abstracta-ingestion: Bibliographic harvest stage.
//! - CrossRef works queries by author name and by journal ISSN
//! - Offset pagination until the reported total is reached
//! - Eligibility and author-match filtering, DOI deduplication
//! - JATS markup stripping of abstracts
//! - Backfill of missing abstracts from a supplementary table

pub mod backfill;
pub mod error;
pub mod harvest;
pub mod jats;
pub mod models;
pub mod pipeline;
pub mod sources;

pub use error::{HarvestError, Result};
pub use harvest::Harvester;
pub use sources::{WorksApi, WorksQuery};
