//! Bibliographic API clients.

pub mod crossref;

use std::fmt;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::WorksPage;

/// A works query against the bibliographic API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorksQuery {
    /// Works by a named author, restricted server-side to an ISSN allowlist.
    Author {
        first_name: String,
        last_name: String,
        start_year: i32,
        issns: Vec<String>,
    },
    /// Every work published in one journal.
    Journal { issn: String, start_year: i32 },
}

impl fmt::Display for WorksQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorksQuery::Author { first_name, last_name, start_year, .. } => {
                write!(f, "author {first_name} {last_name} from {start_year}")
            }
            WorksQuery::Journal { issn, start_year } => {
                write!(f, "issn {issn} from {start_year}")
            }
        }
    }
}

/// Common interface for bibliographic API clients: fetch one page of a
/// query starting at `offset`.
#[async_trait]
pub trait WorksApi: Send + Sync {
    async fn fetch_page(&self, query: &WorksQuery, offset: usize) -> Result<WorksPage>;
}

#[async_trait]
impl<T: WorksApi + ?Sized> WorksApi for std::sync::Arc<T> {
    async fn fetch_page(&self, query: &WorksQuery, offset: usize) -> Result<WorksPage> {
        (**self).fetch_page(query, offset).await
    }
}
