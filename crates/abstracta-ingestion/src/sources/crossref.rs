//! CrossRef works client.
//!
//! Endpoints:
//!   /works?query.author=...            works by author name
//!   /journals/{issn}/works             works in one journal
//!
//! Polite pool: every request carries the configured User-Agent with a
//! mailto address (see CrossRef etiquette).

use std::time::Duration;

use abstracta_common::settings::CrossRefSettings;
use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{WorksApi, WorksQuery};
use crate::error::{HarvestError, Result};
use crate::models::{WorksEnvelope, WorksPage};

pub struct CrossRefClient {
    client: reqwest::Client,
    base_url: String,
    page_size: usize,
    author_timeout: Duration,
    journal_timeout: Duration,
}

impl CrossRefClient {
    pub fn new(cfg: &CrossRefSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            page_size: cfg.page_size,
            author_timeout: Duration::from_secs(cfg.author_timeout_secs),
            journal_timeout: Duration::from_secs(cfg.journal_timeout_secs),
        })
    }

    /// URL and query parameters for one page of `query`.
    fn request_params(&self, query: &WorksQuery, offset: usize) -> (String, Vec<(&'static str, String)>) {
        let (url, mut params) = match query {
            WorksQuery::Author { first_name, last_name, start_year, issns } => {
                let mut filter = format!("from-pub-date:{start_year}-01-01");
                for issn in issns {
                    filter.push_str(",issn:");
                    filter.push_str(issn);
                }
                (
                    format!("{}/works", self.base_url),
                    vec![
                        ("query.author", format!("{first_name} {last_name}")),
                        ("filter", filter),
                    ],
                )
            }
            WorksQuery::Journal { issn, start_year } => (
                format!("{}/journals/{}/works", self.base_url, issn),
                vec![("filter", format!("from-pub-date:{start_year}-01-01"))],
            ),
        };
        params.push(("rows", self.page_size.to_string()));
        if offset > 0 {
            params.push(("offset", offset.to_string()));
        }
        (url, params)
    }

    fn timeout_for(&self, query: &WorksQuery) -> Duration {
        match query {
            WorksQuery::Author { .. } => self.author_timeout,
            WorksQuery::Journal { .. } => self.journal_timeout,
        }
    }
}

#[async_trait]
impl WorksApi for CrossRefClient {
    #[instrument(skip(self), fields(query = %query))]
    async fn fetch_page(&self, query: &WorksQuery, offset: usize) -> Result<WorksPage> {
        let (url, params) = self.request_params(query, offset);
        let resp = self
            .client
            .get(&url)
            .query(&params)
            .timeout(self.timeout_for(query))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(HarvestError::Status {
                status: status.as_u16(),
                query: query.to_string(),
            });
        }

        let body = resp.text().await?;
        let page = decode_works_page(&body, query)?;
        debug!(
            offset,
            items = page.items.len(),
            total = page.total_results,
            "CrossRef page received"
        );
        Ok(page)
    }
}

/// Decode a works response body, rejecting any status other than "ok".
pub fn decode_works_page(body: &str, query: &WorksQuery) -> Result<WorksPage> {
    let envelope: WorksEnvelope = serde_json::from_str(body).map_err(|source| HarvestError::Decode {
        query: query.to_string(),
        source,
    })?;
    if envelope.status != "ok" {
        return Err(HarvestError::Api {
            status: envelope.status,
            query: query.to_string(),
        });
    }
    serde_json::from_value(envelope.message).map_err(|source| HarvestError::Decode {
        query: query.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> CrossRefClient {
        CrossRefClient::new(&CrossRefSettings {
            user_agent: "abstracta-tests/0.1 (mailto:tests@example.org)".into(),
            base_url: "https://api.crossref.org/".into(),
            page_size: 1000,
            author_timeout_secs: 30,
            journal_timeout_secs: 100,
            api_delay_secs: 0,
        })
        .unwrap()
    }

    #[test]
    fn test_author_query_params() {
        let q = WorksQuery::Author {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            start_year: 2010,
            issns: vec!["0883-9026".into(), "1932-4391".into()],
        };
        let (url, params) = client().request_params(&q, 0);
        assert_eq!(url, "https://api.crossref.org/works");
        assert_eq!(params[0], ("query.author", "Ada Lovelace".to_string()));
        assert_eq!(
            params[1],
            ("filter", "from-pub-date:2010-01-01,issn:0883-9026,issn:1932-4391".to_string())
        );
        assert_eq!(params[2], ("rows", "1000".to_string()));
        assert_eq!(params.len(), 3, "offset omitted on the first page");
    }

    #[test]
    fn test_journal_query_params_with_offset() {
        let q = WorksQuery::Journal { issn: "0883-9026".into(), start_year: 2014 };
        let (url, params) = client().request_params(&q, 2000);
        assert_eq!(url, "https://api.crossref.org/journals/0883-9026/works");
        assert!(params.contains(&("offset", "2000".to_string())));
        assert_eq!(client().timeout_for(&q), Duration::from_secs(100));
    }

    #[test]
    fn test_decode_rejects_failed_status() {
        let q = WorksQuery::Journal { issn: "x".into(), start_year: 2020 };
        let body = r#"{"status":"failed","message":[{"type":"validation-failure"}]}"#;
        assert!(matches!(decode_works_page(body, &q), Err(HarvestError::Api { .. })));
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        let q = WorksQuery::Journal { issn: "x".into(), start_year: 2020 };
        let body = r#"{"status":"ok","message":{"items":"not-a-list"}}"#;
        assert!(matches!(decode_works_page(body, &q), Err(HarvestError::Decode { .. })));
        assert!(matches!(decode_works_page("<html>", &q), Err(HarvestError::Decode { .. })));
    }

    #[test]
    fn test_decode_ok_page() {
        let q = WorksQuery::Journal { issn: "x".into(), start_year: 2020 };
        let body = r#"{
            "status": "ok",
            "message": {
                "items": [{"DOI": "10.1/a", "type": "journal-article", "title": ["A"]}],
                "total-results": 1,
                "items-per-page": 1000
            }
        }"#;
        let page = decode_works_page(body, &q).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_results, 1);
        assert_eq!(page.items_per_page, 1000);
    }
}
