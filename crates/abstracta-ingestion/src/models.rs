//! CrossRef response schema.
//!
//! Responses are decoded once at the API boundary into these types; a shape
//! mismatch is a typed decode error rather than a missing-key panic later.

use serde::Deserialize;

/// Top-level response: `status` is checked before `message` is decoded,
/// because failed queries carry an error list in `message`.
#[derive(Debug, Clone, Deserialize)]
pub struct WorksEnvelope {
    pub status: String,
    #[serde(default)]
    pub message: serde_json::Value,
}

/// One page of a works query.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorksPage {
    #[serde(default)]
    pub items: Vec<Work>,
    #[serde(default)]
    pub total_results: usize,
    #[serde(default)]
    pub items_per_page: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Work {
    #[serde(rename = "DOI")]
    pub doi: String,
    #[serde(rename = "type", default)]
    pub work_type: String,
    #[serde(default)]
    pub title: Vec<String>,
    #[serde(default)]
    pub container_title: Vec<String>,
    /// JATS-annotated abstract, when the publisher deposited one.
    #[serde(rename = "abstract", default)]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub author: Vec<WorkAuthor>,
    #[serde(default)]
    pub published: Option<PartialDate>,
    #[serde(default)]
    pub issued: Option<PartialDate>,
    #[serde(default)]
    pub is_referenced_by_count: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkAuthor {
    #[serde(default)]
    pub given: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PartialDate {
    #[serde(default)]
    pub date_parts: Vec<Vec<Option<i64>>>,
}

impl PartialDate {
    pub fn year(&self) -> Option<i32> {
        self.date_parts
            .first()
            .and_then(|parts| parts.first().copied().flatten())
            .and_then(|y| i32::try_from(y).ok())
    }
}

impl Work {
    pub fn first_title(&self) -> Option<&str> {
        self.title.first().map(String::as_str).filter(|t| !t.trim().is_empty())
    }

    pub fn journal(&self) -> &str {
        self.container_title.first().map(String::as_str).unwrap_or("")
    }

    /// Publication year from `published`, falling back to `issued`.
    pub fn year(&self) -> Option<i32> {
        self.published
            .as_ref()
            .and_then(PartialDate::year)
            .or_else(|| self.issued.as_ref().and_then(PartialDate::year))
    }
}
