//! Publication records shared by every stage.
//!
//! A single record type flows through the whole pipeline: the harvester
//! fills the bibliographic fields, the text normaliser fills the derived
//! text fields, and later stages only read.

use serde::{Deserialize, Serialize};

/// Name of the scholar an author-sourced record was matched against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScholarName {
    pub first_name: String,
    pub last_name: String,
}

impl ScholarName {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One harvested work plus the text fields derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    pub doi: String,
    pub title: String,
    pub journal: String,
    /// Markup-free abstract; `None` when the API had none.
    pub abstract_text: Option<String>,
    pub pub_year: Option<i32>,
    pub citations: u64,
    /// Set only on author-sourced rows.
    #[serde(default)]
    pub author: Option<ScholarName>,

    /// Abstract after boilerplate removal.
    #[serde(default)]
    pub abstract_clean: Option<String>,
    /// Filtered, normalised tokens.
    #[serde(default)]
    pub tokens: Vec<String>,
    /// `tokens` with detected phrases merged.
    #[serde(default)]
    pub tokens_with_phrases: Vec<String>,
    /// `tokens_with_phrases` joined by single spaces.
    #[serde(default)]
    pub token_string: String,
}

impl Publication {
    pub fn new(doi: impl Into<String>, title: impl Into<String>, journal: impl Into<String>) -> Self {
        Self {
            doi: doi.into(),
            title: title.into(),
            journal: journal.into(),
            abstract_text: None,
            pub_year: None,
            citations: 0,
            author: None,
            abstract_clean: None,
            tokens: Vec::new(),
            tokens_with_phrases: Vec::new(),
            token_string: String::new(),
        }
    }

    /// Category label for author comparisons ("First Last").
    pub fn full_name(&self) -> Option<String> {
        self.author.as_ref().map(ScholarName::full_name)
    }
}
