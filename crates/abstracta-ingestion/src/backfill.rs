//! Backfill of missing abstracts from a supplementary (title, abstract)
//! table, e.g. a bibliographic-database export.

use std::collections::HashMap;
use std::path::Path;

use abstracta_common::Publication;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::jats::strip_markup;

#[derive(Debug, Deserialize)]
struct SupplementaryRow {
    #[serde(alias = "Title")]
    title: String,
    #[serde(rename = "abstract", alias = "Abstract", default)]
    abstract_text: Option<String>,
}

/// Title → abstract lookup; the first row for a title wins.
#[derive(Debug, Default)]
pub struct SupplementaryAbstracts {
    by_title: HashMap<String, String>,
}

impl SupplementaryAbstracts {
    /// Read a CSV with `title` and `abstract` columns. Other columns are
    /// ignored; rows without an abstract are skipped.
    pub fn from_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
        let mut by_title = HashMap::new();
        for row in reader.deserialize::<SupplementaryRow>() {
            let row = row?;
            if let Some(text) = row.abstract_text.as_deref().and_then(strip_markup) {
                by_title.entry(row.title).or_insert(text);
            }
        }
        debug!(path = %path.display(), rows = by_title.len(), "Supplementary table loaded");
        Ok(Self { by_title })
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let mut by_title = HashMap::new();
        for (title, text) in pairs {
            by_title.entry(title.into()).or_insert_with(|| text.into());
        }
        Self { by_title }
    }

    pub fn len(&self) -> usize {
        self.by_title.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_title.is_empty()
    }

    pub fn get(&self, title: &str) -> Option<&str> {
        self.by_title.get(title).map(String::as_str)
    }
}

/// Fill absent abstracts by exact title match. Existing abstracts are never
/// replaced. Returns the number of rows filled.
pub fn backfill_abstracts(rows: &mut [Publication], supplementary: &SupplementaryAbstracts) -> usize {
    let mut filled = 0;
    for row in rows.iter_mut().filter(|r| r.abstract_text.is_none()) {
        if let Some(text) = supplementary.get(&row.title) {
            row.abstract_text = Some(text.to_string());
            filled += 1;
        }
    }
    info!(filled, rows = rows.len(), "Abstracts backfilled from supplementary table");
    filled
}
