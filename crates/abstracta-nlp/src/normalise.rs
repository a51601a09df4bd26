//! Abstract-level cleaning: title exclusion, boilerplate removal and
//! usability checks.

use abstracta_common::Publication;
use regex::Regex;
use tracing::debug;

use crate::error::{NlpError, Result};

/// Ordered list of non-content patterns (copyright notices, structured
/// abstract headings, publisher boilerplate) removed from every abstract.
#[derive(Debug, Clone, Default)]
pub struct BoilerplateFilter {
    patterns: Vec<Regex>,
}

impl BoilerplateFilter {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|source| NlpError::Pattern {
                    pattern: p.as_ref().to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Replace every match of every pattern, in order, with nothing.
    pub fn apply(&self, text: &str) -> String {
        let mut out = text.to_string();
        for re in &self.patterns {
            if re.is_match(&out) {
                out = re.replace_all(&out, "").into_owned();
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// False for absent abstracts, the literal "none" and blank text.
pub fn is_usable_abstract(text: Option<&str>) -> bool {
    match text {
        None => false,
        Some(t) => {
            let t = t.trim();
            !t.is_empty() && !t.eq_ignore_ascii_case("none")
        }
    }
}

/// Drop rows whose title contains any of `terms`, case-insensitively.
pub fn drop_excluded_titles(rows: Vec<Publication>, terms: &[String]) -> Vec<Publication> {
    let terms: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();
    let before = rows.len();
    let kept: Vec<Publication> = rows
        .into_iter()
        .filter(|r| {
            let title = r.title.to_lowercase();
            !terms.iter().any(|t| title.contains(t.as_str()))
        })
        .collect();
    debug!(dropped = before - kept.len(), "Excluded titles removed");
    kept
}
