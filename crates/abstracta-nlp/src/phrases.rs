//! Bigram collocation model.
//!
//! Scoring follows the classic Mikolov et al. phrase score:
//!
//! ```text
//! score(a, b) = (count(a b) - min_count) / (count(a) * count(b)) * |vocab|
//! ```
//!
//! where `|vocab|` counts distinct unigrams and bigrams. Adjacent pairs
//! scoring above `threshold` are merged left to right into `a_b`.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;

pub const PHRASE_DELIMITER: char = '_';

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseModel {
    pub min_count: u64,
    pub threshold: f64,
    unigrams: HashMap<String, u64>,
    /// Keyed by "a b"; tokens never contain spaces.
    bigrams: HashMap<String, u64>,
}

impl PhraseModel {
    /// Count unigrams and adjacent bigrams over a tokenised corpus.
    pub fn fit<D: AsRef<[String]>>(documents: &[D], min_count: u64, threshold: f64) -> Self {
        let mut unigrams: HashMap<String, u64> = HashMap::new();
        let mut bigrams: HashMap<String, u64> = HashMap::new();

        for doc in documents {
            let doc = doc.as_ref();
            for token in doc {
                *unigrams.entry(token.clone()).or_default() += 1;
            }
            for pair in doc.windows(2) {
                *bigrams.entry(bigram_key(&pair[0], &pair[1])).or_default() += 1;
            }
        }

        let model = Self {
            min_count,
            threshold,
            unigrams,
            bigrams,
        };
        info!(
            documents = documents.len(),
            vocab = model.vocab_len(),
            phrases = model.phrase_count(),
            "Phrase model fitted"
        );
        model
    }

    pub fn vocab_len(&self) -> usize {
        self.unigrams.len() + self.bigrams.len()
    }

    /// Score of the pair `(a, b)`, or `None` if it was never seen.
    pub fn score(&self, a: &str, b: &str) -> Option<f64> {
        let ab = *self.bigrams.get(&bigram_key(a, b))?;
        let ca = *self.unigrams.get(a)?;
        let cb = *self.unigrams.get(b)?;
        let vocab = self.vocab_len() as f64;
        Some((ab as f64 - self.min_count as f64) / (ca as f64 * cb as f64) * vocab)
    }

    fn is_phrase(&self, a: &str, b: &str) -> bool {
        self.score(a, b).is_some_and(|s| s > self.threshold)
    }

    /// Number of distinct bigrams that would be merged.
    pub fn phrase_count(&self) -> usize {
        self.bigrams
            .keys()
            .filter(|k| {
                k.split_once(' ')
                    .is_some_and(|(a, b)| self.is_phrase(a, b))
            })
            .count()
    }

    /// Merge qualifying adjacent pairs, scanning greedily left to right.
    pub fn apply(&self, tokens: &[String]) -> Vec<String> {
        let mut out = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            if i + 1 < tokens.len() && self.is_phrase(&tokens[i], &tokens[i + 1]) {
                out.push(format!("{}{}{}", tokens[i], PHRASE_DELIMITER, tokens[i + 1]));
                i += 2;
            } else {
                out.push(tokens[i].clone());
                i += 1;
            }
        }
        out
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        serde_json::to_writer(BufWriter::new(File::create(path)?), self)?;
        debug!(path = %path.display(), "Phrase model saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let model = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        Ok(model)
    }
}

fn bigram_key(a: &str, b: &str) -> String {
    format!("{a} {b}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn docs(raw: &[&str]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|d| d.split_whitespace().map(String::from).collect())
            .collect()
    }

    fn corpus() -> Vec<Vec<String>> {
        let mut raw = vec!["venture capital investment firm"; 5];
        raw.extend([
            "firm growth strategy",
            "growth market entry",
            "strategy team founder",
            "founder identity market",
            "team identity strategy",
        ]);
        docs(&raw)
    }

    #[test]
    fn test_score_formula_and_threshold() {
        let model = PhraseModel::fit(&corpus(), 3, 10.0);
        // 11 unigrams + 13 bigrams
        assert_eq!(model.vocab_len(), 24);
        // venture/capital: 5 joint, 5 each
        let score = model.score("venture", "capital").unwrap();
        assert!((score - (5.0 - 3.0) / 25.0 * 24.0).abs() < 1e-9);
        assert!(!model.is_phrase("venture", "capital"));

        let loose = PhraseModel::fit(&corpus(), 3, 1.0);
        assert!(loose.is_phrase("venture", "capital"));
        assert!(!loose.is_phrase("firm", "growth"), "below min_count");
    }

    #[test]
    fn test_apply_merges_left_to_right() {
        let model = PhraseModel::fit(&corpus(), 1, 0.5);
        let merged = model.apply(&docs(&["venture capital investment"])[0]);
        assert_eq!(merged, vec!["venture_capital", "investment"]);
    }

    #[test]
    fn test_unseen_pairs_untouched() {
        let model = PhraseModel::fit(&corpus(), 3, 10.0);
        let tokens = docs(&["founder venture market"])[0].clone();
        assert_eq!(model.apply(&tokens), tokens);
        assert_eq!(model.score("founder", "venture"), None);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phrases.json");
        let model = PhraseModel::fit(&corpus(), 3, 10.0);
        model.save(&path).unwrap();
        assert_eq!(PhraseModel::load(&path).unwrap(), model);
    }
}
