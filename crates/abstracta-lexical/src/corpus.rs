//! Term-frequency corpus partitioned by category.
//!
//! Documents are whitespace-tokenised; each document contributes its
//! unigrams and its adjacent bigrams ("a b") as terms.

use std::collections::{BTreeMap, BTreeSet, HashSet};

/// One input document.
#[derive(Debug, Clone, Copy)]
pub struct LabeledText<'a> {
    pub category: &'a str,
    pub text: &'a str,
    /// Shown next to example documents in charts (e.g. the title).
    pub metadata: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct CorpusDocument {
    pub category: usize,
    pub metadata: Option<String>,
    /// Distinct terms in the document.
    pub terms: BTreeSet<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TermCorpus {
    categories: Vec<String>,
    documents: Vec<CorpusDocument>,
    /// term → count per category, indexed like `categories`.
    counts: BTreeMap<String, Vec<u64>>,
}

impl TermCorpus {
    /// Categories are numbered in first-seen order.
    pub fn build<'a, I>(docs: I) -> Self
    where
        I: IntoIterator<Item = LabeledText<'a>>,
    {
        let mut corpus = TermCorpus::default();
        let mut doc_terms: Vec<(usize, Vec<String>)> = Vec::new();

        for doc in docs {
            let category = corpus.intern_category(doc.category);
            let tokens: Vec<&str> = doc.text.split_whitespace().collect();
            let mut terms: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
            terms.extend(tokens.windows(2).map(|w| format!("{} {}", w[0], w[1])));

            corpus.documents.push(CorpusDocument {
                category,
                metadata: doc.metadata.map(str::to_string),
                terms: terms.iter().cloned().collect(),
            });
            doc_terms.push((category, terms));
        }

        let n = corpus.categories.len();
        for (category, terms) in doc_terms {
            for term in terms {
                corpus.counts.entry(term).or_insert_with(|| vec![0; n])[category] += 1;
            }
        }
        corpus
    }

    fn intern_category(&mut self, name: &str) -> usize {
        match self.categories.iter().position(|c| c == name) {
            Some(i) => i,
            None => {
                self.categories.push(name.to_string());
                self.categories.len() - 1
            }
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn category_index(&self, name: &str) -> Option<usize> {
        self.categories.iter().position(|c| c == name)
    }

    pub fn documents(&self) -> &[CorpusDocument] {
        &self.documents
    }

    pub fn num_terms(&self) -> usize {
        self.counts.len()
    }

    pub fn counts(&self) -> &BTreeMap<String, Vec<u64>> {
        &self.counts
    }

    /// (count in `category`, count in every other category) for `term`.
    pub fn category_vs_rest(&self, term: &str, category: usize) -> (u64, u64) {
        match self.counts.get(term) {
            Some(per_cat) => {
                let inside = per_cat.get(category).copied().unwrap_or(0);
                (inside, per_cat.iter().sum::<u64>() - inside)
            }
            None => (0, 0),
        }
    }

    /// Document counts inside and outside `category`.
    pub fn document_split(&self, category: usize) -> (usize, usize) {
        let inside = self.documents.iter().filter(|d| d.category == category).count();
        (inside, self.documents.len() - inside)
    }

    /// Drop every term not in `keep` from the counts and from documents.
    pub fn retain_terms(&mut self, keep: &HashSet<String>) {
        self.counts.retain(|term, _| keep.contains(term));
        for doc in &mut self.documents {
            doc.terms.retain(|t| keep.contains(t));
        }
    }
}
