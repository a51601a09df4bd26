//! Vocabulary compaction by per-category association rank.

use std::collections::HashSet;

use tracing::debug;

use crate::corpus::TermCorpus;
use crate::scoring::{dense_rank, rank_difference};

/// Keeps the terms that rank best for at least one category.
///
/// Each term gets, per category, the dense rank of its rank-difference
/// score (1 = most associated). Terms are kept when their best rank across
/// categories is within the largest cutoff that keeps at most `max_terms`.
#[derive(Debug, Clone, Copy)]
pub struct AssociationCompactor {
    max_terms: usize,
}

impl AssociationCompactor {
    pub fn new(max_terms: usize) -> Self {
        Self { max_terms }
    }

    pub fn compact(&self, mut corpus: TermCorpus) -> TermCorpus {
        let before = corpus.num_terms();
        if before <= self.max_terms {
            return corpus;
        }

        let ranks = best_ranks(&corpus);
        let cutoff = self.cutoff_rank(&ranks);
        let keep: HashSet<String> = corpus
            .counts()
            .keys()
            .zip(&ranks)
            .filter(|(_, r)| **r <= cutoff)
            .map(|(t, _)| t.clone())
            .collect();
        corpus.retain_terms(&keep);
        debug!(before, after = corpus.num_terms(), cutoff, "Corpus compacted");
        corpus
    }

    /// Largest rank whose cumulative term count stays within `max_terms`;
    /// the best rank when even that overflows.
    fn cutoff_rank(&self, ranks: &[u64]) -> u64 {
        let mut sorted = ranks.to_vec();
        sorted.sort_unstable();
        let mut cutoff = sorted.first().copied().unwrap_or(1);
        let mut i = 0;
        while i < sorted.len() {
            let rank = sorted[i];
            let end = sorted.partition_point(|&r| r <= rank);
            if end > self.max_terms {
                break;
            }
            cutoff = rank;
            i = end;
        }
        cutoff
    }
}

/// Best (smallest) association rank of each term across categories, in
/// term order.
fn best_ranks(corpus: &TermCorpus) -> Vec<u64> {
    let n_terms = corpus.num_terms();
    let mut best = vec![u64::MAX; n_terms];
    for category in 0..corpus.categories().len() {
        let (inside, rest): (Vec<f64>, Vec<f64>) = corpus
            .counts()
            .values()
            .map(|per_cat| {
                let c = per_cat[category];
                let total: u64 = per_cat.iter().sum();
                (c as f64, (total - c) as f64)
            })
            .unzip();
        let scores = rank_difference(&inside, &rest);
        let negated: Vec<f64> = scores.iter().map(|s| -s).collect();
        for (b, r) in best.iter_mut().zip(dense_rank(&negated)) {
            *b = (*b).min(r as u64);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::LabeledText;

    fn corpus() -> TermCorpus {
        let a = "alpha alpha alpha beta beta gamma shared shared";
        let b = "delta delta delta epsilon epsilon zeta shared shared";
        TermCorpus::build([
            LabeledText { category: "A", text: a, metadata: None },
            LabeledText { category: "B", text: b, metadata: None },
        ])
    }

    #[test]
    fn test_small_corpus_untouched() {
        let c = corpus();
        let n = c.num_terms();
        assert_eq!(AssociationCompactor::new(n).compact(c).num_terms(), n);
    }

    #[test]
    fn test_keeps_top_terms_of_each_category() {
        let c = AssociationCompactor::new(2).compact(corpus());
        let kept: Vec<&String> = c.counts().keys().collect();
        assert_eq!(kept, vec!["alpha", "delta"]);
    }

    #[test]
    fn test_never_exceeds_max_terms_when_ranks_allow() {
        for max in [2, 4, 6] {
            let c = AssociationCompactor::new(max).compact(corpus());
            assert!(c.num_terms() <= max, "max {max} kept {}", c.num_terms());
        }
    }
}
