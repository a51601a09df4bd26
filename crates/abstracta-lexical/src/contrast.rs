//! One-category-versus-rest term association charts.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::corpus::TermCorpus;
use crate::error::{LexicalError, Result};
use crate::scoring::{average_rank, dense_rank, min_max_scale, scaled_f_score};

/// Chart width in pixels.
pub const CHART_WIDTH: u32 = 1000;
/// Example documents listed per term when metadata is attached.
const MAX_EXAMPLES: usize = 3;
/// Characteristic terms listed per side.
const TOP_TERMS: usize = 20;

/// Scaling of raw frequencies onto chart axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transform {
    #[default]
    DenseRank,
    Percentile,
}

impl Transform {
    fn apply(&self, values: &[f64]) -> Vec<f64> {
        match self {
            Transform::DenseRank => min_max_scale(&dense_rank(values)),
            Transform::Percentile => min_max_scale(&average_rank(values)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContrastSpec {
    /// Category value in the corpus.
    pub category: String,
    pub category_name: String,
    pub not_category_name: String,
    pub minimum_term_frequency: u64,
    /// Bigrams whose log2 PMI falls below twice this value are dropped.
    pub pmi_filter_threshold: f64,
    pub transform: Transform,
    pub left_caption: String,
    pub right_caption: String,
    /// Attach example document metadata to each term.
    pub with_metadata: bool,
}

impl ContrastSpec {
    /// One-vs-rest spec with "Less like X" / "More like X" captions.
    pub fn one_vs_rest(category: &str, not_category_name: &str, minimum_term_frequency: u64, pmi_filter_threshold: f64) -> Self {
        Self {
            category: category.to_string(),
            category_name: category.to_string(),
            not_category_name: not_category_name.to_string(),
            minimum_term_frequency,
            pmi_filter_threshold,
            transform: Transform::DenseRank,
            left_caption: format!("Less like {category}"),
            right_caption: format!("More like {category}"),
            with_metadata: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TermPoint {
    pub term: String,
    pub category_count: u64,
    pub other_count: u64,
    /// Scaled frequency outside the category.
    pub x: f64,
    /// Scaled frequency inside the category.
    pub y: f64,
    /// Scaled F-score in [-1, 1].
    pub score: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContrastChart {
    pub category_name: String,
    pub not_category_name: String,
    pub left_caption: String,
    pub right_caption: String,
    pub width: u32,
    pub category_documents: usize,
    pub other_documents: usize,
    /// Sorted by descending score.
    pub points: Vec<TermPoint>,
    pub top_category_terms: Vec<String>,
    pub top_other_terms: Vec<String>,
}

/// Score every sufficiently frequent term of `corpus` for `spec.category`
/// against all other categories.
pub fn build_contrast(corpus: &TermCorpus, spec: &ContrastSpec) -> Result<ContrastChart> {
    let category = corpus
        .category_index(&spec.category)
        .ok_or_else(|| LexicalError::UnknownCategory(spec.category.clone()))?;

    let frequent: Vec<(&str, u64, u64)> = corpus
        .counts()
        .keys()
        .map(|term| {
            let (inside, outside) = corpus.category_vs_rest(term, category);
            (term.as_str(), inside, outside)
        })
        .filter(|(_, i, o)| i + o >= spec.minimum_term_frequency)
        .collect();
    let terms = filter_bigrams_by_pmi(frequent, spec.pmi_filter_threshold);

    let inside: Vec<f64> = terms.iter().map(|t| t.1 as f64).collect();
    let outside: Vec<f64> = terms.iter().map(|t| t.2 as f64).collect();
    let scores = scaled_f_score(&inside, &outside, 1.0);
    let xs = spec.transform.apply(&outside);
    let ys = spec.transform.apply(&inside);

    let examples = if spec.with_metadata {
        example_metadata(corpus, category)
    } else {
        HashMap::new()
    };

    let mut points: Vec<TermPoint> = terms
        .iter()
        .enumerate()
        .map(|(i, &(term, c, o))| TermPoint {
            term: term.to_string(),
            category_count: c,
            other_count: o,
            x: xs[i],
            y: ys[i],
            score: scores[i],
            examples: examples.get(term).cloned().unwrap_or_default(),
        })
        .collect();
    points.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.term.cmp(&b.term)));

    let top_category_terms = points
        .iter()
        .filter(|p| p.score > 0.0)
        .take(TOP_TERMS)
        .map(|p| p.term.clone())
        .collect();
    let top_other_terms = points
        .iter()
        .rev()
        .filter(|p| p.score < 0.0)
        .take(TOP_TERMS)
        .map(|p| p.term.clone())
        .collect();

    let (category_documents, other_documents) = corpus.document_split(category);
    debug!(category = %spec.category, terms = points.len(), "Contrast built");

    Ok(ContrastChart {
        category_name: spec.category_name.clone(),
        not_category_name: spec.not_category_name.clone(),
        left_caption: spec.left_caption.clone(),
        right_caption: spec.right_caption.clone(),
        width: CHART_WIDTH,
        category_documents,
        other_documents,
        points,
        top_category_terms,
        top_other_terms,
    })
}

/// Drop bigrams ("a b") whose pointwise mutual information, in bits, is
/// below `2 * threshold`. Bigrams with an unknown component count as
/// zero PMI. A non-positive threshold disables the filter.
fn filter_bigrams_by_pmi(terms: Vec<(&str, u64, u64)>, threshold: f64) -> Vec<(&str, u64, u64)> {
    if threshold <= 0.0 {
        return terms;
    }
    let is_bigram = |t: &str| t.contains(' ');
    let unigram_total: u64 = terms.iter().filter(|t| !is_bigram(t.0)).map(|t| t.1 + t.2).sum();
    let bigram_total: u64 = terms.iter().filter(|t| is_bigram(t.0)).map(|t| t.1 + t.2).sum();
    let unigram_prob: HashMap<&str, f64> = terms
        .iter()
        .filter(|t| !is_bigram(t.0))
        .map(|t| (t.0, (t.1 + t.2) as f64 / unigram_total as f64))
        .collect();

    let pmi = |bigram: &str, count: u64| -> f64 {
        let Some((a, b)) = bigram.split_once(' ') else { return 0.0 };
        match (unigram_prob.get(a), unigram_prob.get(b)) {
            (Some(pa), Some(pb)) => {
                let p_ab = count as f64 / bigram_total as f64;
                (p_ab / (pa * pb)).log2()
            }
            _ => 0.0,
        }
    };

    let cutoff = threshold * 2.0;
    terms
        .iter()
        .filter(|t| !is_bigram(t.0) || pmi(t.0, t.1 + t.2) >= cutoff)
        .copied()
        .collect()
}

/// Term → metadata of up to MAX_EXAMPLES category documents containing it.
fn example_metadata(corpus: &TermCorpus, category: usize) -> HashMap<&str, Vec<String>> {
    let mut out: HashMap<&str, Vec<String>> = HashMap::new();
    for doc in corpus.documents().iter().filter(|d| d.category == category) {
        let Some(meta) = doc.metadata.as_deref() else { continue };
        for term in &doc.terms {
            let list = out.entry(term.as_str()).or_default();
            if list.len() < MAX_EXAMPLES {
                list.push(meta.to_string());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::LabeledText;
    use pretty_assertions::assert_eq;

    fn corpus() -> TermCorpus {
        TermCorpus::build([
            LabeledText { category: "Ada", text: "venture capital venture capital growth", metadata: Some("VC paper") },
            LabeledText { category: "Ada", text: "venture capital exit", metadata: Some("Exit paper") },
            LabeledText { category: "Grace", text: "team identity team growth", metadata: Some("Team paper") },
        ])
    }

    #[test]
    fn test_one_vs_rest_scores_and_captions() {
        let spec = ContrastSpec::one_vs_rest("Ada", "Other Authors", 1, 0.0);
        let chart = build_contrast(&corpus(), &spec).unwrap();
        assert_eq!(chart.left_caption, "Less like Ada");
        assert_eq!(chart.right_caption, "More like Ada");
        assert_eq!((chart.category_documents, chart.other_documents), (2, 1));
        assert_eq!(chart.width, 1000);

        let venture = chart.points.iter().find(|p| p.term == "venture").unwrap();
        let team = chart.points.iter().find(|p| p.term == "team").unwrap();
        assert!(venture.score > 0.0);
        assert!(team.score < 0.0);
        assert!(chart.top_category_terms.contains(&"venture".to_string()));
        assert!(chart.top_other_terms.contains(&"team".to_string()));
        assert!(chart.points.iter().all(|p| (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y)));
    }

    #[test]
    fn test_minimum_term_frequency() {
        let spec = ContrastSpec::one_vs_rest("Ada", "Other Authors", 3, 0.0);
        let chart = build_contrast(&corpus(), &spec).unwrap();
        let mut terms: Vec<&str> = chart.points.iter().map(|p| p.term.as_str()).collect();
        terms.sort();
        assert_eq!(terms, vec!["capital", "venture", "venture capital"]);
    }

    #[test]
    fn test_pmi_filter_drops_weak_bigrams() {
        let spec = ContrastSpec::one_vs_rest("Ada", "Other Authors", 1, 4.0);
        let chart = build_contrast(&corpus(), &spec).unwrap();
        assert!(chart.points.iter().all(|p| !p.term.contains(' ')));
        assert!(chart.points.iter().any(|p| p.term == "growth"));
    }

    #[test]
    fn test_metadata_examples_attached() {
        let mut spec = ContrastSpec::one_vs_rest("Ada", "Other Authors", 1, 0.0);
        spec.with_metadata = true;
        let chart = build_contrast(&corpus(), &spec).unwrap();
        let venture = chart.points.iter().find(|p| p.term == "venture").unwrap();
        assert_eq!(venture.examples, vec!["VC paper", "Exit paper"]);
        let team = chart.points.iter().find(|p| p.term == "team").unwrap();
        assert!(team.examples.is_empty());
    }

    #[test]
    fn test_unknown_category() {
        let spec = ContrastSpec::one_vs_rest("Nobody", "Other Authors", 1, 0.0);
        assert!(matches!(build_contrast(&corpus(), &spec), Err(LexicalError::UnknownCategory(_))));
    }
}
