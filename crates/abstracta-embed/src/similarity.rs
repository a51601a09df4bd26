//! Cosine similarity and per-journal centroids.

use std::collections::BTreeMap;

use crate::store::IndexedDocument;

/// Cosine similarity in [-1, 1], accumulated in f64. Zero when either
/// vector has no magnitude or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }
    let (mut dot, mut na, mut nb) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    (dot / (na.sqrt() * nb.sqrt())).clamp(-1.0, 1.0)
}

/// Elementwise mean embedding per journal, keyed by journal name.
pub fn journal_centroids(docs: &[IndexedDocument]) -> BTreeMap<String, Vec<f32>> {
    let mut sums: BTreeMap<&str, (Vec<f64>, usize)> = BTreeMap::new();
    for doc in docs {
        let (sum, n) = sums
            .entry(doc.journal.as_str())
            .or_insert_with(|| (vec![0.0; doc.embedding.len()], 0));
        if sum.len() != doc.embedding.len() {
            continue;
        }
        for (s, &v) in sum.iter_mut().zip(&doc.embedding) {
            *s += f64::from(v);
        }
        *n += 1;
    }

    sums.into_iter()
        .map(|(journal, (sum, n))| {
            let mean = sum.iter().map(|s| (s / n as f64) as f32).collect();
            (journal.to_string(), mean)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(journal: &str, embedding: Vec<f32>) -> IndexedDocument {
        IndexedDocument {
            doi: String::new(),
            title: String::new(),
            journal: journal.into(),
            text: String::new(),
            embedding,
        }
    }

    #[test]
    fn test_self_similarity_is_one() {
        let v = [0.3f32, -1.2, 4.0, 0.01];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_orthogonal_is_zero() {
        assert!(cosine_similarity(&[1.0, 0.0, 0.0], &[0.0, 2.5, 0.0]).abs() < 1e-12);
        assert!((cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_centroids_are_means_per_journal() {
        let docs = vec![
            doc("Journal of Business Venturing", vec![1.0, 0.0]),
            doc("Small Business Economics", vec![0.0, 4.0]),
            doc("Journal of Business Venturing", vec![3.0, 2.0]),
        ];
        let c = journal_centroids(&docs);
        assert_eq!(c.len(), 2);
        assert_eq!(c["Journal of Business Venturing"], vec![2.0, 1.0]);
        assert_eq!(c["Small Business Economics"], vec![0.0, 4.0]);
    }
}
