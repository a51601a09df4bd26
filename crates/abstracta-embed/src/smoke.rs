//! Smoke check of a built index: embed the configured test abstracts and
//! test query, compare them against the journal centroids and list their
//! nearest stored articles.

use std::collections::BTreeMap;

use abstracta_common::settings::EmbeddingSettings;
use tracing::info;

use crate::client::Embedder;
use crate::error::Result;
use crate::similarity::cosine_similarity;
use crate::store::DocumentIndex;

const PREVIEW_CHARS: usize = 500;
const HEAD_COMPONENTS: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct Neighbour {
    pub title: String,
    pub journal: String,
    pub similarity: f64,
}

/// What one probe text looked like against the index.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    /// Field name for a test abstract, "query" for the test query.
    pub label: String,
    /// First 500 characters, with "..." appended when cut.
    pub preview: String,
    /// First 50 components rounded to two decimals.
    pub head: Vec<f64>,
    /// Cosine similarity to each journal centroid, in journal order.
    pub centroid_similarity: Vec<(String, f64)>,
    pub neighbours: Vec<Neighbour>,
}

pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

pub fn rounded_head(embedding: &[f32]) -> Vec<f64> {
    embedding
        .iter()
        .take(HEAD_COMPONENTS)
        .map(|&x| (f64::from(x) * 100.0).round() / 100.0)
        .collect()
}

/// Embed `text` and compare it against the centroids and the index.
pub async fn probe<E, I>(
    embedder: &E,
    index: &I,
    centroids: &BTreeMap<String, Vec<f32>>,
    label: &str,
    text: &str,
    k: usize,
) -> Result<ProbeResult>
where
    E: Embedder + ?Sized,
    I: DocumentIndex + ?Sized,
{
    let embedding = embedder.embed(text).await?;
    let centroid_similarity = centroids
        .iter()
        .map(|(journal, c)| (journal.clone(), cosine_similarity(&embedding, c)))
        .collect();
    let neighbours = index
        .nearest(&embedding, k)
        .await?
        .into_iter()
        .map(|doc| Neighbour {
            similarity: cosine_similarity(&embedding, &doc.embedding),
            title: doc.title,
            journal: doc.journal,
        })
        .collect();

    Ok(ProbeResult {
        label: label.to_string(),
        preview: preview(text),
        head: rounded_head(&embedding),
        centroid_similarity,
        neighbours,
    })
}

fn log_probe(r: &ProbeResult) {
    info!(label = %r.label, preview = %r.preview, "Smoke check text");
    info!(label = %r.label, head = ?r.head, "Embedding vector (first components)");
    for (rank, (journal, sim)) in r.centroid_similarity.iter().enumerate() {
        info!(label = %r.label, rank = rank + 1, journal = %journal, similarity = format_args!("{sim:.4}"), "Centroid similarity");
    }
    for (rank, n) in r.neighbours.iter().enumerate() {
        info!(label = %r.label, rank = rank + 1, title = %n.title, journal = %n.journal, similarity = format_args!("{:.4}", n.similarity), "Similar article");
    }
}

/// Probe every configured test abstract, then the test query (if any),
/// logging each result.
pub async fn smoke_check<E, I>(
    embedder: &E,
    index: &I,
    centroids: &BTreeMap<String, Vec<f32>>,
    cfg: &EmbeddingSettings,
) -> Result<Vec<ProbeResult>>
where
    E: Embedder + ?Sized,
    I: DocumentIndex + ?Sized,
{
    let mut results = Vec::new();
    for t in &cfg.test_abstracts {
        let r = probe(embedder, index, centroids, &t.field, &t.text, cfg.top_k).await?;
        log_probe(&r);
        results.push(r);
    }
    if let Some(query) = cfg.test_query.as_deref() {
        let r = probe(embedder, index, centroids, "query", query, cfg.top_k).await?;
        log_probe(&r);
        results.push(r);
    }
    Ok(results)
}
