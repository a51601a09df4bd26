//! Semantic indexing stage: build (or reuse) the vector store, summarise
//! journals as centroids, smoke-check, and plot the t-SNE projection.

use std::collections::BTreeMap;
use std::path::PathBuf;

use abstracta_common::settings::EmbeddingSettings;
use abstracta_common::{AbstractaError, DataStore, OnExisting, Publication, Settings};
use tracing::{debug, info, instrument};

use crate::batch::{array_split, partition_count};
use crate::client::Embedder;
use crate::error::{EmbedError, Result};
use crate::plot::{write_tsne_scatter, TsnePoint};
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::similarity::journal_centroids;
use crate::smoke::{smoke_check, ProbeResult};
use crate::store::{DocumentIndex, IndexedDocument, LanceIndex};
use crate::tsne::Tsne;

#[derive(Debug)]
pub struct IndexingReport {
    /// False when an existing store was reused as-is.
    pub built: bool,
    pub documents: usize,
    pub centroids: BTreeMap<String, Vec<f32>>,
    pub probes: Vec<ProbeResult>,
    pub scatterplot: PathBuf,
}

/// Text embedded for a row: the cleaned abstract, else the raw one.
fn row_text(row: &Publication) -> Option<&str> {
    row.abstract_clean
        .as_deref()
        .or(row.abstract_text.as_deref())
        .filter(|t| !t.trim().is_empty())
}

/// Embed and store `rows` in partitions of roughly `chunk_size` rows. Each
/// partition is embedded and inserted as a unit and retried as a unit on
/// transient service errors. Rows without abstract text are skipped.
#[instrument(skip_all, fields(rows = rows.len()))]
pub async fn build_index<E, I>(embedder: &E, index: &I, rows: &[Publication], cfg: &EmbeddingSettings) -> Result<usize>
where
    E: Embedder + ?Sized,
    I: DocumentIndex + ?Sized,
{
    let usable: Vec<(&Publication, &str)> = rows.iter().filter_map(|r| row_text(r).map(|t| (r, t))).collect();
    if usable.len() < rows.len() {
        debug!(skipped = rows.len() - usable.len(), "Rows without abstract text skipped");
    }

    let policy = RetryPolicy::from_settings(cfg);
    let partitions = array_split(&usable, partition_count(usable.len(), cfg.chunk_size));
    let total = partitions.len();
    let mut stored = 0;

    for (i, partition) in partitions.into_iter().enumerate() {
        if partition.is_empty() {
            continue;
        }
        retry_with_backoff(policy, "Adding documents to the vector store", move || async move {
            let texts: Vec<String> = partition.iter().map(|(_, t)| t.to_string()).collect();
            let vectors = embedder.embed_batch(&texts).await?;
            let docs: Vec<IndexedDocument> = partition
                .iter()
                .zip(vectors)
                .map(|((row, text), embedding)| IndexedDocument {
                    doi: row.doi.clone(),
                    title: row.title.clone(),
                    journal: row.journal.clone(),
                    text: text.to_string(),
                    embedding,
                })
                .collect();
            index.add_documents(&docs).await
        })
        .await?;
        stored += partition.len();
        info!(partition = i + 1, of = total, stored, "Documents added to vector store");
    }
    Ok(stored)
}

/// Open the vector store under the configured policy. The flag says
/// whether the store must be (re)built.
pub async fn open_index(settings: &Settings) -> Result<(LanceIndex, bool)> {
    let path = settings.vector_store_dir();
    let exists = path.exists();
    match settings.paths.vector_store_on_existing {
        _ if !exists => Ok((LanceIndex::open(&path).await?, true)),
        OnExisting::Overwrite => Ok((LanceIndex::reset(&path).await?, true)),
        OnExisting::Reuse => {
            let index = LanceIndex::open(&path).await?;
            let stored = index.count().await?;
            info!(path = %path.display(), stored, "Loading existing vector store");
            Ok((index, stored == 0))
        }
        OnExisting::Fail => Err(AbstractaError::AlreadyExists(path.display().to_string()).into()),
    }
}

/// Everything after the store is populated: centroids, smoke check and
/// the t-SNE scatterplot.
pub async fn summarise_index<E, I>(settings: &Settings, embedder: &E, index: &I, built: bool) -> Result<IndexingReport>
where
    E: Embedder + ?Sized,
    I: DocumentIndex + ?Sized,
{
    let docs = index.all().await?;
    if docs.is_empty() {
        return Err(EmbedError::EmptyIndex(settings.vector_store_dir()));
    }

    let centroids = journal_centroids(&docs);
    info!(journals = centroids.len(), documents = docs.len(), "Journal summary embeddings computed");

    let probes = smoke_check(embedder, index, &centroids, &settings.embedding).await?;

    let vectors: Vec<Vec<f32>> = docs.iter().map(|d| d.embedding.clone()).collect();
    let coords = Tsne::from_settings(&settings.tsne).fit(&vectors);
    let points = TsnePoint::from_projection(&docs, &coords);
    let scatterplot = write_tsne_scatter(&points, &settings.paths.output_dir)?;

    info!(documents = docs.len(), path = %scatterplot.display(), "Semantic indexing complete");
    Ok(IndexingReport {
        built,
        documents: docs.len(),
        centroids,
        probes,
        scatterplot,
    })
}

/// Run the whole stage against the on-disk store and journal table.
pub async fn run_indexing<E>(settings: &Settings, embedder: &E) -> Result<IndexingReport>
where
    E: Embedder + ?Sized,
{
    let (index, built) = open_index(settings).await?;
    embedder.is_ready().await?;

    if built {
        let journals = DataStore::from_settings(settings).load_journal_table()?;
        info!(rows = journals.len(), "Creating vector store");
        build_index(embedder, &index, &journals, &settings.embedding).await?;
    }

    summarise_index(settings, embedder, &index, built).await
}
