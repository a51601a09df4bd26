//! Persistent vector store of journal abstracts.
//!
//! One LanceDB table, `journal_embeddings`, holding the abstract text, its
//! bibliographic metadata and its embedding. The table is created on the
//! first insert, since the embedding width is only known once the model
//! has answered.

use std::path::Path;
use std::sync::Arc;

use arrow_array::{Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray};
use arrow_schema::{DataType, Field, Schema};
use async_trait::async_trait;
use futures::StreamExt;
use lancedb::connection::Connection;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::Table;
use tracing::{debug, info, instrument};

use crate::error::{EmbedError, Result};

pub const TABLE_JOURNAL_EMBEDDINGS: &str = "journal_embeddings";

/// One stored abstract.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedDocument {
    pub doi: String,
    pub title: String,
    pub journal: String,
    /// Cleaned abstract the embedding was computed from.
    pub text: String,
    pub embedding: Vec<f32>,
}

#[async_trait]
pub trait DocumentIndex: Send + Sync {
    async fn add_documents(&self, docs: &[IndexedDocument]) -> Result<()>;

    /// The `k` stored documents closest to `query`, nearest first.
    async fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<IndexedDocument>>;

    /// Every stored document.
    async fn all(&self) -> Result<Vec<IndexedDocument>>;

    async fn count(&self) -> Result<usize>;
}

#[async_trait]
impl<T: DocumentIndex + ?Sized> DocumentIndex for Arc<T> {
    async fn add_documents(&self, docs: &[IndexedDocument]) -> Result<()> {
        (**self).add_documents(docs).await
    }
    async fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<IndexedDocument>> {
        (**self).nearest(query, k).await
    }
    async fn all(&self) -> Result<Vec<IndexedDocument>> {
        (**self).all().await
    }
    async fn count(&self) -> Result<usize> {
        (**self).count().await
    }
}

// ── LanceDB ───────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct LanceIndex {
    conn: Connection,
}

impl LanceIndex {
    /// Open (or create) the store directory as-is.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            std::fs::create_dir_all(&path)?;
        }
        let conn = lancedb::connect(&path.to_string_lossy()).execute().await?;
        Ok(Self { conn })
    }

    /// Delete whatever is stored at `path` and open an empty store.
    pub async fn reset(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            info!(path = %path.display(), "Resetting vector store");
            std::fs::remove_dir_all(path)?;
        }
        Self::open(path).await
    }

    async fn table(&self) -> Result<Option<Table>> {
        let names = self.conn.table_names().execute().await?;
        if !names.iter().any(|n| n == TABLE_JOURNAL_EMBEDDINGS) {
            return Ok(None);
        }
        let table = self.conn.open_table(TABLE_JOURNAL_EMBEDDINGS).execute().await?;
        Ok(Some(table))
    }

    async fn collect(mut stream: lancedb::arrow::SendableRecordBatchStream) -> Result<Vec<IndexedDocument>> {
        let mut docs = Vec::new();
        while let Some(batch) = stream.next().await {
            docs.extend(records_to_documents(&batch?)?);
        }
        Ok(docs)
    }
}

#[async_trait]
impl DocumentIndex for LanceIndex {
    #[instrument(skip(self, docs), fields(n = docs.len()))]
    async fn add_documents(&self, docs: &[IndexedDocument]) -> Result<()> {
        if docs.is_empty() {
            return Ok(());
        }
        let batch = documents_to_record(docs)?;
        let schema = batch.schema();
        let iter = RecordBatchIterator::new(vec![Ok(batch)], schema);

        match self.table().await? {
            Some(table) => {
                let expected = embedding_width(&*table.schema().await?);
                let actual = docs[0].embedding.len();
                if let Some(expected) = expected.filter(|&w| w != actual) {
                    return Err(EmbedError::InvalidEmbeddingDimension { expected, actual });
                }
                table.add(iter).execute().await?;
            }
            None => {
                self.conn
                    .create_table(TABLE_JOURNAL_EMBEDDINGS, iter)
                    .execute()
                    .await?;
                debug!(dim = docs[0].embedding.len(), "Created vector table");
            }
        }
        Ok(())
    }

    async fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<IndexedDocument>> {
        let Some(table) = self.table().await? else {
            return Ok(Vec::new());
        };
        let stream = table.vector_search(query.to_vec())?.limit(k).execute().await?;
        Self::collect(stream).await
    }

    async fn all(&self) -> Result<Vec<IndexedDocument>> {
        let Some(table) = self.table().await? else {
            return Ok(Vec::new());
        };
        let rows = table.count_rows(None).await?;
        if rows == 0 {
            return Ok(Vec::new());
        }
        let stream = table.query().limit(rows).execute().await?;
        Self::collect(stream).await
    }

    async fn count(&self) -> Result<usize> {
        match self.table().await? {
            Some(table) => Ok(table.count_rows(None).await?),
            None => Ok(0),
        }
    }
}

// ── Arrow conversion ──────────────────────────────────────────────────────────

pub fn document_schema(dim: usize) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("doi", DataType::Utf8, false),
        Field::new("title", DataType::Utf8, false),
        Field::new("journal", DataType::Utf8, false),
        Field::new("text", DataType::Utf8, false),
        Field::new(
            "embedding",
            DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, false)), dim as i32),
            false,
        ),
    ]))
}

fn embedding_width(schema: &Schema) -> Option<usize> {
    match schema.field_with_name("embedding").ok()?.data_type() {
        DataType::FixedSizeList(_, n) => usize::try_from(*n).ok(),
        _ => None,
    }
}

/// Pack documents into one record batch; every embedding must share the
/// first document's width.
pub fn documents_to_record(docs: &[IndexedDocument]) -> Result<RecordBatch> {
    let dim = docs.first().map_or(0, |d| d.embedding.len());
    let mut values = Vec::with_capacity(docs.len() * dim);
    for doc in docs {
        if doc.embedding.len() != dim {
            return Err(EmbedError::InvalidEmbeddingDimension {
                expected: dim,
                actual: doc.embedding.len(),
            });
        }
        values.extend_from_slice(&doc.embedding);
    }

    let doi = StringArray::from_iter_values(docs.iter().map(|d| d.doi.as_str()));
    let title = StringArray::from_iter_values(docs.iter().map(|d| d.title.as_str()));
    let journal = StringArray::from_iter_values(docs.iter().map(|d| d.journal.as_str()));
    let text = StringArray::from_iter_values(docs.iter().map(|d| d.text.as_str()));
    let item = Arc::new(Field::new("item", DataType::Float32, false));
    let embedding = FixedSizeListArray::try_new(item, dim as i32, Arc::new(Float32Array::from(values)), None)?;

    Ok(RecordBatch::try_new(
        document_schema(dim),
        vec![
            Arc::new(doi) as Arc<dyn Array>,
            Arc::new(title),
            Arc::new(journal),
            Arc::new(text),
            Arc::new(embedding),
        ],
    )?)
}

/// Unpack a record batch. Extra columns (such as the `_distance` column
/// added by vector search) are ignored.
pub fn records_to_documents(batch: &RecordBatch) -> Result<Vec<IndexedDocument>> {
    let strings = |name: &str| -> Result<&StringArray> {
        batch
            .column_by_name(name)
            .and_then(|c| c.as_any().downcast_ref::<StringArray>())
            .ok_or_else(|| EmbedError::Arrow(format!("missing text column '{name}'")))
    };
    let doi = strings("doi")?;
    let title = strings("title")?;
    let journal = strings("journal")?;
    let text = strings("text")?;
    let embedding = batch
        .column_by_name("embedding")
        .and_then(|c| c.as_any().downcast_ref::<FixedSizeListArray>())
        .ok_or_else(|| EmbedError::Arrow("missing embedding column".into()))?;

    (0..batch.num_rows())
        .map(|row| {
            let values = embedding.value(row);
            let floats = values
                .as_any()
                .downcast_ref::<Float32Array>()
                .ok_or_else(|| EmbedError::Arrow("embedding items are not f32".into()))?;
            Ok(IndexedDocument {
                doi: doi.value(row).to_string(),
                title: title.value(row).to_string(),
                journal: journal.value(row).to_string(),
                text: text.value(row).to_string(),
                embedding: floats.values().to_vec(),
            })
        })
        .collect()
}
