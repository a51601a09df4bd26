//! abstracta-embed: Semantic indexing of journal abstracts.
//!
//! Embeds cleaned abstracts with a local Ollama model, stores them in an
//! embedded LanceDB table, and summarises the embedding space: per-journal
//! centroids, nearest-neighbour smoke checks and a t-SNE scatterplot.

pub mod batch;
pub mod client;
pub mod error;
pub mod pipeline;
pub mod plot;
pub mod retry;
pub mod similarity;
pub mod smoke;
pub mod store;
pub mod tsne;

pub use batch::{array_split, partition_count};
pub use client::{Embedder, OllamaEmbedder, READINESS_PROMPT};
pub use error::{EmbedError, Result};
pub use pipeline::{build_index, open_index, run_indexing, summarise_index, IndexingReport};
pub use plot::{render_tsne_scatter, write_tsne_scatter, TsnePoint};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use similarity::{cosine_similarity, journal_centroids};
pub use smoke::{smoke_check, Neighbour, ProbeResult};
pub use store::{DocumentIndex, IndexedDocument, LanceIndex};
pub use tsne::Tsne;
