//! Embedding client for a local Ollama server.
//!
//! POST {base_url}/api/embeddings  {"model": ..., "prompt": ...}
//!   -> {"embedding": [f32; dim]}
//! Errors come back as a non-2xx status with {"error": "..."}.

use abstracta_common::settings::EmbeddingSettings;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{EmbedError, Result};

/// Prompt sent when probing the server before indexing.
pub const READINESS_PROMPT: &str = "Testing 123";

/// Text → vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Probe the service with a fixed prompt before any real work.
    async fn is_ready(&self) -> Result<()> {
        self.embed(READINESS_PROMPT).await.map(|_| ())
    }

    /// Embed each text in order; the first failure aborts the batch.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

#[async_trait]
impl<T: Embedder + ?Sized> Embedder for std::sync::Arc<T> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text).await
    }

    async fn is_ready(&self) -> Result<()> {
        (**self).is_ready().await
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(cfg: &EmbeddingSettings) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/api/embeddings", self.base_url)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    #[instrument(skip(self, text), fields(model = %self.model, chars = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = self.endpoint();
        let body = serde_json::json!({ "model": &self.model, "prompt": text });
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|source| {
                if source.is_connect() {
                    EmbedError::Unreachable { url: url.clone(), source }
                } else {
                    EmbedError::Http(source)
                }
            })?;

        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(EmbedError::Service {
                status: status.as_u16(),
                message: error_message(&bytes),
            });
        }
        parse_embedding(&bytes)
    }

    /// Probe the server with a fixed prompt. Distinguishes a server that is
    /// not running from one that is up but cannot serve the model.
    #[instrument(skip(self), fields(model = %self.model))]
    async fn is_ready(&self) -> Result<()> {
        match self.embed(READINESS_PROMPT).await {
            Ok(_) => {
                debug!("Embedding server ready");
                Ok(())
            }
            Err(e @ EmbedError::Unreachable { .. }) => Err(e),
            Err(e) => Err(EmbedError::NotReady {
                model: self.model.clone(),
                reason: e.to_string(),
            }),
        }
    }
}

/// Extract the vector from an embeddings response body.
pub fn parse_embedding(body: &[u8]) -> Result<Vec<f32>> {
    let parsed: EmbeddingResponse = serde_json::from_slice(body)?;
    if parsed.embedding.is_empty() {
        return Err(EmbedError::EmptyEmbedding);
    }
    Ok(parsed.embedding)
}

fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<ErrorResponse>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| String::from_utf8_lossy(body).trim().to_string())
}
