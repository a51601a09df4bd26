//! Settings document for the abstracta pipeline.
//! The binary picks the file from `--config`, the ABSTRACTA_CONFIG env var
//! or abstracta.toml in the working directory. Loaded once per process and
//! never mutated.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{AbstractaError, Result};

/// Placeholder shipped in abstracta.example.toml; must be replaced.
const USER_AGENT_PLACEHOLDER: &str = "YourEmailHere";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub crossref: CrossRefSettings,
    /// Journal name → ISSNs.
    #[serde(default)]
    pub journals: BTreeMap<String, Vec<String>>,
    pub journal_sample: JournalSample,
    #[serde(default)]
    pub scholars: Vec<Scholar>,
    #[serde(default)]
    pub preprocess: PreprocessSettings,
    #[serde(default)]
    pub contrast: ContrastSettings,
    pub embedding: EmbeddingSettings,
    #[serde(default)]
    pub tsne: TsneSettings,
    #[serde(default)]
    pub paths: PathSettings,
}

// ── CrossRef ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossRefSettings {
    /// Polite-pool identity, e.g. "abstracta/0.1 (mailto:me@uni.edu)".
    pub user_agent: String,
    #[serde(default = "default_crossref_base")]
    pub base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_author_timeout")]
    pub author_timeout_secs: u64,
    #[serde(default = "default_journal_timeout")]
    pub journal_timeout_secs: u64,
    /// Sleep between successive author/journal queries.
    #[serde(default = "default_api_delay")]
    pub api_delay_secs: u64,
}

fn default_crossref_base()   -> String { "https://api.crossref.org".to_string() }
fn default_page_size()       -> usize  { 1000 }
fn default_author_timeout()  -> u64    { 30 }
fn default_journal_timeout() -> u64    { 100 }
fn default_api_delay()       -> u64    { 2 }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalSample {
    pub journals: Vec<String>,
    pub start_year: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scholar {
    pub first_name: String,
    pub last_name: String,
    pub start_year: i32,
}

// ── Preprocessing ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessSettings {
    #[serde(default)]
    pub custom_stopwords: Vec<String>,
    /// Regexes removed from every abstract, applied in order.
    #[serde(default)]
    pub noncontent_patterns: Vec<String>,
    #[serde(default = "default_excluded_title_terms")]
    pub excluded_title_terms: Vec<String>,
    #[serde(default = "bool_true")]
    pub remove_stopwords: bool,
    #[serde(default = "bool_true")]
    pub remove_non_word_categories: bool,
    #[serde(default = "bool_true")]
    pub lemmatize: bool,
    #[serde(default = "default_min_token_len")]
    pub min_token_len: usize,
    #[serde(default = "default_phrase_min_count")]
    pub phrase_min_count: u64,
    #[serde(default = "default_phrase_threshold")]
    pub phrase_threshold: f64,
}

fn bool_true() -> bool { true }
fn default_min_token_len()    -> usize { 3 }
fn default_phrase_min_count() -> u64   { 3 }
fn default_phrase_threshold() -> f64   { 10.0 }

fn default_excluded_title_terms() -> Vec<String> {
    [
        "withdrawn",
        "retracted",
        "errata",
        "correction",
        "retraction",
        "editorial",
        "issue information",
        "journal information",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for PreprocessSettings {
    fn default() -> Self {
        Self {
            custom_stopwords: vec![],
            noncontent_patterns: vec![],
            excluded_title_terms: default_excluded_title_terms(),
            remove_stopwords: true,
            remove_non_word_categories: true,
            lemmatize: true,
            min_token_len: default_min_token_len(),
            phrase_min_count: default_phrase_min_count(),
            phrase_threshold: default_phrase_threshold(),
        }
    }
}

// ── Lexical contrast ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContrastSettings {
    /// Terms kept by the association compactor across all categories.
    #[serde(default = "default_max_terms")]
    pub max_terms: usize,
    #[serde(default = "default_author_variant")]
    pub authors: ContrastVariant,
    #[serde(default = "default_journal_variant")]
    pub journals: ContrastVariant,
    #[serde(default)]
    pub citations: CitationSettings,
}

fn default_max_terms() -> usize { 2000 }

fn default_author_variant() -> ContrastVariant {
    ContrastVariant { minimum_term_frequency: 2, pmi_filter_threshold: 4.0 }
}

fn default_journal_variant() -> ContrastVariant {
    ContrastVariant { minimum_term_frequency: 20, pmi_filter_threshold: 4.0 }
}

impl Default for ContrastSettings {
    fn default() -> Self {
        Self {
            max_terms: default_max_terms(),
            authors: default_author_variant(),
            journals: default_journal_variant(),
            citations: CitationSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ContrastVariant {
    pub minimum_term_frequency: u64,
    pub pmi_filter_threshold: f64,
}

/// How citation quantile thresholds are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuantileScope {
    /// Thresholds recomputed within each publication year.
    #[default]
    PerYear,
    /// One pair of thresholds over the whole table.
    Global,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitationSettings {
    #[serde(default = "default_citation_min_freq")]
    pub minimum_term_frequency: u64,
    #[serde(default = "default_pmi_threshold")]
    pub pmi_filter_threshold: f64,
    #[serde(default = "default_high_quantile")]
    pub high_quantile: f64,
    #[serde(default = "default_low_quantile")]
    pub low_quantile: f64,
    /// Publications from this year onward have no meaningful citation
    /// counts yet and are left out.
    #[serde(default = "default_exclude_from_year")]
    pub exclude_from_year: Option<i32>,
    #[serde(default)]
    pub quantile_scope: QuantileScope,
}

fn default_citation_min_freq() -> u64         { 20 }
fn default_pmi_threshold()     -> f64         { 4.0 }
fn default_high_quantile()     -> f64         { 0.80 }
fn default_low_quantile()      -> f64         { 0.20 }
fn default_exclude_from_year() -> Option<i32> { Some(2024) }

impl Default for CitationSettings {
    fn default() -> Self {
        Self {
            minimum_term_frequency: default_citation_min_freq(),
            pmi_filter_threshold: default_pmi_threshold(),
            high_quantile: default_high_quantile(),
            low_quantile: default_low_quantile(),
            exclude_from_year: default_exclude_from_year(),
            quantile_scope: QuantileScope::default(),
        }
    }
}

// ── Embeddings ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Ollama model identifier, e.g. "nomic-embed-text".
    pub model: String,
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_secs: u64,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub test_abstracts: Vec<TestAbstract>,
    #[serde(default)]
    pub test_query: Option<String>,
}

fn default_ollama_url()    -> String { "http://localhost:11434".to_string() }
fn default_chunk_size()    -> usize  { 10 }
fn default_max_retries()   -> u32    { 5 }
fn default_retry_backoff() -> u64    { 20 }
fn default_top_k()         -> usize  { 5 }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestAbstract {
    pub field: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TsneSettings {
    #[serde(default = "default_perplexity")]
    pub perplexity: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// `None` picks the learning rate from the sample size.
    #[serde(default)]
    pub learning_rate: Option<f64>,
    #[serde(default = "default_iterations")]
    pub iterations: usize,
}

fn default_perplexity() -> f64   { 30.0 }
fn default_seed()       -> u64   { 24601 }
fn default_iterations() -> usize { 1000 }

impl Default for TsneSettings {
    fn default() -> Self {
        Self {
            perplexity: default_perplexity(),
            seed: default_seed(),
            learning_rate: None,
            iterations: default_iterations(),
        }
    }
}

// ── Paths ─────────────────────────────────────────────────────────────────────

/// What to do when a stage's output already exists on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnExisting {
    /// Replace it (for the vector store: reset and rebuild).
    Overwrite,
    /// Keep it and use it as-is.
    Reuse,
    /// Abort the stage.
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// CSV with `title` and `abstract` columns used to fill missing abstracts.
    #[serde(default = "default_supplementary_table")]
    pub supplementary_table: Option<PathBuf>,
    #[serde(default = "default_on_existing_tables")]
    pub on_existing: OnExisting,
    #[serde(default = "default_on_existing_index")]
    pub vector_store_on_existing: OnExisting,
}

fn default_data_dir()   -> PathBuf { PathBuf::from("data") }
fn default_output_dir() -> PathBuf { PathBuf::from("output") }
fn default_supplementary_table() -> Option<PathBuf> {
    Some(PathBuf::from("data/scopus_download.csv"))
}
fn default_on_existing_tables() -> OnExisting { OnExisting::Overwrite }
fn default_on_existing_index()  -> OnExisting { OnExisting::Reuse }

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            output_dir: default_output_dir(),
            supplementary_table: default_supplementary_table(),
            on_existing: default_on_existing_tables(),
            vector_store_on_existing: default_on_existing_index(),
        }
    }
}

#[cfg(test)]
mod tests;

impl Settings {
    /// Load and validate settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AbstractaError::Config(format!(
                "Settings file not found at {}\n\
                 Copy abstracta.example.toml to abstracta.toml and edit it.",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Err(AbstractaError::Config("No data in settings file".into()));
        }
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings that would make a stage fail midway.
    pub fn validate(&self) -> Result<()> {
        let ua = self.crossref.user_agent.trim();
        if ua.is_empty() {
            return Err(AbstractaError::Config("crossref.user_agent is empty".into()));
        }
        if ua.contains(USER_AGENT_PLACEHOLDER) {
            return Err(AbstractaError::Config(
                "Please update your email in abstracta.toml -> crossref.user_agent".into(),
            ));
        }
        if self.crossref.page_size == 0 {
            return Err(AbstractaError::Config("crossref.page_size must be positive".into()));
        }
        if self.scholars.is_empty() {
            return Err(AbstractaError::Config("No [[scholars]] listed".into()));
        }
        for journal in &self.journal_sample.journals {
            if !self.journals.contains_key(journal) {
                return Err(AbstractaError::Config(format!(
                    "journal_sample names '{journal}' which has no ISSNs in [journals]"
                )));
            }
        }
        if self.embedding.model.trim().is_empty() {
            return Err(AbstractaError::Config("embedding.model is empty".into()));
        }
        if self.embedding.chunk_size == 0 {
            return Err(AbstractaError::Config("embedding.chunk_size must be positive".into()));
        }
        let c = &self.contrast.citations;
        for (name, q) in [("high_quantile", c.high_quantile), ("low_quantile", c.low_quantile)] {
            if !(q > 0.0 && q < 1.0) {
                return Err(AbstractaError::Config(format!(
                    "contrast.citations.{name} must lie in (0, 1), got {q}"
                )));
            }
        }
        Ok(())
    }

    /// ISSNs of the named journals, or of every configured journal when
    /// `journals` is `None`.
    pub fn issn_list(&self, journals: Option<&[String]>) -> Vec<String> {
        self.journals
            .iter()
            .filter(|(name, _)| journals.map_or(true, |wanted| wanted.contains(name)))
            .flat_map(|(_, issns)| issns.iter().cloned())
            .collect()
    }

    /// ISSNs of the journals in the journal sample frame.
    pub fn sample_issns(&self) -> Vec<String> {
        self.issn_list(Some(&self.journal_sample.journals))
    }

    pub fn author_data_file(&self) -> PathBuf {
        self.paths.data_dir.join("author_publications.json")
    }

    pub fn journal_data_file(&self) -> PathBuf {
        self.paths.data_dir.join("journal_publications.json")
    }

    pub fn vector_store_dir(&self) -> PathBuf {
        self.paths.data_dir.join("vectordb")
    }
}
