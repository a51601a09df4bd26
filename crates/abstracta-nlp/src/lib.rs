//! abstracta-nlp: Abstract cleaning and linguistic preprocessing stage.
//! - Title exclusion and boilerplate-sentence removal
//! - Rule-based tokenisation, category tagging and lemmatisation
//! - Stopword, category and length filtering
//! - Bigram phrase detection fitted per corpus

pub mod annotate;
pub mod error;
pub mod filter;
pub mod normalise;
pub mod phrases;
pub mod pipeline;
pub mod stopwords;

pub use annotate::{AnnotatedToken, Annotator, RuleAnnotator, TokenCategory};
pub use error::{NlpError, Result};
pub use filter::TokenFilter;
pub use normalise::{drop_excluded_titles, is_usable_abstract, BoilerplateFilter};
pub use phrases::PhraseModel;
pub use pipeline::{preprocess_tables, run_preprocess, PreparedTables};
pub use stopwords::Stopwords;
