//! abstracta-lexical: Lexical contrast stage.
//! - Term-frequency corpora partitioned by a category label
//! - Association compaction to a bounded vocabulary
//! - Scaled F-score term association with rank-scaled coordinates
//! - Standalone HTML scatter charts, one per category

pub mod citation;
pub mod compact;
pub mod contrast;
pub mod corpus;
pub mod error;
pub mod render;
pub mod report;
pub mod scoring;

pub use citation::{label_citation_extremes, CitationExtreme};
pub use compact::AssociationCompactor;
pub use contrast::{build_contrast, ContrastChart, ContrastSpec, TermPoint, Transform};
pub use corpus::{LabeledText, TermCorpus};
pub use error::{LexicalError, Result};
pub use render::{render_chart, write_chart};
pub use report::{citation_extremes, one_vs_rest_authors, one_vs_rest_journals, run_contrast};
