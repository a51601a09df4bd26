//! Contrast stage orchestration: author, journal and citation-extreme
//! charts.

use std::fs;
use std::path::{Path, PathBuf};

use abstracta_common::{DataStore, Publication, Settings};
use tracing::info;

use crate::citation::label_citation_extremes;
use crate::compact::AssociationCompactor;
use crate::contrast::{build_contrast, ContrastSpec, Transform};
use crate::corpus::{LabeledText, TermCorpus};
use crate::error::Result;
use crate::render::write_chart;

/// One chart per author: that author's abstracts against every other
/// author's, with titles attached as example metadata.
pub fn one_vs_rest_authors(rows: &[Publication], settings: &Settings, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let names: Vec<Option<String>> = rows.iter().map(Publication::full_name).collect();
    let corpus = TermCorpus::build(rows.iter().zip(&names).filter_map(|(r, name)| {
        name.as_deref().map(|category| LabeledText {
            category,
            text: &r.token_string,
            metadata: Some(r.title.as_str()),
        })
    }));
    let corpus = AssociationCompactor::new(settings.contrast.max_terms).compact(corpus);
    let variant = settings.contrast.authors;

    let mut written = Vec::new();
    for author in corpus.categories() {
        info!(author = %author, "Author contrast");
        let mut spec = ContrastSpec::one_vs_rest(
            author,
            "Other Authors",
            variant.minimum_term_frequency,
            variant.pmi_filter_threshold,
        );
        spec.with_metadata = true;
        let chart = build_contrast(&corpus, &spec)?;
        written.push(write_chart(&chart, out_dir, author)?);
    }
    Ok(written)
}

/// One chart per journal against every other journal.
pub fn one_vs_rest_journals(rows: &[Publication], settings: &Settings, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let corpus = TermCorpus::build(rows.iter().map(|r| LabeledText {
        category: &r.journal,
        text: &r.token_string,
        metadata: None,
    }));
    let corpus = AssociationCompactor::new(settings.contrast.max_terms).compact(corpus);
    let variant = settings.contrast.journals;

    let mut written = Vec::new();
    for journal in corpus.categories() {
        info!(journal = %journal, "Journal contrast");
        let spec = ContrastSpec::one_vs_rest(
            journal,
            "Other Journals",
            variant.minimum_term_frequency,
            variant.pmi_filter_threshold,
        );
        let chart = build_contrast(&corpus, &spec)?;
        written.push(write_chart(&chart, out_dir, journal)?);
    }
    Ok(written)
}

/// A two-way split of the citation-labelled rows.
struct CitationSplit {
    stem: &'static str,
    name: &'static str,
    not_name: &'static str,
    left: &'static str,
    right: &'static str,
    transform: Transform,
    most: bool,
}

const CITATION_SPLITS: [CitationSplit; 2] = [
    CitationSplit {
        stem: "Most_cited",
        name: "Most Cited",
        not_name: "Not Most Cited",
        left: "Less likely to be most cited",
        right: "More likely to be most cited",
        transform: Transform::DenseRank,
        most: true,
    },
    CitationSplit {
        stem: "Least_cited",
        name: "Least Cited",
        not_name: "Not Least Cited",
        left: "Less likely to be least cited",
        right: "More likely to be least cited",
        transform: Transform::Percentile,
        most: false,
    },
];

/// Most-cited and least-cited charts over the journal table.
pub fn citation_extremes(rows: &[Publication], settings: &Settings, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let cfg = &settings.contrast.citations;
    let labels = label_citation_extremes(rows, cfg);
    info!(rows = labels.len(), "Citation extremes labelled");

    let mut written = Vec::new();
    for split in &CITATION_SPLITS {
        let corpus = TermCorpus::build(labels.iter().map(|l| {
            let inside = if split.most { l.most_cited } else { l.least_cited };
            LabeledText {
                category: if inside { split.name } else { split.not_name },
                text: &l.row.token_string,
                metadata: None,
            }
        }));
        let corpus = AssociationCompactor::new(settings.contrast.max_terms).compact(corpus);
        if corpus.category_index(split.name).is_none() {
            info!(split = split.stem, "No documents in split; chart skipped");
            continue;
        }
        let spec = ContrastSpec {
            category: split.name.to_string(),
            category_name: split.name.to_string(),
            not_category_name: split.not_name.to_string(),
            minimum_term_frequency: cfg.minimum_term_frequency,
            pmi_filter_threshold: cfg.pmi_filter_threshold,
            transform: split.transform,
            left_caption: split.left.to_string(),
            right_caption: split.right.to_string(),
            with_metadata: false,
        };
        let chart = build_contrast(&corpus, &spec)?;
        written.push(write_chart(&chart, out_dir, split.stem)?);
    }
    Ok(written)
}

/// Load the preprocessed tables and write every chart to the output
/// directory.
pub fn run_contrast(settings: &Settings) -> Result<Vec<PathBuf>> {
    let (authors, journals) = DataStore::from_settings(settings).load_tables()?;
    let out_dir = settings.paths.output_dir.as_path();
    fs::create_dir_all(out_dir)?;

    let mut written = one_vs_rest_authors(&authors, settings, out_dir)?;
    written.extend(one_vs_rest_journals(&journals, settings, out_dir)?);
    written.extend(citation_extremes(&journals, settings, out_dir)?);
    info!(charts = written.len(), dir = %out_dir.display(), "Contrast charts saved");
    Ok(written)
}
