//! Preprocessing stage orchestration.
//!
//! Flow: title exclusion → journal DOI dedup → boilerplate removal →
//! unusable-abstract drop → annotation + filtering → phrase model per table.

use std::collections::HashSet;

use abstracta_common::{DataStore, Publication, Settings};
use tracing::{debug, info};

use crate::annotate::Annotator;
use crate::error::Result;
use crate::filter::TokenFilter;
use crate::normalise::{drop_excluded_titles, is_usable_abstract, BoilerplateFilter};
use crate::phrases::PhraseModel;

/// Both tables with derived text fields filled, plus their phrase models.
#[derive(Debug, Clone)]
pub struct PreparedTables {
    pub authors: Vec<Publication>,
    pub journals: Vec<Publication>,
    pub author_phrases: PhraseModel,
    pub journal_phrases: PhraseModel,
}

/// Clean and tokenise both tables. The author table keeps one row per
/// (author, DOI); the journal table is reduced to one row per DOI.
pub fn preprocess_tables(
    authors: Vec<Publication>,
    journals: Vec<Publication>,
    settings: &Settings,
    annotator: &dyn Annotator,
) -> Result<PreparedTables> {
    let cfg = &settings.preprocess;
    let boilerplate = BoilerplateFilter::new(&cfg.noncontent_patterns)?;
    let filter = TokenFilter::from_settings(cfg);

    let authors = drop_excluded_titles(authors, &cfg.excluded_title_terms);
    let journals = unique_dois(drop_excluded_titles(journals, &cfg.excluded_title_terms));

    let mut authors = clean_abstracts(authors, &boilerplate);
    let mut journals = clean_abstracts(journals, &boilerplate);
    info!(authors = authors.len(), journals = journals.len(), "Abstracts cleaned");

    tokenise(&mut authors, annotator, &filter);
    tokenise(&mut journals, annotator, &filter);

    let author_phrases = attach_phrases(&mut authors, cfg.phrase_min_count, cfg.phrase_threshold);
    let journal_phrases = attach_phrases(&mut journals, cfg.phrase_min_count, cfg.phrase_threshold);

    Ok(PreparedTables {
        authors,
        journals,
        author_phrases,
        journal_phrases,
    })
}

/// Load the harvested tables, preprocess them and persist tables and
/// phrase models.
pub fn run_preprocess(settings: &Settings, annotator: &dyn Annotator) -> Result<PreparedTables> {
    let store = DataStore::from_settings(settings);
    let (authors, journals) = store.load_tables()?;
    info!(authors = authors.len(), journals = journals.len(), "Data files loaded");

    let prepared = preprocess_tables(authors, journals, settings, annotator)?;

    let data_dir = &settings.paths.data_dir;
    prepared.author_phrases.save(&data_dir.join("author_phrases.json"))?;
    prepared.journal_phrases.save(&data_dir.join("journal_phrases.json"))?;
    store.save_tables(&prepared.authors, &prepared.journals)?;
    Ok(prepared)
}

fn unique_dois(rows: Vec<Publication>) -> Vec<Publication> {
    let mut seen = HashSet::new();
    rows.into_iter().filter(|r| seen.insert(r.doi.clone())).collect()
}

fn clean_abstracts(rows: Vec<Publication>, boilerplate: &BoilerplateFilter) -> Vec<Publication> {
    let before = rows.len();
    let kept: Vec<Publication> = rows
        .into_iter()
        .filter_map(|mut r| {
            let clean = r
                .abstract_text
                .as_deref()
                .map(|t| boilerplate.apply(t).trim().to_string());
            if !is_usable_abstract(clean.as_deref()) {
                return None;
            }
            r.abstract_clean = clean;
            Some(r)
        })
        .collect();
    debug!(dropped = before - kept.len(), "Rows without usable abstracts dropped");
    kept
}

fn tokenise(rows: &mut [Publication], annotator: &dyn Annotator, filter: &TokenFilter) {
    for row in rows.iter_mut() {
        let text = row.abstract_clean.as_deref().unwrap_or_default();
        row.tokens = filter.filter(&annotator.annotate(text));
    }
}

fn attach_phrases(rows: &mut [Publication], min_count: u64, threshold: f64) -> PhraseModel {
    let documents: Vec<&[String]> = rows.iter().map(|r| r.tokens.as_slice()).collect();
    let model = PhraseModel::fit(&documents, min_count, threshold);
    for row in rows.iter_mut() {
        row.tokens_with_phrases = model.apply(&row.tokens);
        row.token_string = row.tokens_with_phrases.join(" ");
    }
    model
}
