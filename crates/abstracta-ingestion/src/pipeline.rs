//! Harvest stage orchestration.
//!
//! Flow: authors → journals → supplementary backfill → persist.
//! Each author and each journal ISSN is one paginated query; the configured
//! politeness delay separates successive queries.

use std::time::Duration;

use abstracta_common::store::{should_write, write_table};
use abstracta_common::{DataStore, Publication, Settings};
use tracing::{info, warn};

use crate::backfill::{backfill_abstracts, SupplementaryAbstracts};
use crate::error::Result;
use crate::harvest::{dedup_by_doi, Harvester};
use crate::sources::WorksApi;

/// Author-level table: every scholar from their own start year, filtered to
/// the ISSNs of every configured journal. Rows from different scholars are
/// concatenated without deduplication.
pub async fn collect_author_data<A: WorksApi>(harvester: &Harvester<A>, settings: &Settings) -> Result<Vec<Publication>> {
    let issns = settings.issn_list(None);
    let delay = Duration::from_secs(settings.crossref.api_delay_secs);
    let mut rows = Vec::new();

    for (i, scholar) in settings.scholars.iter().enumerate() {
        if i > 0 {
            politeness_sleep(delay).await;
        }
        rows.extend(harvester.author_publications(scholar, &issns).await?);
    }
    info!(rows = rows.len(), scholars = settings.scholars.len(), "Author table collected");
    Ok(rows)
}

/// Journal-level table: every ISSN of the sampled journals from the sample
/// start year, deduplicated by DOI across ISSNs.
pub async fn collect_journal_data<A: WorksApi>(harvester: &Harvester<A>, settings: &Settings) -> Result<Vec<Publication>> {
    let issns = settings.sample_issns();
    let start_year = settings.journal_sample.start_year;
    let delay = Duration::from_secs(settings.crossref.api_delay_secs);
    let mut rows = Vec::new();

    for (i, issn) in issns.iter().enumerate() {
        if i > 0 {
            politeness_sleep(delay).await;
        }
        rows.extend(harvester.journal_publications(issn, start_year).await?);
    }
    let rows = dedup_by_doi(rows);
    info!(rows = rows.len(), issns = issns.len(), "Journal table collected");
    Ok(rows)
}

/// Run the harvest stage end to end and persist both tables.
///
/// A table whose file exists and whose `on_existing` policy is `reuse` is
/// left untouched.
pub async fn run_collection<A: WorksApi>(api: A, settings: &Settings) -> Result<()> {
    let store = DataStore::from_settings(settings);
    let policy = settings.paths.on_existing;
    let write_authors = should_write(store.author_file(), policy)?;
    let write_journals = should_write(store.journal_file(), policy)?;
    if !write_authors && !write_journals {
        info!("Both data files kept; nothing to collect");
        return Ok(());
    }

    let harvester = Harvester::new(api);
    let mut authors = if write_authors {
        Some(collect_author_data(&harvester, settings).await?)
    } else {
        None
    };
    let mut journals = if write_journals {
        Some(collect_journal_data(&harvester, settings).await?)
    } else {
        None
    };

    if let Some(supp) = load_supplementary(settings)? {
        for table in [authors.as_mut(), journals.as_mut()].into_iter().flatten() {
            backfill_abstracts(table, &supp);
        }
    }

    if let Some(rows) = &authors {
        write_table(store.author_file(), rows)?;
        info!(path = %store.author_file().display(), rows = rows.len(), "Author data saved");
    }
    if let Some(rows) = &journals {
        write_table(store.journal_file(), rows)?;
        info!(path = %store.journal_file().display(), rows = rows.len(), "Journal data saved");
    }
    Ok(())
}

fn load_supplementary(settings: &Settings) -> Result<Option<SupplementaryAbstracts>> {
    let Some(path) = settings.paths.supplementary_table.as_deref() else {
        return Ok(None);
    };
    if !path.exists() {
        warn!(
            path = %path.display(),
            "No supplementary table found; export (title, abstract) rows as CSV to this path to fill missing abstracts"
        );
        return Ok(None);
    }
    Ok(Some(SupplementaryAbstracts::from_csv(path)?))
}

async fn politeness_sleep(delay: Duration) {
    if !delay.is_zero() {
        info!(secs = delay.as_secs(), "Pausing between API queries");
        tokio::time::sleep(delay).await;
    }
}
