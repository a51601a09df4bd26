//! Paginated harvesting and work-to-publication parsing.

use std::collections::HashSet;

use abstracta_common::settings::Scholar;
use abstracta_common::{Publication, ScholarName};
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::jats::strip_markup;
use crate::models::{Work, WorkAuthor};
use crate::sources::{WorksApi, WorksQuery};

const JOURNAL_ARTICLE: &str = "journal-article";

/// Drives a [`WorksApi`] through offset pagination.
pub struct Harvester<A> {
    api: A,
}

impl<A: WorksApi> Harvester<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Every work matching `query`.
    ///
    /// Requests pages at strictly increasing offsets until the cumulative
    /// item count reaches the reported total or a page comes back empty.
    /// Any failed page aborts the whole query.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn fetch_all(&self, query: &WorksQuery) -> Result<Vec<Work>> {
        let mut works: Vec<Work> = Vec::new();
        let mut offset = 0usize;

        loop {
            let page = self.api.fetch_page(query, offset).await?;
            let received = page.items.len();
            let step = if page.items_per_page > 0 { page.items_per_page } else { received };
            works.extend(page.items);

            if received == 0 || works.len() >= page.total_results || step == 0 {
                break;
            }
            offset += step;
            debug!(offset, fetched = works.len(), total = page.total_results, "Fetching next page");
        }

        Ok(works)
    }

    /// Journal articles by one scholar, restricted to `issns`.
    pub async fn author_publications(&self, scholar: &Scholar, issns: &[String]) -> Result<Vec<Publication>> {
        let query = WorksQuery::Author {
            first_name: scholar.first_name.clone(),
            last_name: scholar.last_name.clone(),
            start_year: scholar.start_year,
            issns: issns.to_vec(),
        };
        let works = self.fetch_all(&query).await?;
        let name = ScholarName::new(&scholar.first_name, &scholar.last_name);
        let rows = parse_author_works(&works, &name);
        info!(author = %name.full_name(), works = works.len(), kept = rows.len(), "Author publications harvested");
        Ok(rows)
    }

    /// Journal articles published in one journal.
    pub async fn journal_publications(&self, issn: &str, start_year: i32) -> Result<Vec<Publication>> {
        let query = WorksQuery::Journal {
            issn: issn.to_string(),
            start_year,
        };
        let works = self.fetch_all(&query).await?;
        let rows = parse_journal_works(&works);
        info!(issn, works = works.len(), kept = rows.len(), "Journal publications harvested");
        Ok(rows)
    }
}

/// Eligible works that list `name` among their authors, one row per DOI.
pub fn parse_author_works(works: &[Work], name: &ScholarName) -> Vec<Publication> {
    let rows = works
        .iter()
        .filter(|w| w.author.iter().any(|a| author_matches(a, name)))
        .filter_map(work_to_publication)
        .map(|mut p| {
            p.author = Some(name.clone());
            p
        })
        .collect();
    dedup_by_doi(rows)
}

/// Eligible works, one row per DOI.
pub fn parse_journal_works(works: &[Work]) -> Vec<Publication> {
    dedup_by_doi(works.iter().filter_map(work_to_publication).collect())
}

/// Keep the first row for each DOI, preserving order.
pub fn dedup_by_doi(rows: Vec<Publication>) -> Vec<Publication> {
    let mut seen: HashSet<String> = HashSet::with_capacity(rows.len());
    rows.into_iter().filter(|p| seen.insert(p.doi.clone())).collect()
}

/// Case-insensitive substring containment of both name parts.
fn author_matches(author: &WorkAuthor, name: &ScholarName) -> bool {
    let contains = |field: &Option<String>, part: &str| {
        field
            .as_deref()
            .is_some_and(|f| f.to_lowercase().contains(&part.to_lowercase()))
    };
    contains(&author.given, &name.first_name) && contains(&author.family, &name.last_name)
}

/// A publication row for an eligible work: type journal-article with a
/// non-empty title.
fn work_to_publication(work: &Work) -> Option<Publication> {
    if work.work_type != JOURNAL_ARTICLE {
        return None;
    }
    let title = work.first_title()?;
    let mut row = Publication::new(&work.doi, title, work.journal());
    row.abstract_text = work.abstract_text.as_deref().and_then(strip_markup);
    row.pub_year = work.year();
    row.citations = work.is_referenced_by_count;
    Some(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn work(doi: &str, kind: &str, title: &str, authors: &[(&str, &str)]) -> Work {
        serde_json::from_value(serde_json::json!({
            "DOI": doi,
            "type": kind,
            "title": [title],
            "container-title": ["Journal of Business Venturing"],
            "abstract": "<jats:title>Abstract</jats:title><jats:p>Body.</jats:p>",
            "author": authors.iter().map(|(g, f)| serde_json::json!({"given": g, "family": f})).collect::<Vec<_>>(),
            "published": {"date-parts": [[2021, 3]]},
            "is-referenced-by-count": 7
        }))
        .unwrap()
    }

    #[test]
    fn test_journal_parsing_fills_fields() {
        let rows = parse_journal_works(&[work("10.1/a", "journal-article", "Alpha", &[])]);
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.title, "Alpha");
        assert_eq!(r.journal, "Journal of Business Venturing");
        assert_eq!(r.abstract_text.as_deref(), Some("Body."));
        assert_eq!(r.pub_year, Some(2021));
        assert_eq!(r.citations, 7);
        assert_eq!(r.author, None);
    }

    #[test]
    fn test_non_articles_and_untitled_excluded() {
        let works = [
            work("10.1/a", "book-chapter", "Chapter", &[("Ada", "Lovelace")]),
            work("10.1/b", "journal-article", "  ", &[("Ada", "Lovelace")]),
            work("10.1/c", "journal-article", "Kept", &[("Ada", "Lovelace")]),
        ];
        let name = ScholarName::new("Ada", "Lovelace");
        let rows = parse_author_works(&works, &name);
        assert_eq!(rows.iter().map(|r| r.doi.as_str()).collect::<Vec<_>>(), vec!["10.1/c"]);
        assert_eq!(rows[0].author, Some(name));
    }

    #[test]
    fn test_author_match_is_case_insensitive_substring() {
        let name = ScholarName::new("ada", "LOVELACE");
        let works = [
            work("10.1/a", "journal-article", "A", &[("Ada M.", "Lovelace-King")]),
            work("10.1/b", "journal-article", "B", &[("Ada", "Byron")]),
            work("10.1/c", "journal-article", "C", &[("Charles", "Lovelace")]),
        ];
        let rows = parse_author_works(&works, &name);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].doi, "10.1/a");
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let works = [
            work("10.1/a", "journal-article", "First", &[]),
            work("10.1/b", "journal-article", "Other", &[]),
            work("10.1/a", "journal-article", "Second", &[]),
        ];
        let rows = parse_journal_works(&works);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title, "First");
    }
}
