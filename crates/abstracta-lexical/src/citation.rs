//! Most-cited / least-cited labelling.

use std::collections::BTreeMap;

use abstracta_common::settings::CitationSettings;
use abstracta_common::{Publication, QuantileScope};

#[derive(Debug, Clone, Copy)]
pub struct CitationExtreme<'a> {
    pub row: &'a Publication,
    /// Citations at or above the high quantile.
    pub most_cited: bool,
    /// Citations at or below the low quantile.
    pub least_cited: bool,
}

/// Label rows published before `exclude_from_year` against the citation
/// quantiles of their year (or of all eligible rows, for a global scope).
/// Rows without a year are left out.
pub fn label_citation_extremes<'a>(rows: &'a [Publication], cfg: &CitationSettings) -> Vec<CitationExtreme<'a>> {
    let eligible = rows.iter().filter(|r| match (r.pub_year, cfg.exclude_from_year) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(year), Some(cut)) => year < cut,
    });

    let mut groups: BTreeMap<i32, Vec<&Publication>> = BTreeMap::new();
    for row in eligible {
        let key = match cfg.quantile_scope {
            QuantileScope::PerYear => row.pub_year.unwrap_or_default(),
            QuantileScope::Global => 0,
        };
        groups.entry(key).or_default().push(row);
    }

    let mut out = Vec::new();
    for members in groups.values() {
        let mut citations: Vec<f64> = members.iter().map(|r| r.citations as f64).collect();
        citations.sort_by(|a, b| a.total_cmp(b));
        let high = quantile(&citations, cfg.high_quantile);
        let low = quantile(&citations, cfg.low_quantile);
        out.extend(members.iter().map(|&row| CitationExtreme {
            row,
            most_cited: row.citations as f64 >= high,
            least_cited: row.citations as f64 <= low,
        }));
    }
    out
}

/// Quantile of sorted values with linear interpolation between the two
/// nearest ranks.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(doi: &str, year: Option<i32>, citations: u64) -> Publication {
        let mut p = Publication::new(doi, doi, "J");
        p.pub_year = year;
        p.citations = citations;
        p
    }

    #[test]
    fn test_quantile_linear_interpolation() {
        let v = [0.0, 10.0, 20.0, 30.0, 40.0];
        assert!((quantile(&v, 0.8) - 32.0).abs() < 1e-9);
        assert!((quantile(&v, 0.2) - 8.0).abs() < 1e-9);
        assert_eq!(quantile(&[5.0], 0.8), 5.0);
    }

    #[test]
    fn test_per_year_thresholds() {
        let rows = vec![
            row("a", Some(2020), 0),
            row("b", Some(2020), 10),
            row("c", Some(2020), 20),
            row("d", Some(2020), 30),
            row("e", Some(2020), 40),
            row("f", Some(2021), 1),
            row("g", Some(2021), 2),
            row("new", Some(2024), 99),
            row("undated", None, 99),
        ];
        let labels = label_citation_extremes(&rows, &CitationSettings::default());
        assert_eq!(labels.len(), 7);

        let most: Vec<&str> = labels.iter().filter(|l| l.most_cited).map(|l| l.row.doi.as_str()).collect();
        let least: Vec<&str> = labels.iter().filter(|l| l.least_cited).map(|l| l.row.doi.as_str()).collect();
        assert_eq!(most, vec!["e", "g"]);
        assert_eq!(least, vec!["a", "f"]);
    }

    #[test]
    fn test_global_scope() {
        let rows = vec![row("a", Some(2020), 0), row("b", Some(2021), 100), row("c", Some(2022), 50)];
        let cfg = CitationSettings {
            quantile_scope: QuantileScope::Global,
            ..CitationSettings::default()
        };
        let labels = label_citation_extremes(&rows, &cfg);
        let most: Vec<&str> = labels.iter().filter(|l| l.most_cited).map(|l| l.row.doi.as_str()).collect();
        assert_eq!(most, vec!["b"]);
    }
}
