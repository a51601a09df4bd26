//! t-SNE scatter of the indexed abstracts, one colour per journal.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use minijinja::{context, Environment};
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::store::IndexedDocument;

const TEMPLATE: &str = include_str!("../templates/tsne.html");
pub const SCATTERPLOT_FILE: &str = "tsne_scatterplot.html";
const TITLE: &str = "t-SNE Scatterplot of Journal Embeddings";

/// One projected abstract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TsnePoint {
    pub journal: String,
    pub title: String,
    pub x: f64,
    pub y: f64,
}

impl TsnePoint {
    /// Pair documents with their projected coordinates.
    pub fn from_projection(docs: &[IndexedDocument], coords: &[[f64; 2]]) -> Vec<Self> {
        docs.iter()
            .zip(coords)
            .map(|(d, c)| Self {
                journal: d.journal.clone(),
                title: d.title.clone(),
                x: c[0],
                y: c[1],
            })
            .collect()
    }
}

#[derive(Debug, Default, Serialize)]
struct JournalTrace<'a> {
    journal: &'a str,
    x: Vec<f64>,
    y: Vec<f64>,
    titles: Vec<&'a str>,
}

/// Render the scatter as a self-contained HTML page.
pub fn render_tsne_scatter(points: &[TsnePoint]) -> Result<String> {
    let mut traces: BTreeMap<&str, JournalTrace> = BTreeMap::new();
    for p in points {
        let trace = traces.entry(p.journal.as_str()).or_insert_with(|| JournalTrace {
            journal: &p.journal,
            ..JournalTrace::default()
        });
        trace.x.push(p.x);
        trace.y.push(p.y);
        trace.titles.push(&p.title);
    }
    let groups: Vec<&JournalTrace> = traces.values().collect();

    let mut env = Environment::new();
    env.add_template("tsne.html", TEMPLATE)?;
    let html = env.get_template("tsne.html")?.render(context! {
        title => TITLE,
        title_json => script_json(&serde_json::to_string(TITLE)?),
        groups_json => script_json(&serde_json::to_string(&groups)?),
    })?;
    Ok(html)
}

/// Write the scatter to `<out_dir>/tsne_scatterplot.html`.
pub fn write_tsne_scatter(points: &[TsnePoint], out_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(SCATTERPLOT_FILE);
    fs::write(&path, render_tsne_scatter(points)?)?;
    info!(path = %path.display(), points = points.len(), "t-SNE scatterplot written");
    Ok(path)
}

fn script_json(json: &str) -> String {
    json.replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(journal: &str, title: &str, x: f64) -> TsnePoint {
        TsnePoint { journal: journal.into(), title: title.into(), x, y: -x }
    }

    #[test]
    fn test_one_trace_per_journal() {
        let html = render_tsne_scatter(&[
            point("Small Business Economics", "Regional policy", 1.5),
            point("Journal of Business Venturing", "Founder exits", 0.25),
            point("Small Business Economics", "Growth </script> firms", -2.0),
        ])
        .unwrap();
        assert_eq!(html.matches("\"journal\":").count(), 2);
        assert!(html.contains("\"titles\":[\"Regional policy\",\"Growth <\\/script> firms\"]"));
        assert!(html.contains("plotly_dark"));
    }

    #[test]
    fn test_write_scatter() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tsne_scatter(&[point("J", "T", 0.0)], dir.path()).unwrap();
        assert_eq!(path, dir.path().join("tsne_scatterplot.html"));
        assert!(fs::read_to_string(path).unwrap().contains("t-SNE Scatterplot of Journal Embeddings"));
    }
}
