//! Standalone HTML rendering of contrast charts.

use std::fs;
use std::path::{Path, PathBuf};

use minijinja::{context, Environment};
use tracing::info;

use crate::contrast::ContrastChart;
use crate::error::Result;

const TEMPLATE: &str = include_str!("../templates/scattertext.html");

/// Render `chart` as a self-contained HTML page (Plotly from its CDN).
pub fn render_chart(chart: &ContrastChart) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("scattertext.html", TEMPLATE)?;
    let labels = serde_json::json!({
        "category": chart.category_name,
        "not_category": chart.not_category_name,
        "left": chart.left_caption,
        "right": chart.right_caption,
    });
    let html = env.get_template("scattertext.html")?.render(context! {
        chart => chart,
        points_json => script_json(&serde_json::to_string(&chart.points)?),
        labels_json => script_json(&labels.to_string()),
    })?;
    Ok(html)
}

/// Write the rendered chart to `<out_dir>/<stem>_scattertext.html`.
pub fn write_chart(chart: &ContrastChart, out_dir: &Path, stem: &str) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(chart_file_name(stem));
    fs::write(&path, render_chart(chart)?)?;
    info!(path = %path.display(), terms = chart.points.len(), "Chart written");
    Ok(path)
}

/// File name for a category label; path separators and other characters
/// unsafe in file names become `_`.
pub fn chart_file_name(stem: &str) -> String {
    let safe: String = stem
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{safe}_scattertext.html")
}

/// JSON safe to embed inside a `<script>` element.
fn script_json(json: &str) -> String {
    json.replace("</", "<\\/")
}
