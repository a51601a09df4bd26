//! Abstracta: scholarly abstract harvesting and text analysis.
//! Entry point for the pipeline binary.

use std::path::{Path, PathBuf};

use abstracta_common::Settings;
use abstracta_embed::OllamaEmbedder;
use abstracta_ingestion::pipeline::run_collection;
use abstracta_ingestion::sources::crossref::CrossRefClient;
use abstracta_nlp::RuleAnnotator;
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "abstracta")]
#[command(author, version, about = "Harvest, preprocess, contrast and embed scholarly abstracts")]
#[command(propagate_version = true)]
struct Cli {
    /// Settings file.
    #[arg(long, short, global = true, env = "ABSTRACTA_CONFIG", default_value = "abstracta.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Stage,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Harvest author and journal publications from CrossRef.
    Collect,
    /// Clean abstracts, tokenise them and detect phrases.
    Preprocess,
    /// Render the lexical contrast charts.
    Contrast,
    /// Build the vector store, smoke-check it and plot the t-SNE projection.
    Embed,
    /// Every stage in order.
    RunAll,
}

/// One runnable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Collect,
    Preprocess,
    Contrast,
    Embed,
}

impl Stage {
    fn steps(self) -> &'static [Step] {
        match self {
            Stage::Collect => &[Step::Collect],
            Stage::Preprocess => &[Step::Preprocess],
            Stage::Contrast => &[Step::Contrast],
            Stage::Embed => &[Step::Embed],
            Stage::RunAll => &[Step::Collect, Step::Preprocess, Step::Contrast, Step::Embed],
        }
    }
}

fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let settings = Settings::load(path).with_context(|| format!("Could not load {}", path.display()))?;
    info!(
        path = %path.display(),
        scholars = settings.scholars.len(),
        journals = settings.journals.len(),
        model = %settings.embedding.model,
        "Settings loaded"
    );
    Ok(settings)
}

async fn run_step(step: Step, settings: &Settings) -> anyhow::Result<()> {
    match step {
        Step::Collect => {
            info!("===== Collecting data =====");
            let api = CrossRefClient::new(&settings.crossref)?;
            run_collection(api, settings).await.context("collect stage failed")?;
        }
        Step::Preprocess => {
            info!("===== Preprocessing abstracts =====");
            let prepared = abstracta_nlp::run_preprocess(settings, &RuleAnnotator::new())
                .context("preprocess stage failed")?;
            info!(
                authors = prepared.authors.len(),
                journals = prepared.journals.len(),
                "Preprocessing complete"
            );
        }
        Step::Contrast => {
            info!("===== Rendering contrast charts =====");
            let charts = abstracta_lexical::run_contrast(settings).context("contrast stage failed")?;
            info!(charts = charts.len(), dir = %settings.paths.output_dir.display(), "Charts saved");
        }
        Step::Embed => {
            info!("===== Building semantic index =====");
            let embedder = OllamaEmbedder::new(&settings.embedding)?;
            let report = abstracta_embed::run_indexing(settings, &embedder)
                .await
                .context("embed stage failed")?;
            info!(
                documents = report.documents,
                rebuilt = report.built,
                scatterplot = %report.scatterplot.display(),
                "Embedding complete"
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("abstracta=debug,info")),
        )
        .init();

    let cli = Cli::parse();
    info!("Abstracta {}", env!("CARGO_PKG_VERSION"));

    let settings = load_settings(&cli.config)?;
    for &step in cli.command.steps() {
        run_step(step, &settings).await?;
    }

    info!("***** Processing complete *****");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_stage_and_config() {
        let cli = Cli::try_parse_from(["abstracta", "--config", "custom.toml", "run-all"]).unwrap();
        assert_eq!(cli.command, Stage::RunAll);
        assert_eq!(cli.config, PathBuf::from("custom.toml"));

        let cli = Cli::try_parse_from(["abstracta", "embed", "-c", "x.toml"]).unwrap();
        assert_eq!(cli.command, Stage::Embed);
        assert_eq!(cli.config, PathBuf::from("x.toml"));
    }

    #[test]
    fn test_config_path_resolution() {
        let cmd = Cli::command();
        let config = cmd
            .get_arguments()
            .find(|a| a.get_id() == "config")
            .unwrap();
        assert_eq!(config.get_env(), Some(std::ffi::OsStr::new("ABSTRACTA_CONFIG")));
        assert_eq!(config.get_default_values(), &[std::ffi::OsStr::new("abstracta.toml")]);
    }

    #[test]
    fn test_unknown_stage_rejected() {
        assert!(Cli::try_parse_from(["abstracta", "scrape"]).is_err());
    }

    #[test]
    fn test_run_all_expands_in_order() {
        assert_eq!(
            Stage::RunAll.steps(),
            &[Step::Collect, Step::Preprocess, Step::Contrast, Step::Embed]
        );
        assert_eq!(Stage::Contrast.steps(), &[Step::Contrast]);
    }
}
