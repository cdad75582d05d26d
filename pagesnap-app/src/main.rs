use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pagesnap_common::observability::init_logging;
use pagesnap_config::{PagesnapConfig, PagesnapConfigLoader, default_config_path};
use pagesnap_drivers::snap_browser::driver::SnapDriver;
use pagesnap_tools::{ToolContext, ToolRegistry};
use serde_json::{Value, json};
use tracing::Instrument;
use uuid::Uuid;

mod wiring;

#[derive(Debug, Parser)]
#[command(name = "pagesnap", version, about = "Snapshot live pages and turn them into files")]
struct Cli {
    /// YAML config file (defaults to ./pagesnap.yaml or the user config dir)
    #[arg(long, short, env = "PAGESNAP_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the structured snapshot of a page as JSON
    Scrape { url: String },

    /// Generate an artifact from a page (or given content) and write it
    Save {
        url: String,
        #[arg(long)]
        file_path: Option<String>,
        #[arg(long)]
        append: bool,
        /// Use this text as context instead of scraping the page
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        model: Option<String>,
    },

    /// List the tool definitions exposed to agents
    Tools,
}

fn load_config(explicit: Option<PathBuf>) -> Result<PagesnapConfig> {
    let loader = PagesnapConfigLoader::new();
    let loader = match explicit.or_else(default_config_path) {
        Some(path) => loader.with_file(path),
        None => loader,
    };
    Ok(loader.load()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins)
    let cfg = load_config(cli.config)?;
    let log_path = init_logging(wiring::log_config(&cfg.logging))?;

    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("run", %run_id);
    tracing::debug!(parent: &span, log = %log_path.display(), "logging initialised");

    let output = run(cli.command, &cfg).instrument(span).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(command: Command, cfg: &PagesnapConfig) -> Result<Value> {
    let (url, tool, args) = match command {
        Command::Tools => return Ok(serde_json::to_value(ToolRegistry::list_tools())?),
        Command::Scrape { url } => (url, "webscraping", json!({})),
        Command::Save {
            url,
            file_path,
            append,
            content,
            model,
        } => (
            url,
            "save_file",
            json!({
                "file_path": file_path,
                "append": append,
                "content": content,
                "model_name": model,
            }),
        ),
    };

    let mut driver = SnapDriver::connect(&wiring::driver_options(&cfg.browser)).await?;
    let page = match driver.goto(&url).await {
        Ok(page) => page,
        Err(e) => return closing(Err(e), driver.close()).await,
    };
    tracing::info!(%url, tool, "page opened");

    let model = cfg.artifact.model.clone();
    let backend = Arc::new(wiring::build_router(&cfg.llm, &model));
    let ctx = ToolContext::new(Box::new(page), backend, cfg);
    let result = ToolRegistry::call(tool, Some(args), &ctx).await;

    closing(result.map_err(anyhow::Error::from), driver.close()).await
}

/// Await the session teardown, then hand back `outcome` unchanged.
async fn closing<T>(outcome: Result<T>, close: impl Future<Output = Result<()>>) -> Result<T> {
    if let Err(e) = close.await {
        tracing::warn!(error = %e, "failed to close webdriver session");
    }
    outcome
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    #[tokio::test]
    async fn failed_navigation_still_closes_session() {
        let closed = AtomicBool::new(false);
        let close = async {
            closed.store(true, Ordering::SeqCst);
            Ok::<(), anyhow::Error>(())
        };

        let err = closing::<()>(Err(anyhow::anyhow!("invalid url: nope")), close)
            .await
            .unwrap_err();

        assert!(closed.load(Ordering::SeqCst));
        assert_eq!(err.to_string(), "invalid url: nope");
    }

    #[tokio::test]
    async fn close_failure_does_not_mask_outcome() {
        let close = async { Err::<(), _>(anyhow::anyhow!("session gone")) };
        let value = closing(Ok(7), close).await.unwrap();
        assert_eq!(value, 7);
    }
}
