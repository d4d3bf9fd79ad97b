mod cli;
mod page;
mod snapshot;

use std::fs::File;

use anyhow::Context;
use clap::Parser;
use simplelog::{Config, LevelFilter, SimpleLogger, WriteLogger};
use tableview_lib::config::EngineConfig;

use crate::cli::Cli;

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    match &cli.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            WriteLogger::init(level, Config::default(), file)?;
        }
        None => SimpleLogger::init(level, Config::default())?,
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            EngineConfig::from_json(&json)
                .with_context(|| format!("Invalid engine config in {}", path.display()))?
        }
        None => EngineConfig::default(),
    };

    let rows = snapshot::load_rows(&cli.rows)?;
    log::info!("Loaded {} rows from {}", rows.len(), cli.rows.display());
    let columns = if cli.columns.is_empty() {
        snapshot::column_keys(&rows)
    } else {
        cli.columns.clone()
    };
    let state = page::parse_query(&cli.query)?;

    let page = page::render(rows, &columns, state, config).await?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&page.to_json())?);
    } else {
        println!("{}", page.to_text());
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    if let Err(e) = run(cli).await {
        log::error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
