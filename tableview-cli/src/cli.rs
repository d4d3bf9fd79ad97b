use std::path::PathBuf;

use clap::Parser;

/// Show one page of a table view over a JSON row snapshot.
#[derive(Debug, Parser)]
#[command(name = "tableview", version, about)]
pub struct Cli {
    /// JSON array of row objects; each needs an `id`.
    pub rows: PathBuf,

    /// View as address parameters, e.g. `page=2&size=10&sort=name&dir=desc`.
    #[arg(short, long, default_value = "")]
    pub query: String,

    /// Columns to show and search, in order. Defaults to the first row's keys.
    #[arg(short, long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Engine configuration (JSON).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the page as JSON instead of a text table.
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
