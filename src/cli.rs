use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "qbank",
    version,
    about = "Import certification question banks into a local SQLite store"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Import(ImportArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    /// JSON files or single-directory patterns such as `data/*aws*.json`.
    pub targets: Vec<String>,

    #[arg(long, env = "QBANK_DB_PATH", default_value = "qbank.sqlite")]
    pub db_path: PathBuf,

    #[arg(long)]
    pub summary_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, env = "QBANK_DB_PATH", default_value = "qbank.sqlite")]
    pub db_path: PathBuf,
}
