use std::path::PathBuf;

use clap::Parser;

/// Command-line flags. Flags that are given override the config file.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Serve and record 2048 high scores")]
pub struct Args {
    /// Optional TOML config file (host, port, database).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// SQLite database file (default scores.db).
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,
    /// Host name or IP to bind (default 0.0.0.0).
    #[arg(long)]
    pub host: Option<String>,
    /// Port to bind (default 3001).
    #[arg(long)]
    pub port: Option<u16>,
    /// Optional tracing filter, e.g. "info", "debug".
    #[arg(long, default_value = "info")]
    pub log: String,
}
