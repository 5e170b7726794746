//! Command line arguments

use crate::logging::LogFormat;
use clap::{Args, Parser, Subcommand};
use querylens_drivers::EngineTarget;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "querylens", version, about = "Query performance analyzer and index advisor")]
pub struct Cli {
    /// Log output format (logs go to stderr; RUST_LOG sets the level)
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run statements, measure them and print plan-based advice
    Analyze(AnalyzeArgs),

    /// Print the key a statement is grouped under in query stats
    Normalize {
        #[arg(value_name = "SQL")]
        sql: String,
    },
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// SQL script run before analysis, e.g. schema and fixtures
    #[arg(long, value_name = "FILE")]
    pub setup: Option<PathBuf>,

    /// Print the analysis as JSON
    #[arg(long)]
    pub json: bool,

    /// Optimizer config file (TOML)
    #[arg(long, value_name = "FILE", env = "QUERYLENS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Slow query threshold in milliseconds, overrides the config file
    #[arg(long, value_name = "MS")]
    pub slow_ms: Option<u64>,

    /// Also print aggregate stats over all analyzed statements
    #[arg(long)]
    pub stats: bool,

    /// Statements to analyze, in order
    #[arg(required = true, value_name = "SQL")]
    pub statements: Vec<String>,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct TargetArgs {
    /// SQLite database file (`:memory:` for a scratch database)
    #[arg(long, value_name = "FILE")]
    pub sqlite: Option<PathBuf>,

    /// PostgreSQL connection string or URL
    #[arg(long, value_name = "CONN")]
    pub postgres: Option<String>,
}

impl TargetArgs {
    pub fn engine_target(&self) -> EngineTarget {
        match (&self.sqlite, &self.postgres) {
            (_, Some(conn_str)) => EngineTarget::postgres(conn_str.clone()),
            (Some(path), None) => EngineTarget::sqlite(path.clone()),
            // clap requires exactly one of the two
            (None, None) => EngineTarget::SqliteMemory,
        }
    }
}
