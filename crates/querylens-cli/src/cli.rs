//! `querylens` command line
//!
//! ```text
//! querylens analyze --sqlite app.db --setup schema.sql "SELECT * FROM users WHERE email = 'a'"
//! querylens analyze --postgres "host=localhost user=postgres" --json "SELECT 1"
//! querylens normalize "SELECT * FROM t WHERE id = $1"
//! ```

mod args;
mod logging;
mod render;

use anyhow::Context as _;
use args::{AnalyzeArgs, Cli, Command};
use clap::Parser;
use querylens_core::{DatabaseEngine, OptimizerConfig};
use querylens_query::QueryOptimizer;
use serde::Serialize;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_format)?;

    match cli.command {
        Command::Analyze(args) => analyze(args).await,
        Command::Normalize { sql } => {
            println!("{}", querylens_analyzer::normalize(&sql));
            Ok(())
        }
    }
}

/// Everything `analyze --json` prints
#[derive(Serialize)]
struct AnalyzeReport {
    analyses: Vec<querylens_query::QueryAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<querylens_query::QueryStats>,
}

async fn analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    let target = args.target.engine_target();

    let engine = querylens_drivers::connect(&target)
        .await
        .with_context(|| format!("failed to open {}", target))?;

    if let Some(setup) = &args.setup {
        let sql = std::fs::read_to_string(setup)
            .with_context(|| format!("failed to read setup file {}", setup.display()))?;
        engine
            .execute_batch(&sql)
            .await
            .with_context(|| format!("setup script {} failed", setup.display()))?;
        tracing::info!(path = %setup.display(), "setup script applied");
    }

    let optimizer = QueryOptimizer::with_config(engine, &config)?;

    let mut analyses = Vec::with_capacity(args.statements.len());
    for sql in &args.statements {
        let analysis = optimizer
            .analyze_query(sql)
            .await
            .with_context(|| format!("analysis failed for: {}", sql))?;
        analyses.push(analysis);
    }

    let stats = args.stats.then(|| optimizer.get_query_stats());

    if args.json {
        let report = AnalyzeReport { analyses, stats };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for analysis in &analyses {
            println!("{}", render::analysis(analysis));
        }
        if let Some(stats) = &stats {
            println!("{}", render::stats(stats));
        }
    }

    Ok(())
}

fn load_config(args: &AnalyzeArgs) -> anyhow::Result<OptimizerConfig> {
    let config = match &args.config {
        Some(path) => OptimizerConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => OptimizerConfig::load_or_default().context("failed to load default config")?,
    };

    Ok(match args.slow_ms {
        Some(ms) => config.with_slow_query_threshold_ms(ms),
        None => config,
    })
}
