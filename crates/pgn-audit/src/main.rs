//! PGN Audit - replays every game in a set of PGN files and reports the
//! first illegal move of each.

use clap::Parser;
use pgn_audit::batch::{audit_games, GameJob, Tally};
use pgn_audit::config::AuditConfig;
use pgn_audit::json_output::write_json;
use pgn_audit::pgn::split_games;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// PGN Audit - checks recorded games for illegal moves.
#[derive(Parser)]
#[command(name = "pgn-audit")]
#[command(about = "Checks PGN files for illegal moves")]
struct Args {
    /// PGN files or glob patterns, added to the configured inputs
    files: Vec<String>,

    /// Path to the TOML configuration file [default: audit.toml if present]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of worker threads
    #[arg(long)]
    workers: Option<usize>,

    /// Write a JSON report to this path
    #[arg(long)]
    json: Option<PathBuf>,

    /// Start each game from the previous game's final board
    #[arg(long)]
    keep_board: bool,
}

impl Args {
    fn apply(self, config: &mut AuditConfig) {
        config.inputs.extend(self.files);
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(json) = self.json {
            config.report = Some(json);
        }
        if self.keep_board {
            config.reset_between_games = false;
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AuditConfig::load_from(path)?,
        None => AuditConfig::load()?,
    };
    args.apply(&mut config);

    let inputs = config.resolve_inputs()?;
    if inputs.is_empty() {
        anyhow::bail!("No PGN files to audit");
    }

    let mut jobs = Vec::new();
    for path in inputs {
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                let games = split_games(&text);
                tracing::info!("Loaded {} games from {:?}", games.len(), path);
                jobs.extend(
                    games
                        .into_iter()
                        .map(|game| GameJob::new(Some(path.clone()), game)),
                );
            }
            Err(e) => tracing::error!("Failed to read {:?}: {}", path, e),
        }
    }

    let audits = audit_games(jobs, config.workers, config.reset_between_games);
    for audit in &audits {
        println!("{}", audit);
    }
    println!("{}", Tally::from_audits(&audits));

    if let Some(report) = &config.report {
        write_json(report, &audits)?;
        tracing::info!("Report written to {:?}", report);
    }
    Ok(())
}
