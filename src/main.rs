//! NBA against-the-spread board: daily refresh, full backfill and league rankings.

use anyhow::{bail, Result};
use ats_board::config::Config;
use ats_board::engine::compute_metrics;
use ats_board::engine::rankings::{rank_teams, RankedTeam};
use ats_board::feed::http::HttpSource;
use ats_board::pipeline::Pipeline;
use ats_board::store::SnapshotStore;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ats-board")]
#[command(about = "NBA against-the-spread snapshots and metrics", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Treat this date (YYYY-MM-DD) as today instead of the display zone's current date
    #[arg(long, global = true)]
    date: Option<NaiveDate>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh today's teams and write the run report (default)
    Run,
    /// Refresh every team's snapshot
    Backfill,
    /// Print league rankings from stored snapshots
    Rankings,
}

fn print_ranked(title: &str, ranked: &[RankedTeam], value_label: &str) {
    println!("{title}");
    println!("{}", "-".repeat(72));
    for (i, r) in ranked.iter().enumerate() {
        println!(
            "{:2}. {:30} {value_label}: {:+7.2}  ATS: {}",
            i + 1,
            r.team.display_name(),
            r.value,
            r.metrics.ats_record()
        );
    }
    println!();
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ats_board=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    let today = cli
        .date
        .unwrap_or_else(|| config.display.to_local(Utc::now()).date_naive());

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let report_path = config.storage.report_path.clone();
            let pipeline = Pipeline::new(HttpSource::new(&config.sources)?, config);
            let report = pipeline.run_daily(today).await?;

            for f in &report.failures {
                tracing::error!(team = %f.team, kind = ?f.kind, "{}", f.message);
            }
            if report.is_total_failure() {
                bail!(
                    "every refresh failed ({} teams); report not written",
                    report.failures.len()
                );
            }
            report.write(&report_path)?;
            tracing::info!(
                path = %report_path.display(),
                games = report.matchups.len(),
                fresh = report.fresh_count(),
                failed = report.failures.len(),
                "run report written"
            );
        }
        Commands::Backfill => {
            let pipeline = Pipeline::new(HttpSource::new(&config.sources)?, config);
            let report = pipeline.backfill_all(today).await;

            println!("Refreshed {} of 30 teams", report.refreshed.len());
            for entry in &report.refreshed {
                println!(
                    "  {:30} {:3} games  {} skipped",
                    entry.team.display_name(),
                    entry.games,
                    entry.skipped_rows
                );
            }
            if !report.all_succeeded() {
                for f in &report.failures {
                    println!("  FAILED {:30} {}", f.team.display_name(), f.message);
                }
                bail!("{} teams failed to refresh", report.failures.len());
            }
        }
        Commands::Rankings => {
            let store = SnapshotStore::new(config.storage.data_dir.clone());
            let teams: Vec<_> = store
                .load_all()
                .into_iter()
                .map(|(team, records)| (team, compute_metrics(&records)))
                .collect();
            if teams.is_empty() {
                println!("No team data available.");
                return Ok(());
            }
            let rankings = rank_teams(&teams, 10);
            print_ranked("MOST UNDERVALUED (value index)", &rankings.most_undervalued, "VI");
            print_ranked("MOST OVERVALUED (value index)", &rankings.most_overvalued, "VI");
            print_ranked("BEST COVER RATE (%)", &rankings.best_cover_rate, "CR");
            print_ranked("WORST COVER RATE (%)", &rankings.worst_cover_rate, "CR");
        }
    }

    Ok(())
}
