//! CLI entry point for the teammate delta tool.
//!
//! Provides subcommands for ranking drivers by finishing-position delta to
//! their teammates across many seasons, printing a single session's results,
//! and listing a season calendar.

use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use f1_teammates::analyzers::aggregate::{MINIMUM_SESSION_THRESHOLD, aggregate_outcomes};
use f1_teammates::analyzers::rank::rank_drivers;
use f1_teammates::analyzers::types::Leaderboard;
use f1_teammates::config::Settings;
use f1_teammates::curation::ExclusionList;
use f1_teammates::output::{print_leaderboard, write_csv, write_json};
use f1_teammates::results::ResultsTable;
use f1_teammates::session::{SessionKind, parse_year};
use f1_teammates::sources::csv_dir::CsvDirSource;
use f1_teammates::sources::ergast::ErgastClient;
use f1_teammates::sources::{SessionLoader, SessionSource};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "f1_teammates")]
#[command(about = "Rank Formula 1 drivers by how they finish against their teammates", long_about = None)]
struct Cli {
    /// Where session results come from
    #[arg(long, value_enum, global = true)]
    source: Option<SourceKind>,

    /// Root of the CSV session directory (implies --source csv, overrides F1_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// Maximum number of sessions loaded concurrently
    #[arg(short, long, default_value_t = 4, global = true)]
    concurrency: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    /// Ergast-compatible HTTP API
    Ergast,
    /// Local CSV directory
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate teammate deltas over a range of seasons and rank drivers
    Teammates {
        /// Session kind to aggregate (race, qualifying, sprint, fp1..fp3)
        #[arg(short, long, default_value = "race")]
        kind: SessionKind,

        /// First season (inclusive)
        #[arg(long, default_value_t = 2010, value_parser = parse_year)]
        from: i32,

        /// Last season (inclusive)
        #[arg(long, default_value_t = 2021, value_parser = parse_year)]
        to: i32,

        /// Drivers need more than this many sessions to be ranked
        #[arg(long, default_value_t = MINIMUM_SESSION_THRESHOLD)]
        min_sessions: u32,

        /// JSON file with extra sessions to exclude
        #[arg(long)]
        exclusions: Option<String>,

        /// Write the leaderboard as JSON to this file
        #[arg(long)]
        json: Option<String>,

        /// Write the leaderboard as CSV to this file
        #[arg(long)]
        csv: Option<String>,
    },
    /// Show the results for a session
    Results {
        #[arg(value_parser = parse_year)]
        year: i32,

        /// Round number or part of the event name, e.g. "monza"
        weekend: String,

        /// Session kind (race, qualifying, sprint, fp1..fp3)
        session: SessionKind,
    },
    /// List the rounds of a season
    Schedule {
        #[arg(value_parser = parse_year)]
        year: i32,
    },
}

/// Colored stderr plus a JSON daily-rolling log file.
fn init_tracing(log_file_path: &str) -> Result<WorkerGuard> {
    let log_dir = Path::new(log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("f1_teammates.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(guard)
}

fn build_source(cli: &Cli, settings: &Settings) -> Result<Arc<dyn SessionSource>> {
    let data_dir = cli.data_dir.clone().or_else(|| settings.data_dir.clone());
    let kind = cli.source.unwrap_or(if data_dir.is_some() {
        SourceKind::Csv
    } else {
        SourceKind::Ergast
    });

    match kind {
        SourceKind::Csv => {
            let Some(dir) = data_dir else {
                bail!("--source csv needs --data-dir or F1_DATA_DIR");
            };
            info!(data_dir = %dir, "Reading sessions from CSV directory");
            Ok(Arc::new(CsvDirSource::new(dir)))
        }
        SourceKind::Ergast => {
            info!(base_url = %settings.ergast_base_url, "Reading sessions from Ergast API");
            Ok(Arc::new(ErgastClient::new(
                &settings.ergast_base_url,
                settings.http_timeout,
            )?))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let settings = Settings::from_env()?;
    let _log_guard = init_tracing(&settings.log_file_path)?;

    let cli = Cli::parse();
    let source = build_source(&cli, &settings)?;

    match cli.command {
        Commands::Teammates {
            kind,
            from,
            to,
            min_sessions,
            exclusions,
            json,
            csv,
        } => {
            if from > to {
                bail!("--from ({from}) must not be after --to ({to})");
            }

            let mut exclusion_list = ExclusionList::known_corrupted();
            if let Some(path) = &exclusions {
                exclusion_list.extend_from_file(path)?;
            }
            info!(rules = exclusion_list.len(), "Curation rules loaded");

            let loader = SessionLoader::new(source, vec![kind])
                .with_concurrency(cli.concurrency)
                .with_exclusions(exclusion_list.clone());
            let outcomes = loader.load_for_years(from..=to).await;

            let report = aggregate_outcomes(outcomes, exclusion_list, min_sessions)
                .context("aggregation aborted")?;
            for skipped in &report.skipped {
                warn!(
                    year = skipped.year,
                    round = skipped.round,
                    kind = %skipped.kind,
                    reason = %skipped.reason,
                    "Session skipped"
                );
            }

            let leaderboard = Leaderboard {
                generated_at: Utc::now(),
                session_kind: kind,
                first_year: from,
                last_year: to,
                min_sessions,
                sessions_folded: report.sessions_folded,
                sessions_excluded: report.sessions_excluded,
                error_count: report.error_count(),
                drivers: rank_drivers(&report.drivers),
            };

            print_leaderboard(&leaderboard)?;
            if let Some(path) = &json {
                write_json(path, &leaderboard)?;
                info!(path = %path, "Leaderboard JSON written");
            }
            if let Some(path) = &csv {
                write_csv(path, &leaderboard.drivers)?;
                info!(path = %path, "Leaderboard CSV written");
            }
        }
        Commands::Results {
            year,
            weekend,
            session,
        } => {
            let loader = SessionLoader::new(source, vec![session]);
            let sessions = loader.load_for_weekend(year, &weekend).await?;
            for session in &sessions {
                print!("{}", ResultsTable::from_session(session));
            }
        }
        Commands::Schedule { year } => {
            let events = source.schedule(year).await?;
            info!(year, rounds = events.len(), "Schedule fetched");
            for event in &events {
                let date = event
                    .date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "TBC".to_string());
                println!("{:>2}  {}  {}", event.round, date, event.name);
            }
        }
    }

    Ok(())
}
