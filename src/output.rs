//! Output of a ranked leaderboard.
//!
//! Supports plain-text printing, JSON export and CSV export.

use std::fs::File;
use std::io::{self, Write};

use anyhow::{Context, Result};
use csv::WriterBuilder;
use tracing::{debug, info};

use crate::analyzers::types::{AggregateDriverData, Leaderboard};

/// Writes one line per driver followed by the error summary.
pub fn write_leaderboard(out: &mut impl Write, leaderboard: &Leaderboard) -> io::Result<()> {
    for (rank, driver) in leaderboard.drivers.iter().enumerate() {
        writeln!(out, "{:>3}. {}", rank + 1, driver)?;
    }
    writeln!(out, "Encountered {} errors.", leaderboard.error_count)
}

/// Prints the leaderboard to stdout and logs a run summary.
pub fn print_leaderboard(leaderboard: &Leaderboard) -> Result<()> {
    info!(
        kind = %leaderboard.session_kind,
        first_year = leaderboard.first_year,
        last_year = leaderboard.last_year,
        drivers = leaderboard.drivers.len(),
        sessions_folded = leaderboard.sessions_folded,
        sessions_excluded = leaderboard.sessions_excluded,
        errors = leaderboard.error_count,
        "Teammate delta leaderboard"
    );

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_leaderboard(&mut handle, leaderboard)?;
    handle.flush()?;
    Ok(())
}

/// Writes the leaderboard as pretty-printed JSON, replacing any existing file.
pub fn write_json(path: &str, leaderboard: &Leaderboard) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create '{path}'"))?;
    serde_json::to_writer_pretty(file, leaderboard)?;
    debug!(path, "Wrote leaderboard JSON");
    Ok(())
}

/// Writes one CSV row per ranked driver, with a header.
pub fn write_csv(path: &str, drivers: &[AggregateDriverData]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create '{path}'"))?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for driver in drivers {
        writer.serialize(driver)?;
    }
    writer.flush()?;

    debug!(path, rows = drivers.len(), "Wrote leaderboard CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionKind;
    use chrono::Utc;
    use std::fs;

    fn leaderboard() -> Leaderboard {
        Leaderboard {
            generated_at: Utc::now(),
            session_kind: SessionKind::Race,
            first_year: 2010,
            last_year: 2021,
            min_sessions: 18,
            sessions_folded: 200,
            sessions_excluded: 0,
            error_count: 2,
            drivers: vec![
                AggregateDriverData {
                    name: "Fernando Alonso".to_string(),
                    abbreviation: "ALO".to_string(),
                    avg_teammate_delta: 3.25,
                    num_sessions: 120,
                },
                AggregateDriverData {
                    name: "Lance Stroll".to_string(),
                    abbreviation: "STR".to_string(),
                    avg_teammate_delta: -1.5,
                    num_sessions: 60,
                },
            ],
        }
    }

    #[test]
    fn test_write_leaderboard_lines() {
        let mut out = Vec::new();
        write_leaderboard(&mut out, &leaderboard()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "  1. Fernando Alonso - avg: 3.2500, sessions: 120");
        assert_eq!(lines[1], "  2. Lance Stroll - avg: -1.5000, sessions: 60");
        assert_eq!(lines[2], "Encountered 2 errors.");
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaderboard.json");
        let path = path.to_str().unwrap();

        write_json(path, &leaderboard()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["session_kind"], "Race");
        assert_eq!(value["drivers"][0]["abbreviation"], "ALO");
        assert_eq!(value["error_count"], 2);
    }

    #[test]
    fn test_write_csv_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaderboard.csv");
        let path = path.to_str().unwrap();

        write_csv(path, &leaderboard().drivers).unwrap();

        let content = fs::read_to_string(path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "name,abbreviation,avg_teammate_delta,num_sessions");
        assert_eq!(lines[1], "Fernando Alonso,ALO,3.25,120");
    }
}
