//! Display shaping for raw session results.
//!
//! Races show status, qualifying shows the three segment times, practice
//! sessions dump every column we have.

use std::fmt;

use chrono::TimeDelta;
use serde::Serialize;

use crate::session::{Session, SessionKind, SessionRecord};

/// Formats a lap time as `m:ss.mmm`.
pub fn format_lap_time(lap: TimeDelta) -> String {
    let millis = lap.num_milliseconds();
    format!(
        "{}:{:02}.{:03}",
        millis / 60_000,
        (millis / 1000) % 60,
        millis % 1000
    )
}

fn lap_cell(lap: Option<TimeDelta>) -> String {
    lap.map(format_lap_time).unwrap_or_default()
}

fn position_cell(record: &SessionRecord) -> String {
    record.position.map(|p| p.to_string()).unwrap_or_default()
}

/// A titled table ready to print or to hand to a chat front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultsTable {
    pub title: String,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl ResultsTable {
    pub fn from_session(session: &Session) -> Self {
        let records = session.results.by_position();
        let (headers, rows): (Vec<&'static str>, Vec<Vec<String>>) = match session.meta.kind {
            SessionKind::Race | SessionKind::Sprint => (
                vec!["FullName", "Position", "TeamName", "Status"],
                records
                    .iter()
                    .map(|r| {
                        vec![
                            r.full_name.clone(),
                            position_cell(r),
                            r.team_name.clone(),
                            r.status.clone().unwrap_or_default(),
                        ]
                    })
                    .collect(),
            ),
            SessionKind::Qualifying => (
                vec!["FullName", "Position", "TeamName", "Q1", "Q2", "Q3"],
                records
                    .iter()
                    .map(|r| {
                        vec![
                            r.full_name.clone(),
                            position_cell(r),
                            r.team_name.clone(),
                            lap_cell(r.q1),
                            lap_cell(r.q2),
                            lap_cell(r.q3),
                        ]
                    })
                    .collect(),
            ),
            _ => (
                vec![
                    "DriverNumber",
                    "Abbreviation",
                    "FullName",
                    "TeamName",
                    "Position",
                    "Status",
                ],
                records
                    .iter()
                    .map(|r| {
                        vec![
                            r.number.clone(),
                            r.abbreviation.clone(),
                            r.full_name.clone(),
                            r.team_name.clone(),
                            position_cell(r),
                            r.status.clone().unwrap_or_default(),
                        ]
                    })
                    .collect(),
            ),
        };

        Self {
            title: format!(
                "{} {} - {}",
                session.meta.year, session.meta.event_name, session.meta.kind
            ),
            headers,
            rows,
        }
    }
}

fn render_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(c, w)| format!("{c:<w$}", w = *w))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

impl fmt::Display for ResultsTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", render_line(self.headers.iter().copied(), &widths))?;
        for row in &self.rows {
            writeln!(f, "{}", render_line(row.iter().map(String::as_str), &widths))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::record;
    use crate::session::{SessionMeta, SessionResults};

    fn session(kind: SessionKind, records: Vec<SessionRecord>) -> Session {
        Session {
            meta: SessionMeta {
                year: 2021,
                round: 1,
                event_name: "Bahrain Grand Prix".to_string(),
                kind,
                date: None,
            },
            results: SessionResults::from_records(records).unwrap(),
        }
    }

    #[test]
    fn test_format_lap_time() {
        assert_eq!(format_lap_time(TimeDelta::milliseconds(88_997)), "1:28.997");
        assert_eq!(format_lap_time(TimeDelta::milliseconds(61_005)), "1:01.005");
        assert_eq!(format_lap_time(TimeDelta::milliseconds(59_000)), "0:59.000");
    }

    #[test]
    fn test_race_table_sorted_by_position() {
        let table = ResultsTable::from_session(&session(
            SessionKind::Race,
            vec![
                record("11", "PER", "Red Bull", 5),
                record("44", "HAM", "Mercedes", 1),
            ],
        ));

        assert_eq!(table.headers, vec!["FullName", "Position", "TeamName", "Status"]);
        assert_eq!(table.rows[0][0], "Driver HAM");
        assert_eq!(table.rows[1][1], "5");
        assert_eq!(table.title, "2021 Bahrain Grand Prix - Race");
    }

    #[test]
    fn test_qualifying_table_formats_lap_times() {
        let mut ver = record("33", "VER", "Red Bull", 1);
        ver.q1 = Some(TimeDelta::milliseconds(90_499));
        ver.q3 = Some(TimeDelta::milliseconds(88_997));

        let table = ResultsTable::from_session(&session(SessionKind::Qualifying, vec![ver]));
        assert_eq!(table.rows[0][3], "1:30.499");
        assert_eq!(table.rows[0][4], "");
        assert_eq!(table.rows[0][5], "1:28.997");
    }

    #[test]
    fn test_practice_table_has_all_columns() {
        let table = ResultsTable::from_session(&session(
            SessionKind::Practice2,
            vec![record("4", "NOR", "McLaren", 3)],
        ));
        assert_eq!(table.headers.len(), 6);
        assert_eq!(table.rows[0][1], "NOR");
    }

    #[test]
    fn test_display_aligns_columns() {
        let table = ResultsTable::from_session(&session(
            SessionKind::Race,
            vec![record("44", "HAM", "Mercedes", 1)],
        ));
        let rendered = table.to_string();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("FullName    Position"));
        assert!(lines[2].starts_with("Driver HAM  1       "));
    }
}
