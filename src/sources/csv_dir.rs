//! Session source backed by a local directory of CSV files.
//!
//! ```text
//! <root>/year=<YYYY>/schedule.csv          round,event_name,date
//! <root>/year=<YYYY>/round=<N>/<kind>.csv  driver_number,abbreviation,full_name,team_name,position,status,q1,q2,q3
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::LoadError;
use crate::session::{RawRecord, Session, SessionKind, SessionMeta, SessionResults};
use crate::sources::{Event, SessionSource};

#[derive(Debug, Deserialize)]
struct ScheduleRow {
    round: u32,
    event_name: String,
    date: Option<NaiveDate>,
}

pub struct CsvDirSource {
    root: PathBuf,
}

impl CsvDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn year_dir(&self, year: i32) -> PathBuf {
        self.root.join(format!("year={year}"))
    }

    /// Location of one session's results file.
    pub fn session_path(&self, year: i32, round: u32, kind: SessionKind) -> PathBuf {
        self.year_dir(year)
            .join(format!("round={round}"))
            .join(format!("{}.csv", kind.slug()))
    }

    pub fn schedule_path(&self, year: i32) -> PathBuf {
        self.year_dir(year).join("schedule.csv")
    }
}

fn require_file(path: &Path) -> Result<(), LoadError> {
    if path.exists() {
        Ok(())
    } else {
        Err(LoadError::NotFound(format!("{} does not exist", path.display())))
    }
}

#[async_trait]
impl SessionSource for CsvDirSource {
    async fn schedule(&self, year: i32) -> Result<Vec<Event>, LoadError> {
        let path = self.schedule_path(year);
        require_file(&path)?;

        let mut rdr = csv::Reader::from_path(&path)?;
        let mut events = Vec::new();
        for result in rdr.deserialize() {
            let row: ScheduleRow = result?;
            events.push(Event {
                year,
                round: row.round,
                name: row.event_name,
                date: row.date,
            });
        }
        events.sort_by_key(|e| e.round);

        Ok(events)
    }

    async fn load_session(&self, event: &Event, kind: SessionKind) -> Result<Session, LoadError> {
        let path = self.session_path(event.year, event.round, kind);
        require_file(&path)?;

        let mut rdr = csv::Reader::from_path(&path)?;
        let rows = rdr
            .deserialize::<RawRecord>()
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Session {
            meta: SessionMeta {
                year: event.year,
                round: event.round,
                event_name: event.name.clone(),
                kind,
                date: event.date,
            },
            results: SessionResults::from_raw(rows)?,
        })
    }
}
