//! Typed session results.
//!
//! Every provider hands its rows to [`RawRecord::into_record`], so positions,
//! lap times and required fields are validated once at the boundary instead of
//! wherever they happen to be read.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::SessionDataError;

/// Providers key drivers by the string form of their car number.
pub type DriverNumber = String;

/// Three-letter driver code, e.g. VER, HAM, GAS.
pub type DriverAbbrev = String;

/// The first Formula 1 world championship season.
pub const FIRST_SEASON: i32 = 1950;

/// One timed on-track segment of a race weekend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SessionKind {
    #[serde(rename = "Practice 1", alias = "fp1")]
    Practice1,
    #[serde(rename = "Practice 2", alias = "fp2")]
    Practice2,
    #[serde(rename = "Practice 3", alias = "fp3")]
    Practice3,
    #[serde(rename = "Qualifying", alias = "qualifying")]
    Qualifying,
    #[serde(rename = "Sprint", alias = "sprint")]
    Sprint,
    #[serde(rename = "Race", alias = "race")]
    Race,
}

impl SessionKind {
    /// Human readable name, as printed on timing screens.
    pub fn name(&self) -> &'static str {
        match self {
            SessionKind::Practice1 => "Practice 1",
            SessionKind::Practice2 => "Practice 2",
            SessionKind::Practice3 => "Practice 3",
            SessionKind::Qualifying => "Qualifying",
            SessionKind::Sprint => "Sprint",
            SessionKind::Race => "Race",
        }
    }

    /// File-name friendly identifier.
    pub fn slug(&self) -> &'static str {
        match self {
            SessionKind::Practice1 => "fp1",
            SessionKind::Practice2 => "fp2",
            SessionKind::Practice3 => "fp3",
            SessionKind::Qualifying => "qualifying",
            SessionKind::Sprint => "sprint",
            SessionKind::Race => "race",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SessionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect();

        match normalized.as_str() {
            "r" | "race" | "gp" => Ok(SessionKind::Race),
            "q" | "quali" | "qualifying" => Ok(SessionKind::Qualifying),
            "s" | "sprint" => Ok(SessionKind::Sprint),
            "fp1" | "p1" | "practice1" => Ok(SessionKind::Practice1),
            "fp2" | "p2" | "practice2" => Ok(SessionKind::Practice2),
            "fp3" | "p3" | "practice3" => Ok(SessionKind::Practice3),
            _ => Err(format!("Could not parse session string: {s}")),
        }
    }
}

/// Identifying metadata for a loaded session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMeta {
    pub year: i32,
    pub round: u32,
    pub event_name: String,
    pub kind: SessionKind,
    pub date: Option<NaiveDate>,
}

impl fmt::Display for SessionMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} (round {}) {}",
            self.year, self.event_name, self.round, self.kind
        )
    }
}

/// One driver's row in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub number: DriverNumber,
    pub abbreviation: DriverAbbrev,
    pub full_name: String,
    pub team_name: String,
    /// 1-based classified position; `None` when the provider left it blank.
    pub position: Option<u32>,
    pub status: Option<String>,
    pub q1: Option<TimeDelta>,
    pub q2: Option<TimeDelta>,
    pub q3: Option<TimeDelta>,
}

/// A row exactly as a provider supplies it, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    pub driver_number: String,
    pub abbreviation: Option<String>,
    pub full_name: Option<String>,
    pub team_name: Option<String>,
    pub position: Option<String>,
    pub status: Option<String>,
    pub q1: Option<String>,
    pub q2: Option<String>,
    pub q3: Option<String>,
}

impl RawRecord {
    pub fn into_record(self) -> Result<SessionRecord, SessionDataError> {
        let number = self.driver_number.trim().to_string();
        if number.is_empty() {
            return Err(SessionDataError::MissingField {
                number,
                field: "driver_number",
            });
        }

        let required = |value: Option<String>, field: &'static str| {
            non_empty(value).ok_or_else(|| SessionDataError::MissingField {
                number: number.clone(),
                field,
            })
        };

        let abbreviation = required(self.abbreviation, "abbreviation")?;
        let full_name = required(self.full_name, "full_name")?;
        let team_name = required(self.team_name, "team_name")?;
        let position = parse_position(&number, self.position.as_deref())?;

        Ok(SessionRecord {
            abbreviation,
            full_name,
            team_name,
            position,
            status: non_empty(self.status),
            q1: optional_lap_time(self.q1)?,
            q2: optional_lap_time(self.q2)?,
            q3: optional_lap_time(self.q3)?,
            number,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn optional_lap_time(value: Option<String>) -> Result<Option<TimeDelta>, SessionDataError> {
    non_empty(value).map(|v| parse_lap_time(&v)).transpose()
}

/// Parses a classified position.
///
/// Blank means "not classified" and yields `None`. Providers that export
/// floating point columns write `3.0`, which is accepted as long as it is a
/// whole number. Zero, negative and non-numeric values are rejected.
pub fn parse_position(number: &str, value: Option<&str>) -> Result<Option<u32>, SessionDataError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    let invalid = || SessionDataError::InvalidPosition {
        number: number.to_string(),
        value: raw.to_string(),
    };

    let position = match raw.parse::<u32>() {
        Ok(p) => p,
        Err(_) => {
            let f: f64 = raw.parse().map_err(|_| invalid())?;
            if !f.is_finite() || f.fract() != 0.0 || f < 1.0 || f > u32::MAX as f64 {
                return Err(invalid());
            }
            f as u32
        }
    };

    if position == 0 {
        return Err(invalid());
    }
    Ok(Some(position))
}

/// Parses `m:ss.fff` or `ss.fff` into a duration with millisecond precision.
pub fn parse_lap_time(value: &str) -> Result<TimeDelta, SessionDataError> {
    let invalid = || SessionDataError::InvalidLapTime {
        value: value.to_string(),
    };
    let trimmed = value.trim();

    let (minutes, rest) = match trimmed.split_once(':') {
        Some((m, rest)) => (m.parse::<i64>().map_err(|_| invalid())?, rest),
        None => (0, trimmed),
    };
    let (secs, frac) = rest.split_once('.').unwrap_or((rest, ""));

    if secs.is_empty() || frac.len() > 3 || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let secs: i64 = secs.parse().map_err(|_| invalid())?;
    let millis: i64 = if frac.is_empty() {
        0
    } else {
        format!("{frac:0<3}").parse().map_err(|_| invalid())?
    };
    if minutes < 0 || secs < 0 {
        return Err(invalid());
    }

    minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(secs))
        .and_then(|s| s.checked_mul(1000))
        .and_then(|ms| ms.checked_add(millis))
        .and_then(TimeDelta::try_milliseconds)
        .ok_or_else(invalid)
}

/// Parses a season year for the CLI. Usable as a clap `value_parser`.
pub fn parse_year(s: &str) -> Result<i32, String> {
    let year: i32 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a valid year"))?;
    if year < FIRST_SEASON {
        return Err(format!("Formula 1 started in {FIRST_SEASON}..."));
    }
    Ok(year)
}

/// A session's results keyed by driver number.
///
/// At most one record per driver number; construction fails otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionResults {
    records: BTreeMap<DriverNumber, SessionRecord>,
}

impl SessionResults {
    pub fn from_records(
        records: impl IntoIterator<Item = SessionRecord>,
    ) -> Result<Self, SessionDataError> {
        let mut map = BTreeMap::new();
        for record in records {
            if map.contains_key(&record.number) {
                return Err(SessionDataError::DuplicateDriverNumber {
                    number: record.number,
                });
            }
            map.insert(record.number.clone(), record);
        }
        Ok(Self { records: map })
    }

    /// Validates and collects provider rows.
    pub fn from_raw(rows: impl IntoIterator<Item = RawRecord>) -> Result<Self, SessionDataError> {
        let records = rows
            .into_iter()
            .map(RawRecord::into_record)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_records(records)
    }

    pub fn get(&self, number: &str) -> Option<&SessionRecord> {
        self.records.get(number)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SessionRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ordered by classified position, unclassified drivers last.
    pub fn by_position(&self) -> Vec<&SessionRecord> {
        let mut rows: Vec<_> = self.records.values().collect();
        rows.sort_by_key(|r| (r.position.is_none(), r.position));
        rows
    }
}

/// A loaded session: metadata plus validated results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub meta: SessionMeta,
    pub results: SessionResults,
}
