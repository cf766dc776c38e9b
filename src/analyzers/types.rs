//! Data types used by the teammate delta pipeline.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::session::{DriverAbbrev, DriverNumber, SessionKind};

/// Two driver numbers that shared a team in one session.
///
/// Driver numbers are not stable across seasons, so a pair is only meaningful
/// inside the session it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TeammatePair(pub DriverNumber, pub DriverNumber);

/// One driver's derived result for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedDriverSessionData {
    pub number: DriverNumber,
    pub abbreviation: DriverAbbrev,
    pub full_name: String,
    pub finish_pos: u32,
    /// Positions ahead of the teammate. Finishing 1st against a teammate in
    /// 4th gives +3; the teammate gets -3.
    pub teammate_delta: i64,
}

/// Corpus-wide result for one driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateDriverData {
    pub name: String,
    pub abbreviation: DriverAbbrev,
    pub avg_teammate_delta: f64,
    pub num_sessions: u32,
}

impl fmt::Display for AggregateDriverData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - avg: {:.4}, sessions: {}",
            self.name, self.avg_teammate_delta, self.num_sessions
        )
    }
}

/// A session that contributed nothing because it could not be loaded or was
/// malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSession {
    pub year: i32,
    pub round: u32,
    pub kind: SessionKind,
    pub reason: String,
}

/// Ranked output of one aggregation run, serialized for `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct Leaderboard {
    pub generated_at: DateTime<Utc>,
    pub session_kind: SessionKind,
    pub first_year: i32,
    pub last_year: i32,
    pub min_sessions: u32,
    pub sessions_folded: usize,
    pub sessions_excluded: usize,
    pub error_count: usize,
    pub drivers: Vec<AggregateDriverData>,
}
