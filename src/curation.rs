//! Session admissibility rules.
//!
//! A few sessions in the historical data are corrupted (mostly duplicate
//! driver numbers) and are dropped before aggregation. Extra rules can be
//! loaded from a JSON file:
//!
//! ```json
//! [
//!   { "event_contains": "Russian", "year": 2018, "session": "Qualifying" }
//! ]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::session::{SessionKind, SessionMeta};

/// Known-corrupted sessions as `(event name substring, year, session)`.
static KNOWN_CORRUPTED: &[(&str, i32, SessionKind)] = &[
    ("Russian", 2018, SessionKind::Qualifying),
    ("Romagna", 2020, SessionKind::Qualifying),
];

/// Excludes sessions whose event name contains `event_contains` in the given
/// year and session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRule {
    pub event_contains: String,
    pub year: i32,
    pub session: SessionKind,
}

impl ExclusionRule {
    pub fn matches(&self, event_name: &str, year: i32, kind: SessionKind) -> bool {
        event_name.contains(&self.event_contains) && year == self.year && kind == self.session
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionList {
    rules: Vec<ExclusionRule>,
}

impl ExclusionList {
    pub fn new(rules: Vec<ExclusionRule>) -> Self {
        Self { rules }
    }

    /// A list that admits every session.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in list of known-corrupted sessions.
    pub fn known_corrupted() -> Self {
        Self::new(
            KNOWN_CORRUPTED
                .iter()
                .map(|(event, year, session)| ExclusionRule {
                    event_contains: event.to_string(),
                    year: *year,
                    session: *session,
                })
                .collect(),
        )
    }

    /// Appends the rules from a JSON file at `path`.
    pub fn extend_from_file(&mut self, path: &str) -> Result<()> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read exclusion rules from '{path}'"))?;
        let rules: Vec<ExclusionRule> = serde_json::from_str(&content)
            .with_context(|| format!("invalid exclusion rules in '{path}'"))?;
        self.rules.extend(rules);
        Ok(())
    }

    pub fn is_excluded(&self, meta: &SessionMeta) -> bool {
        self.excludes(&meta.event_name, meta.year, meta.kind)
    }

    /// Checks a calendar entry before anything is loaded for it.
    pub fn excludes(&self, event_name: &str, year: i32, kind: SessionKind) -> bool {
        self.rules
            .iter()
            .any(|rule| rule.matches(event_name, year, kind))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
