use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use crate::analyzers::delta::compute_teammate_deltas;
use crate::analyzers::types::{AggregateDriverData, SkippedSession};
use crate::analyzers::utility::RunningAverage;
use crate::curation::ExclusionList;
use crate::error::AggregationError;
use crate::session::{DriverAbbrev, Session};
use crate::sources::LoadOutcome;

/// Drivers need strictly more than this many contributing sessions to be
/// ranked.
pub const MINIMUM_SESSION_THRESHOLD: u32 = 18;

/// What happened to a session handed to [`TeammateAggregator::fold`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FoldOutcome {
    /// The session's derived records were folded in.
    Folded { records: usize },
    /// The session matched a curation rule and was ignored.
    Excluded,
    /// The session was malformed and contributed nothing.
    Skipped(SkippedSession),
}

/// Result of a complete fold.
#[derive(Debug, Clone, Default)]
pub struct AggregateReport {
    /// Drivers above the sample threshold, keyed by abbreviation.
    pub drivers: BTreeMap<DriverAbbrev, AggregateDriverData>,
    pub sessions_folded: usize,
    pub sessions_excluded: usize,
    pub skipped: Vec<SkippedSession>,
}

impl AggregateReport {
    pub fn error_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Folds sessions into per-driver running averages of teammate delta.
///
/// Abbreviations are the aggregation key, so each must keep resolving to the
/// same full name for the whole run. The first name seen for an abbreviation
/// wins and any later disagreement aborts the run.
#[derive(Debug, Default)]
pub struct TeammateAggregator {
    exclusions: ExclusionList,
    name_lookup: HashMap<DriverAbbrev, String>,
    averages: BTreeMap<DriverAbbrev, RunningAverage>,
    sessions_folded: usize,
    sessions_excluded: usize,
    skipped: Vec<SkippedSession>,
}

impl TeammateAggregator {
    pub fn new(exclusions: ExclusionList) -> Self {
        Self {
            exclusions,
            ..Default::default()
        }
    }

    /// Folds one session.
    ///
    /// Malformed sessions are recorded as skipped and the fold carries on.
    /// Nothing from a session is folded unless all of its records are valid.
    pub fn fold(&mut self, session: &Session) -> Result<FoldOutcome, AggregationError> {
        let meta = &session.meta;

        if self.exclusions.is_excluded(meta) {
            debug!(session = %meta, "Session excluded by curation rules");
            self.sessions_excluded += 1;
            return Ok(FoldOutcome::Excluded);
        }

        let derived = match compute_teammate_deltas(&session.results) {
            Ok(derived) => derived,
            Err(e) => {
                warn!(session = %meta, error = %e, "Skipping malformed session");
                let skipped = SkippedSession {
                    year: meta.year,
                    round: meta.round,
                    kind: meta.kind,
                    reason: e.to_string(),
                };
                self.skipped.push(skipped.clone());
                return Ok(FoldOutcome::Skipped(skipped));
            }
        };

        for driver in &derived {
            match self.name_lookup.get(&driver.abbreviation) {
                Some(existing) if *existing != driver.full_name => {
                    return Err(AggregationError::IdentityCollision {
                        abbreviation: driver.abbreviation.clone(),
                        existing: existing.clone(),
                        found: driver.full_name.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    self.name_lookup
                        .insert(driver.abbreviation.clone(), driver.full_name.clone());
                }
            }
        }

        for driver in &derived {
            self.averages
                .entry(driver.abbreviation.clone())
                .or_default()
                .add(driver.teammate_delta);
        }

        self.sessions_folded += 1;
        debug!(session = %meta, records = derived.len(), "Session folded");
        Ok(FoldOutcome::Folded {
            records: derived.len(),
        })
    }

    /// Counts a session the loader dropped by curation rules before fetching.
    pub fn record_exclusion(&mut self) {
        self.sessions_excluded += 1;
    }

    /// Counts a session the source could not deliver.
    pub fn record_failure(&mut self, skipped: SkippedSession) {
        self.skipped.push(skipped);
    }

    /// Materializes the averages, keeping drivers with more than
    /// `min_sessions` contributing sessions.
    pub fn finish(self, min_sessions: u32) -> AggregateReport {
        let name_lookup = self.name_lookup;
        let drivers = self
            .averages
            .into_iter()
            .filter(|(_, avg)| avg.count() > min_sessions)
            .filter_map(|(abbrev, avg)| {
                let name = name_lookup.get(&abbrev)?.clone();
                Some((
                    abbrev.clone(),
                    AggregateDriverData {
                        name,
                        abbreviation: abbrev,
                        avg_teammate_delta: avg.compute(),
                        num_sessions: avg.count(),
                    },
                ))
            })
            .collect();

        AggregateReport {
            drivers,
            sessions_folded: self.sessions_folded,
            sessions_excluded: self.sessions_excluded,
            skipped: self.skipped,
        }
    }
}

/// Folds every session with the given curation rules and threshold.
pub fn compute_average_deltas<'a>(
    sessions: impl IntoIterator<Item = &'a Session>,
    exclusions: ExclusionList,
    min_sessions: u32,
) -> Result<AggregateReport, AggregationError> {
    let mut aggregator = TeammateAggregator::new(exclusions);
    for session in sessions {
        aggregator.fold(session)?;
    }
    Ok(aggregator.finish(min_sessions))
}

/// Folds the loader's outcomes in order. Exclusions and load failures are
/// counted, loaded sessions go through curation and the fold.
pub fn aggregate_outcomes(
    outcomes: impl IntoIterator<Item = LoadOutcome>,
    exclusions: ExclusionList,
    min_sessions: u32,
) -> Result<AggregateReport, AggregationError> {
    let mut aggregator = TeammateAggregator::new(exclusions);
    for outcome in outcomes {
        match outcome {
            LoadOutcome::Loaded(session) => {
                aggregator.fold(&session)?;
            }
            LoadOutcome::Excluded { .. } => aggregator.record_exclusion(),
            LoadOutcome::Failed(skipped) => aggregator.record_failure(skipped),
        }
    }
    Ok(aggregator.finish(min_sessions))
}
