//! Session results providers and the loader that walks a season range.
//!
//! [`SessionSource`] is the seam to the outside world: it lists a season's
//! events and loads one session's results. [`SessionLoader`] drives a source
//! over years and session kinds, drops curated sessions before they are
//! fetched and turns every failure into a [`LoadOutcome::Failed`] so one bad
//! session never sinks a whole run.

pub mod csv_dir;
pub mod ergast;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::analyzers::types::SkippedSession;
use crate::curation::ExclusionList;
use crate::error::LoadError;
use crate::session::{Session, SessionKind};

/// A race weekend on a season calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub year: i32,
    /// Round 0 is pre-season testing.
    pub round: u32,
    pub name: String,
    pub date: Option<NaiveDate>,
}

/// Abstraction over a provider of historical session results.
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// Returns the season calendar in round order.
    async fn schedule(&self, year: i32) -> Result<Vec<Event>, LoadError>;

    /// Loads the results of one session of `event`.
    async fn load_session(&self, event: &Event, kind: SessionKind) -> Result<Session, LoadError>;
}

/// Per-session result of a load attempt.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(Session),
    /// Matched a curation rule and was never fetched.
    Excluded {
        year: i32,
        round: u32,
        kind: SessionKind,
    },
    Failed(SkippedSession),
}

/// Finds a weekend by round number or by case-insensitive event name
/// substring.
pub fn resolve_event<'a>(events: &'a [Event], weekend: &str) -> Option<&'a Event> {
    let weekend = weekend.trim();
    if let Ok(round) = weekend.parse::<u32>() {
        return events.iter().find(|e| e.round == round);
    }
    let needle = weekend.to_lowercase();
    events
        .iter()
        .find(|e| e.name.to_lowercase().contains(&needle))
}

pub struct SessionLoader {
    source: Arc<dyn SessionSource>,
    kinds: Vec<SessionKind>,
    concurrency: usize,
    exclusions: ExclusionList,
}

impl SessionLoader {
    pub fn new(source: Arc<dyn SessionSource>, kinds: Vec<SessionKind>) -> Self {
        Self {
            source,
            kinds,
            concurrency: 1,
            exclusions: ExclusionList::empty(),
        }
    }

    /// Maximum number of sessions loaded at once.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Sessions matching these rules are reported as excluded instead of
    /// being loaded.
    pub fn with_exclusions(mut self, exclusions: ExclusionList) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Loads every configured session kind for every non-testing round of
    /// each year.
    ///
    /// Outcomes come back in (year, round, kind) order regardless of how the
    /// loads interleave.
    #[tracing::instrument(skip(self, years), fields(kinds = ?self.kinds, concurrency = self.concurrency))]
    pub async fn load_for_years(&self, years: impl IntoIterator<Item = i32>) -> Vec<LoadOutcome> {
        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.concurrency));
        let mut outcomes = Vec::new();

        for year in years {
            let events = match self.source.schedule(year).await {
                Ok(events) => events,
                Err(e) => {
                    warn!(year, error = %e, "Schedule unavailable, skipping season");
                    for kind in &self.kinds {
                        outcomes.push(LoadOutcome::Failed(SkippedSession {
                            year,
                            round: 0,
                            kind: *kind,
                            reason: format!("schedule unavailable: {e}"),
                        }));
                    }
                    continue;
                }
            };

            let mut tasks = Vec::new();
            for event in events {
                // Testing sessions have a round number but no usable results.
                if event.round == 0 {
                    continue;
                }
                for kind in &self.kinds {
                    let kind = *kind;
                    if self.exclusions.excludes(&event.name, year, kind) {
                        debug!(year, round = event.round, event = %event.name, kind = %kind, "Session excluded by curation rules");
                        tasks.push((event.round, kind, None));
                        continue;
                    }

                    let source = Arc::clone(&self.source);
                    let sem = Arc::clone(&semaphore);
                    let event = event.clone();
                    let round = event.round;

                    let task = tokio::spawn(async move {
                        let _permit = sem.acquire().await.ok();
                        source.load_session(&event, kind).await
                    });
                    tasks.push((round, kind, Some(task)));
                }
            }

            for (round, kind, task) in tasks {
                let Some(task) = task else {
                    outcomes.push(LoadOutcome::Excluded { year, round, kind });
                    continue;
                };
                let result = match task.await {
                    Ok(result) => result.map_err(|e| e.to_string()),
                    Err(e) => Err(format!("load task failed: {e}")),
                };
                match result {
                    Ok(session) => {
                        debug!(session = %session.meta, drivers = session.results.len(), "Session loaded");
                        outcomes.push(LoadOutcome::Loaded(session));
                    }
                    Err(reason) => {
                        warn!(year, round, kind = %kind, reason = %reason, "Session failed to load");
                        outcomes.push(LoadOutcome::Failed(SkippedSession {
                            year,
                            round,
                            kind,
                            reason,
                        }));
                    }
                }
            }
        }

        let failed = outcomes
            .iter()
            .filter(|o| matches!(o, LoadOutcome::Failed(_)))
            .count();
        let excluded = outcomes
            .iter()
            .filter(|o| matches!(o, LoadOutcome::Excluded { .. }))
            .count();
        info!(total = outcomes.len(), failed, excluded, "Session loading finished");
        outcomes
    }

    /// Loads the configured session kinds for one weekend.
    #[tracing::instrument(skip(self))]
    pub async fn load_for_weekend(&self, year: i32, weekend: &str) -> Result<Vec<Session>, LoadError> {
        let events = self.source.schedule(year).await?;
        let event = resolve_event(&events, weekend).ok_or_else(|| {
            LoadError::NotFound(format!("Could not find race '{weekend}' in {year}."))
        })?;

        let mut sessions = Vec::with_capacity(self.kinds.len());
        for kind in &self.kinds {
            sessions.push(self.source.load_session(event, *kind).await?);
        }
        Ok(sessions)
    }
}
