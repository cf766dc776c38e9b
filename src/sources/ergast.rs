//! Session source backed by an Ergast-compatible JSON API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::error::LoadError;
use crate::session::{RawRecord, Session, SessionKind, SessionMeta, SessionResults};
use crate::sources::{Event, SessionSource};

#[derive(Deserialize)]
struct ErgastResponse {
    #[serde(rename = "MRData")]
    mr_data: MrData,
}

#[derive(Deserialize)]
struct MrData {
    #[serde(rename = "RaceTable")]
    race_table: RaceTable,
}

#[derive(Deserialize)]
struct RaceTable {
    #[serde(rename = "Races", default)]
    races: Vec<Race>,
}

#[derive(Deserialize)]
struct Race {
    round: String,
    #[serde(rename = "raceName")]
    race_name: String,
    date: Option<String>,
    #[serde(rename = "Results", default)]
    results: Vec<ResultRow>,
    #[serde(rename = "QualifyingResults", default)]
    qualifying_results: Vec<ResultRow>,
    #[serde(rename = "SprintResults", default)]
    sprint_results: Vec<ResultRow>,
}

#[derive(Deserialize)]
struct ResultRow {
    number: String,
    position: Option<String>,
    #[serde(rename = "Driver")]
    driver: Driver,
    #[serde(rename = "Constructor")]
    constructor: Constructor,
    status: Option<String>,
    #[serde(rename = "Q1")]
    q1: Option<String>,
    #[serde(rename = "Q2")]
    q2: Option<String>,
    #[serde(rename = "Q3")]
    q3: Option<String>,
}

#[derive(Deserialize)]
struct Driver {
    code: Option<String>,
    #[serde(rename = "givenName")]
    given_name: String,
    #[serde(rename = "familyName")]
    family_name: String,
}

#[derive(Deserialize)]
struct Constructor {
    name: String,
}

impl From<ResultRow> for RawRecord {
    fn from(row: ResultRow) -> Self {
        RawRecord {
            driver_number: row.number,
            abbreviation: row.driver.code,
            full_name: Some(format!("{} {}", row.driver.given_name, row.driver.family_name)),
            team_name: Some(row.constructor.name),
            position: row.position,
            status: row.status,
            q1: row.q1,
            q2: row.q2,
            q3: row.q3,
        }
    }
}

/// Path segment for a session kind's results, if the API publishes them.
fn endpoint(kind: SessionKind) -> Result<&'static str, LoadError> {
    match kind {
        SessionKind::Race => Ok("results"),
        SessionKind::Qualifying => Ok("qualifying"),
        SessionKind::Sprint => Ok("sprint"),
        other => Err(LoadError::Unsupported {
            kind: other.to_string(),
        }),
    }
}

fn parse_body(body: &str) -> Result<Vec<Race>, LoadError> {
    let response: ErgastResponse =
        serde_json::from_str(body).map_err(|e| LoadError::Parse(e.to_string()))?;
    Ok(response.mr_data.race_table.races)
}

/// Parses a season calendar response.
pub fn parse_schedule(body: &str, year: i32) -> Result<Vec<Event>, LoadError> {
    parse_body(body)?
        .into_iter()
        .map(|race| {
            let round = race
                .round
                .parse::<u32>()
                .map_err(|_| LoadError::Parse(format!("invalid round '{}'", race.round)))?;
            Ok(Event {
                year,
                round,
                name: race.race_name,
                date: race
                    .date
                    .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
            })
        })
        .collect()
}

/// Parses a results, qualifying or sprint response for one event.
pub fn parse_session(body: &str, event: &Event, kind: SessionKind) -> Result<Session, LoadError> {
    let race = parse_body(body)?
        .into_iter()
        .next()
        .ok_or_else(|| LoadError::NotFound(format!("no {kind} results for {}", event.name)))?;

    let rows = match kind {
        SessionKind::Qualifying => race.qualifying_results,
        SessionKind::Sprint => race.sprint_results,
        _ => race.results,
    };
    if rows.is_empty() {
        return Err(LoadError::NotFound(format!(
            "no {kind} results for {}",
            event.name
        )));
    }

    Ok(Session {
        meta: SessionMeta {
            year: event.year,
            round: event.round,
            event_name: event.name.clone(),
            kind,
            date: event.date,
        },
        results: SessionResults::from_raw(rows.into_iter().map(RawRecord::from))?,
    })
}

pub struct ErgastClient {
    base_url: String,
    client: reqwest::Client,
}

impl ErgastClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LoadError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn get_text(&self, path: &str) -> Result<String, LoadError> {
        let url = format!("{}/{}?limit=100", self.base_url, path);
        debug!(url = %url, "Requesting");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LoadError::Status { status, body });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl SessionSource for ErgastClient {
    async fn schedule(&self, year: i32) -> Result<Vec<Event>, LoadError> {
        let body = self.get_text(&format!("{year}.json")).await?;
        parse_schedule(&body, year)
    }

    async fn load_session(&self, event: &Event, kind: SessionKind) -> Result<Session, LoadError> {
        let segment = endpoint(kind)?;
        let body = self
            .get_text(&format!("{}/{}/{}.json", event.year, event.round, segment))
            .await?;
        parse_session(&body, event, kind)
    }
}
