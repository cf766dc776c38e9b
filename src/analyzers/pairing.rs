use std::collections::BTreeMap;

use crate::analyzers::types::TeammatePair;
use crate::session::SessionResults;

/// Returns the pairs of drivers who were teammates in this session.
///
/// Teams that ran one car, or three or more, are omitted entirely. Three-car
/// entries only show up in some practice sessions, and those drivers simply
/// do not contribute to the metric.
pub fn get_teammates(results: &SessionResults) -> Vec<TeammatePair> {
    let mut teams: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for record in results.iter() {
        teams
            .entry(record.team_name.as_str())
            .or_default()
            .push(record.number.as_str());
    }

    teams
        .into_values()
        .filter_map(|drivers| match drivers.as_slice() {
            [a, b] => Some(TeammatePair(a.to_string(), b.to_string())),
            _ => None,
        })
        .collect()
}
