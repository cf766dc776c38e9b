use std::collections::BTreeMap;

use crate::analyzers::types::AggregateDriverData;
use crate::session::DriverAbbrev;

/// Orders drivers best teammate performance first, i.e. descending by
/// average delta.
///
/// The sort is stable: ties keep the input map's order (alphabetical by
/// abbreviation), so repeated runs rank identically.
pub fn rank_drivers(drivers: &BTreeMap<DriverAbbrev, AggregateDriverData>) -> Vec<AggregateDriverData> {
    let mut ranked: Vec<_> = drivers.values().cloned().collect();
    ranked.sort_by(|a, b| b.avg_teammate_delta.total_cmp(&a.avg_teammate_delta));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver(abbrev: &str, avg: f64) -> (DriverAbbrev, AggregateDriverData) {
        (
            abbrev.to_string(),
            AggregateDriverData {
                name: format!("Driver {abbrev}"),
                abbreviation: abbrev.to_string(),
                avg_teammate_delta: avg,
                num_sessions: 20,
            },
        )
    }

    #[test]
    fn test_rank_descending() {
        let drivers: BTreeMap<_, _> = [driver("ALO", 2.5), driver("STR", -2.5), driver("HAM", 1.2)]
            .into_iter()
            .collect();

        let order: Vec<_> = rank_drivers(&drivers)
            .into_iter()
            .map(|d| d.abbreviation)
            .collect();
        assert_eq!(order, vec!["ALO", "HAM", "STR"]);
    }

    #[test]
    fn test_ties_keep_alphabetical_order() {
        let drivers: BTreeMap<_, _> = [driver("ZHO", 0.5), driver("BOT", 0.5), driver("GAS", 0.5)]
            .into_iter()
            .collect();

        let order: Vec<_> = rank_drivers(&drivers)
            .into_iter()
            .map(|d| d.abbreviation)
            .collect();
        assert_eq!(order, vec!["BOT", "GAS", "ZHO"]);
    }

    #[test]
    fn test_display_row() {
        let (_, d) = driver("VER", 1.0);
        assert_eq!(d.to_string(), "Driver VER - avg: 1.0000, sessions: 20");
    }
}
