use crate::analyzers::pairing::get_teammates;
use crate::analyzers::types::{DerivedDriverSessionData, TeammatePair};
use crate::error::SessionDataError;
use crate::session::SessionResults;

/// Derives both drivers' records for one teammate pair.
///
/// The deltas are exact negations of each other. A number missing from the
/// results, or a driver with no classified position, is an error: the
/// session is malformed and must not contribute an invented record.
pub fn derive_pair(
    pair: &TeammatePair,
    results: &SessionResults,
) -> Result<[DerivedDriverSessionData; 2], SessionDataError> {
    let to_derived = |number: &str| -> Result<DerivedDriverSessionData, SessionDataError> {
        let record = results
            .get(number)
            .ok_or_else(|| SessionDataError::MissingDriver {
                number: number.to_string(),
            })?;
        let finish_pos = record
            .position
            .ok_or_else(|| SessionDataError::MissingPosition {
                number: number.to_string(),
            })?;

        Ok(DerivedDriverSessionData {
            number: record.number.clone(),
            abbreviation: record.abbreviation.clone(),
            full_name: record.full_name.clone(),
            finish_pos,
            teammate_delta: 0,
        })
    };

    let mut first = to_derived(&pair.0)?;
    let mut second = to_derived(&pair.1)?;

    first.teammate_delta = i64::from(second.finish_pos) - i64::from(first.finish_pos);
    second.teammate_delta = -first.teammate_delta;

    Ok([first, second])
}

/// Converts one session's results into per-driver teammate deltas.
///
/// A positive delta means the driver finished ahead of their teammate.
pub fn compute_teammate_deltas(
    results: &SessionResults,
) -> Result<Vec<DerivedDriverSessionData>, SessionDataError> {
    let mut derived = Vec::new();
    for pair in get_teammates(results) {
        derived.extend(derive_pair(&pair, results)?);
    }
    Ok(derived)
}
