//! Teammate delta derivation and aggregation.
//!
//! Sessions are paired up per team, turned into signed finishing-position
//! deltas, folded into per-driver running averages across the whole corpus,
//! filtered by sample size and ranked.

pub mod aggregate;
pub mod delta;
pub mod pairing;
pub mod rank;
pub mod types;
pub mod utility;
