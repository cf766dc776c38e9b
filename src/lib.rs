pub mod analyzers;
pub mod config;
pub mod curation;
pub mod error;
pub mod output;
pub mod results;
pub mod session;
pub mod sources;
