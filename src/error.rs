//! Error types shared by the session boundary, the aggregation pipeline and
//! the session sources.
//!
//! Errors are split by blast radius: [`SessionDataError`] spoils a single
//! session's contribution, [`AggregationError`] spoils the whole corpus, and
//! [`LoadError`] comes from the external provider.

/// Malformed data inside one session. The caller skips the session and keeps
/// going.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionDataError {
    #[error("driver #{number} is not present in the session results")]
    MissingDriver { number: String },

    #[error("driver #{number} has no classified position")]
    MissingPosition { number: String },

    #[error("driver #{number} has invalid position '{value}'")]
    InvalidPosition { number: String, value: String },

    #[error("driver #{number} is missing required field '{field}'")]
    MissingField { number: String, field: &'static str },

    #[error("driver #{number} appears more than once in the session results")]
    DuplicateDriverNumber { number: String },

    #[error("invalid lap time '{value}'")]
    InvalidLapTime { value: String },
}

/// Corpus-wide failures. These abort the aggregation run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregationError {
    #[error(
        "abbreviation '{abbreviation}' maps to both '{existing}' and '{found}'; \
         refusing to merge two identities"
    )]
    IdentityCollision {
        abbreviation: String,
        existing: String,
        found: String,
    },
}

/// Failures reported by a [`SessionSource`](crate::sources::SessionSource).
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not parse provider response: {0}")]
    Parse(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{kind} sessions are not available from this source")]
    Unsupported { kind: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Data(#[from] SessionDataError),
}
