use std::sync::Arc;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced while preparing an attribution run.
///
/// Failing to attribute a conversion is not an error: it shows up as an empty weight list (or an
/// absent map entry). Errors only describe a query that cannot be run at all.
#[derive(thiserror::Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// Attribution method name is not one of the supported models.
    #[error("unknown attribution method: {0:?}")]
    UnknownMethod(String),

    /// Attribution type name is neither `ConversionBased` nor `EngagementBased`.
    #[error("unknown attribution type: {0:?}")]
    UnknownAttributionType(String),

    /// Attribution key dimension is not one of the supported dimensions.
    #[error("unknown attribution key: {0:?}")]
    UnknownAttributionKey(String),

    /// Lookback window must not be negative.
    #[error("invalid lookback window: {0} days")]
    InvalidLookback(i64),

    /// Query period starts after it ends.
    #[error("invalid query period (from: {from}, to: {to})")]
    InvalidQueryPeriod {
        /// Start of the period, unix seconds.
        from: i64,
        /// End of the period, unix seconds.
        to: i64,
    },

    /// Time-decay half-life must be a positive, finite number of days.
    #[error("invalid time-decay half-life: {0} days")]
    InvalidHalfLife(f64),

    /// W-shaped position weights must be non-negative and every row must sum to 1.
    #[error("invalid W-shaped weights: {0}")]
    InvalidWShapedWeights(&'static str),

    /// Event type code is neither goal (0) nor linked funnel (1).
    #[error("unknown event type: {0}")]
    UnknownEventType(i64),

    /// Attribution query could not be parsed.
    #[error("error parsing attribution query")]
    // serde_json::Error is not clonable, so we're wrapping it in an Arc.
    QueryParseError(#[source] Arc<serde_json::Error>),
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::QueryParseError(Arc::new(value))
    }
}
