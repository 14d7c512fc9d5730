//! Lookback and query-period filters deciding which touchpoints may receive credit.
use std::{fmt, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Which filters a touchpoint must pass to be creditable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributionType {
    /// Only the lookback window applies.
    ConversionBased,
    /// The lookback window and the query period both apply.
    EngagementBased,
}

impl AttributionType {
    fn as_str(self) -> &'static str {
        match self {
            Self::ConversionBased => "ConversionBased",
            Self::EngagementBased => "EngagementBased",
        }
    }
}

impl fmt::Display for AttributionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ConversionBased" => Ok(Self::ConversionBased),
            "EngagementBased" => Ok(Self::EngagementBased),
            _ => Err(Error::UnknownAttributionType(s.to_owned())),
        }
    }
}

/// Returns `true` if the touch happened at or before the conversion and no more than
/// `lookback_secs` earlier.
pub fn is_within_lookback(touch_time: i64, conversion_time: i64, lookback_secs: i64) -> bool {
    touch_time <= conversion_time
        && conversion_time
            .checked_sub(touch_time)
            .is_some_and(|elapsed| elapsed <= lookback_secs)
}

/// Returns `true` if `from <= touch_time <= to`.
pub fn is_within_query_period(touch_time: i64, from: i64, to: i64) -> bool {
    from <= touch_time && touch_time <= to
}

/// Convert a lookback in days to seconds, saturating when the lookback is out of range.
pub fn lookback_secs(lookback_days: i64) -> i64 {
    match Duration::try_days(lookback_days) {
        Some(lookback) => lookback.num_seconds(),
        None if lookback_days < 0 => i64::MIN,
        None => i64::MAX,
    }
}

/// Inclusive `[from, to]` range in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPeriod {
    /// Start of the period, unix seconds.
    pub from: i64,
    /// End of the period, unix seconds.
    pub to: i64,
}

impl QueryPeriod {
    /// Create a period from unix seconds.
    pub fn new(from: i64, to: i64) -> Self {
        QueryPeriod { from, to }
    }

    /// Create a period from two instants, truncated to whole seconds.
    pub fn from_dates(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        QueryPeriod {
            from: from.timestamp(),
            to: to.timestamp(),
        }
    }

    /// Returns `true` if `touch_time` falls inside the period, bounds included.
    pub fn contains(&self, touch_time: i64) -> bool {
        is_within_query_period(touch_time, self.from, self.to)
    }
}

/// Everything needed to decide whether one touchpoint is creditable for one conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributionWindow {
    /// Filters that apply.
    pub attribution_type: AttributionType,
    /// Conversion instant, unix seconds.
    pub conversion_time: i64,
    /// Maximum age of a creditable touch at conversion time, in seconds.
    pub lookback_secs: i64,
    /// Only consulted for [`AttributionType::EngagementBased`].
    pub query_period: QueryPeriod,
}

impl AttributionWindow {
    /// Returns `true` if a touch at `touch_time` may receive credit.
    pub fn admits(&self, touch_time: i64) -> bool {
        let in_lookback = is_within_lookback(touch_time, self.conversion_time, self.lookback_secs);
        match self.attribution_type {
            AttributionType::ConversionBased => in_lookback,
            AttributionType::EngagementBased => {
                in_lookback && self.query_period.contains(touch_time)
            }
        }
    }
}
