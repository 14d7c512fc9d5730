//! Names of the supported attribution methods.
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Credit-distribution algorithm, serialized with its query name (e.g. `"Time_Decay"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributionMethod {
    /// Full credit to the earliest touch.
    #[serde(rename = "First_Touch")]
    FirstTouch,
    /// Full credit to the earliest non-direct touch.
    #[serde(rename = "First_Touch_ND")]
    FirstTouchNonDirect,
    /// Full credit to the latest touch.
    #[serde(rename = "Last_Touch")]
    LastTouch,
    /// Full credit to the latest non-direct touch.
    #[serde(rename = "Last_Touch_ND")]
    LastTouchNonDirect,
    /// Half credit each to the first and last touch.
    #[serde(rename = "U_Shaped")]
    UShaped,
    /// Fixed shares for the first, middle and last touch.
    #[serde(rename = "W_Shaped")]
    WShaped,
    /// Equal credit to every touch.
    #[serde(rename = "Linear")]
    Linear,
    /// Credit halving with every half-life before the conversion.
    #[serde(rename = "Time_Decay")]
    TimeDecay,
    /// Every touched key gets weight 1. Results are *not* normalized.
    #[serde(rename = "Influence")]
    Influence,
}

impl AttributionMethod {
    /// All supported methods.
    pub const ALL: [AttributionMethod; 9] = [
        Self::FirstTouch,
        Self::FirstTouchNonDirect,
        Self::LastTouch,
        Self::LastTouchNonDirect,
        Self::UShaped,
        Self::WShaped,
        Self::Linear,
        Self::TimeDecay,
        Self::Influence,
    ];

    /// Name used in queries.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstTouch => "First_Touch",
            Self::FirstTouchNonDirect => "First_Touch_ND",
            Self::LastTouch => "Last_Touch",
            Self::LastTouchNonDirect => "Last_Touch_ND",
            Self::UShaped => "U_Shaped",
            Self::WShaped => "W_Shaped",
            Self::Linear => "Linear",
            Self::TimeDecay => "Time_Decay",
            Self::Influence => "Influence",
        }
    }

    /// Returns `true` if weights produced by this method sum to 1.0.
    pub fn is_normalized(self) -> bool {
        self != Self::Influence
    }
}

impl fmt::Display for AttributionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributionMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| Error::UnknownMethod(s.to_owned()))
    }
}
