//! Attribution keys and the weights assigned to them.
use std::{fmt, str::FromStr};

use derive_more::From;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Separator between the parts of a composite attribution key, e.g.
/// `"google_ads:-:brand-campaign"`.
pub const KEY_DELIMITER: &str = ":-:";

/// Property value used for a touchpoint that carries no marketing attribution (direct traffic).
pub const NONE_VALUE: &str = "$none";

/// Credit assigned to an attribution key for one conversion.
///
/// A list of these for a single entity sums to 1.0, except for
/// [`AttributionMethod::Influence`](crate::AttributionMethod::Influence) where every touched key
/// gets weight 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, From)]
#[serde(rename_all = "camelCase")]
pub struct AttributionKeyWeight {
    /// Attribution key, possibly composite.
    pub key: String,
    /// Share of the conversion credited to the key.
    pub weight: f64,
}

impl AttributionKeyWeight {
    /// Create a weight for `key`.
    pub fn new(key: impl Into<String>, weight: f64) -> Self {
        Self {
            key: key.into(),
            weight,
        }
    }
}

impl From<(&str, f64)> for AttributionKeyWeight {
    fn from((key, weight): (&str, f64)) -> Self {
        Self::new(key, weight)
    }
}

/// Dimension a touchpoint is attributed on.
///
/// Some dimensions produce composite keys that are prefixed with the parent dimensions (an ad
/// group key also names its channel and campaign), so the direct/none key for them is composite
/// too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributionKeyDimension {
    /// Ad campaign, prefixed with its channel.
    Campaign,
    /// Traffic source.
    Source,
    /// Ad group, prefixed with its channel and campaign.
    AdGroup,
    /// Search keyword, prefixed with channel, campaign, ad group and match type.
    Keyword,
    /// Channel group.
    ChannelGroup,
    /// First page of the session.
    LandingPage,
    /// Every page viewed.
    AllPageView,
}

impl AttributionKeyDimension {
    /// Number of parent parts prepended to keys of this dimension.
    ///
    /// - Campaign: channel.
    /// - AdGroup: channel, campaign.
    /// - Keyword: channel, campaign, ad group, match type.
    pub fn added_keys_size(self) -> usize {
        match self {
            Self::Campaign => 1,
            Self::AdGroup => 2,
            Self::Keyword => 4,
            Self::Source | Self::ChannelGroup | Self::LandingPage | Self::AllPageView => 0,
        }
    }

    /// Key that denotes "no marketing attribution" under this dimension.
    ///
    /// ```
    /// # use attribution_core::AttributionKeyDimension;
    /// assert_eq!(AttributionKeyDimension::Source.none_key(), "$none");
    /// assert_eq!(AttributionKeyDimension::Campaign.none_key(), "$none:-:$none");
    /// ```
    pub fn none_key(self) -> String {
        vec![NONE_VALUE; self.added_keys_size() + 1].join(KEY_DELIMITER)
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Campaign => "Campaign",
            Self::Source => "Source",
            Self::AdGroup => "AdGroup",
            Self::Keyword => "Keyword",
            Self::ChannelGroup => "ChannelGroup",
            Self::LandingPage => "LandingPage",
            Self::AllPageView => "AllPageView",
        }
    }
}

impl fmt::Display for AttributionKeyDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributionKeyDimension {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_owned()))
            .map_err(|_| Error::UnknownAttributionKey(s.to_owned()))
    }
}

/// Join the parts of a composite attribution key.
pub fn composite_key<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut key = String::new();
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            key.push_str(KEY_DELIMITER);
        }
        key.push_str(part.as_ref());
    }
    key
}
