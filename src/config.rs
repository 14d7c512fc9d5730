use serde::{Deserialize, Serialize};

use crate::{
    key::NONE_VALUE,
    models::{AttributionMethod, TimeDecay, WShapedWeights},
    window::{lookback_secs, AttributionType, AttributionWindow, QueryPeriod},
    AttributionKeyDimension, Error, Result,
};

/// Tuning shared by the attribution models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelConfig {
    /// Half-life of [`AttributionMethod::TimeDecay`], in days.
    pub half_life_days: f64,
    /// Position weights of [`AttributionMethod::WShaped`].
    pub w_shaped: WShapedWeights,
    /// Key of direct (non-marketing) touchpoints, skipped by the non-direct models.
    pub none_key: String,
}

impl ModelConfig {
    /// Check the tuning keeps every model's invariants: a positive, finite half-life and
    /// W-shaped rows that sum to 1.
    pub fn validate(&self) -> Result<()> {
        if !(self.half_life_days.is_finite() && self.half_life_days > 0.0) {
            return Err(Error::InvalidHalfLife(self.half_life_days));
        }
        self.w_shaped.validate()
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            half_life_days: TimeDecay::DEFAULT_HALF_LIFE_DAYS,
            w_shaped: WShapedWeights::default(),
            none_key: NONE_VALUE.to_owned(),
        }
    }
}

/// Attribution query as received from the query layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawAttributionQuery {
    query_type: String,
    attribution_methodology: String,
    #[serde(default, rename = "attribution_methodology_c")]
    attribution_methodology_compare: Option<String>,
    #[serde(default)]
    attribution_key: Option<String>,
    #[serde(rename = "lbw")]
    lookback_days: i64,
    #[serde(default)]
    from: i64,
    #[serde(default)]
    to: i64,
    #[serde(default)]
    models: Option<ModelConfig>,
}

/// Settings of one attribution run.
///
/// ```
/// # use attribution_core::{AttributionMethod, AttributionQuery, AttributionType};
/// let mut query =
///     AttributionQuery::new(AttributionMethod::Linear, AttributionType::EngagementBased);
/// query.lookback_days(30).query_period(1_704_067_200, 1_706_745_599);
/// assert!(query.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AttributionQuery {
    pub(crate) method: AttributionMethod,
    pub(crate) compare_method: Option<AttributionMethod>,
    pub(crate) attribution_type: AttributionType,
    pub(crate) attribution_key: Option<AttributionKeyDimension>,
    pub(crate) lookback_days: i64,
    pub(crate) query_period: QueryPeriod,
    pub(crate) models: ModelConfig,
}

impl AttributionQuery {
    /// Default lookback window, in days.
    pub const DEFAULT_LOOKBACK_DAYS: i64 = 30;

    /// Create a query with the default lookback and no compare method, key or query period.
    pub fn new(method: AttributionMethod, attribution_type: AttributionType) -> Self {
        AttributionQuery {
            method,
            compare_method: None,
            attribution_type,
            attribution_key: None,
            lookback_days: Self::DEFAULT_LOOKBACK_DAYS,
            query_period: QueryPeriod::new(0, 0),
            models: ModelConfig::default(),
        }
    }

    /// Parse and validate a JSON attribution query.
    ///
    /// ```
    /// # use attribution_core::{AttributionMethod, AttributionQuery};
    /// let query = AttributionQuery::from_json(r#"{
    ///     "query_type": "ConversionBased",
    ///     "attribution_methodology": "Time_Decay",
    ///     "attribution_key": "Campaign",
    ///     "lbw": 14
    /// }"#).unwrap();
    /// assert_eq!(query.method(), AttributionMethod::TimeDecay);
    /// assert_eq!(query.none_key(), "$none:-:$none");
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawAttributionQuery = serde_json::from_str(json)?;

        let mut query = AttributionQuery::new(
            raw.attribution_methodology.parse()?,
            raw.query_type.parse()?,
        );
        query
            .lookback_days(raw.lookback_days)
            .query_period(raw.from, raw.to)
            .models(raw.models.unwrap_or_default());
        if let Some(compare) = raw.attribution_methodology_compare.filter(|s| !s.is_empty()) {
            query.compare_with(compare.parse()?);
        }
        if let Some(key) = raw.attribution_key.filter(|s| !s.is_empty()) {
            query.attribution_key(key.parse()?);
        }

        query.validate().inspect_err(|err| {
            log::warn!(target: "attribution", "rejected attribution query: {}", err);
        })?;
        Ok(query)
    }

    /// Method used for a side-by-side comparison run.
    pub fn compare_with(&mut self, method: AttributionMethod) -> &mut Self {
        self.compare_method = Some(method);
        self
    }

    /// Dimension touchpoints are keyed on. Decides the direct/none key of the non-direct models.
    pub fn attribution_key(&mut self, key: AttributionKeyDimension) -> &mut Self {
        self.attribution_key = Some(key);
        self.models.none_key = key.none_key();
        self
    }

    /// Maximum age of a creditable touch at conversion time, in days.
    pub fn lookback_days(&mut self, lookback_days: i64) -> &mut Self {
        self.lookback_days = lookback_days;
        self
    }

    /// Inclusive `[from, to]` range, in unix seconds, used by engagement-based attribution.
    pub fn query_period(&mut self, from: i64, to: i64) -> &mut Self {
        self.query_period = QueryPeriod::new(from, to);
        self
    }

    /// Override model tuning. The none key is kept when an attribution key is set.
    pub fn models(&mut self, models: ModelConfig) -> &mut Self {
        let none_key = self.attribution_key.map(AttributionKeyDimension::none_key);
        self.models = models;
        if let Some(none_key) = none_key {
            self.models.none_key = none_key;
        }
        self
    }

    /// Check the query can be run.
    pub fn validate(&self) -> Result<()> {
        // Beyond this, converting days to seconds overflows.
        const MAX_LOOKBACK_DAYS: i64 = i64::MAX / 86_400 / 1_000;

        if !(0..=MAX_LOOKBACK_DAYS).contains(&self.lookback_days) {
            return Err(Error::InvalidLookback(self.lookback_days));
        }
        if self.attribution_type == AttributionType::EngagementBased
            && self.query_period.from > self.query_period.to
        {
            return Err(Error::InvalidQueryPeriod {
                from: self.query_period.from,
                to: self.query_period.to,
            });
        }
        self.models.validate()
    }

    /// Primary attribution method.
    pub fn method(&self) -> AttributionMethod {
        self.method
    }

    /// Method of the comparison run, if any.
    pub fn compare_method(&self) -> Option<AttributionMethod> {
        self.compare_method
    }

    /// Filters applied to touchpoints.
    pub fn attribution_type(&self) -> AttributionType {
        self.attribution_type
    }

    /// Key of direct touchpoints for the configured dimension.
    pub fn none_key(&self) -> &str {
        &self.models.none_key
    }

    /// Tuning the models are built with.
    pub fn model_config(&self) -> &ModelConfig {
        &self.models
    }

    /// Window deciding which touchpoints are creditable for a conversion at `conversion_time`.
    pub fn window(&self, conversion_time: i64) -> AttributionWindow {
        AttributionWindow {
            attribution_type: self.attribution_type,
            conversion_time,
            lookback_secs: lookback_secs(self.lookback_days),
            query_period: self.query_period,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        models::AttributionMethod, window::AttributionType, AttributionKeyDimension, Error,
    };

    use super::{AttributionQuery, ModelConfig};

    #[test]
    fn parse_full_query() {
        let query = AttributionQuery::from_json(
            r#"
              {
                "query_type": "EngagementBased",
                "attribution_methodology": "W_Shaped",
                "attribution_methodology_c": "Linear",
                "attribution_key": "AdGroup",
                "lbw": 7,
                "from": 1000,
                "to": 2000,
                "models": { "halfLifeDays": 3.5 }
              }
            "#,
        )
        .unwrap();

        assert_eq!(query.method(), AttributionMethod::WShaped);
        assert_eq!(query.compare_method(), Some(AttributionMethod::Linear));
        assert_eq!(query.attribution_type(), AttributionType::EngagementBased);
        assert_eq!(query.attribution_key, Some(AttributionKeyDimension::AdGroup));
        assert_eq!(query.none_key(), "$none:-:$none:-:$none");
        assert_eq!(query.model_config().half_life_days, 3.5);

        let window = query.window(1_500);
        assert_eq!(window.lookback_secs, 7 * 86_400);
        assert!(window.admits(1_000));
        assert!(!window.admits(999));
    }

    #[test]
    fn empty_compare_method_and_key_are_ignored() {
        let query = AttributionQuery::from_json(
            r#"
              {
                "query_type": "ConversionBased",
                "attribution_methodology": "First_Touch_ND",
                "attribution_methodology_c": "",
                "attribution_key": "",
                "lbw": 0
              }
            "#,
        )
        .unwrap();

        assert_eq!(query.compare_method(), None);
        assert_eq!(query.none_key(), "$none");
    }

    #[test]
    fn reject_unknown_names() {
        let err = AttributionQuery::from_json(
            r#"
              {
                "query_type": "ConversionBased",
                "attribution_methodology": "Last_Campaign_Touch",
                "lbw": 1
              }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownMethod(m) if m == "Last_Campaign_Touch"));

        let err = AttributionQuery::from_json(
            r#"{"query_type": "Engagement", "attribution_methodology": "Linear", "lbw": 1}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownAttributionType(_)));

        let err = AttributionQuery::from_json(
            r#"
              {
                "query_type": "ConversionBased",
                "attribution_methodology": "Linear",
                "attribution_key": "Medium",
                "lbw": 1
              }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownAttributionKey(_)));
    }

    #[test]
    fn reject_malformed_json() {
        let err = AttributionQuery::from_json(r#"{"query_type": 1}"#).unwrap_err();
        assert!(matches!(err, Error::QueryParseError(_)));
    }

    #[test]
    fn validate_lookback_and_period() {
        let mut query =
            AttributionQuery::new(AttributionMethod::Linear, AttributionType::ConversionBased);
        query.lookback_days(-1);
        assert!(matches!(query.validate(), Err(Error::InvalidLookback(-1))));

        query.lookback_days(90).query_period(2_000, 1_000);
        // The period is not consulted for conversion-based attribution.
        assert!(query.validate().is_ok());

        let mut query =
            AttributionQuery::new(AttributionMethod::Linear, AttributionType::EngagementBased);
        query.query_period(2_000, 1_000);
        assert!(matches!(
            query.validate(),
            Err(Error::InvalidQueryPeriod {
                from: 2_000,
                to: 1_000
            })
        ));
    }

    #[test]
    fn models_override_keeps_dimension_none_key() {
        let mut query =
            AttributionQuery::new(AttributionMethod::Linear, AttributionType::ConversionBased);
        query
            .attribution_key(AttributionKeyDimension::Campaign)
            .models(ModelConfig {
                half_life_days: 1.0,
                ..ModelConfig::default()
            });

        assert_eq!(query.none_key(), "$none:-:$none");
        assert_eq!(query.model_config().half_life_days, 1.0);
    }

    #[test]
    fn reject_invalid_half_life() {
        for half_life in ["-7.0", "0.0"] {
            let json = format!(
                r#"
                  {{
                    "query_type": "ConversionBased",
                    "attribution_methodology": "Time_Decay",
                    "lbw": 30,
                    "models": {{ "halfLifeDays": {} }}
                  }}
                "#,
                half_life
            );
            let err = AttributionQuery::from_json(&json)
            .unwrap_err();
            assert!(matches!(err, Error::InvalidHalfLife(_)), "{}", half_life);
        }

        let mut query =
            AttributionQuery::new(AttributionMethod::TimeDecay, AttributionType::ConversionBased);
        query.models(ModelConfig {
            half_life_days: f64::INFINITY,
            ..ModelConfig::default()
        });
        assert!(matches!(query.validate(), Err(Error::InvalidHalfLife(_))));
    }

    #[test]
    fn reject_w_shaped_weights_not_summing_to_one() {
        let err = AttributionQuery::from_json(
            r#"
              {
                "query_type": "ConversionBased",
                "attribution_methodology": "W_Shaped",
                "lbw": 30,
                "models": { "wShaped": { "anchor": 0.9 } }
              }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidWShapedWeights(_)));
    }

    #[test]
    fn accept_consistent_custom_w_shaped_weights() {
        let query = AttributionQuery::from_json(
            r#"
              {
                "query_type": "ConversionBased",
                "attribution_methodology": "W_Shaped",
                "lbw": 30,
                "models": {
                  "wShaped": {
                    "fourTouchOuter": 0.25,
                    "fourTouchInner": 0.25,
                    "anchor": 0.2,
                    "evenMiddle": 0.1,
                    "remainder": 0.4
                  }
                }
              }
            "#,
        )
        .unwrap();
        assert_eq!(query.model_config().w_shaped.anchor, 0.2);
    }
}
