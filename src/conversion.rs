//! Conversions to attribute: converted users and KPI rows.
use serde::{Deserialize, Serialize};

use crate::Error;

/// Whether an event is the goal of the query or a linked funnel step tracked alongside it.
///
/// Serialized as `0` (goal) and `1` (linked funnel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum EventType {
    /// The conversion event of the query.
    Goal,
    /// A funnel step attributed alongside the goal.
    LinkedFunnel,
}

impl TryFrom<i64> for EventType {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Goal),
            1 => Ok(Self::LinkedFunnel),
            other => Err(Error::UnknownEventType(other)),
        }
    }
}

impl From<EventType> for i64 {
    fn from(value: EventType) -> Self {
        match value {
            EventType::Goal => 0,
            EventType::LinkedFunnel => 1,
        }
    }
}

/// A user that performed the goal event or a linked funnel event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEventInfo {
    /// Coalesced user id, the key of the user's sessions.
    #[serde(rename = "coalUserId")]
    pub coal_user_id: String,
    /// Name of the performed event.
    pub event_name: String,
    /// Unix seconds of the event.
    pub timestamp: i64,
    /// Goal or linked funnel event.
    pub event_type: EventType,
}

/// One measured value of a KPI (e.g. a closed deal with its revenue).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KpiRowValue {
    /// Human-readable time of the row, as reported by the KPI query.
    #[serde(default)]
    pub time_string: String,
    /// Conversion instant, unix seconds.
    pub timestamp: i64,
    /// Measured values, in the order of [`KpiInfo::kpi_header_names`].
    #[serde(default)]
    pub values: Vec<f64>,
    /// Set once a model attributed this row.
    #[serde(default)]
    pub is_converted: bool,
}

impl KpiRowValue {
    /// Create an unconverted row.
    pub fn new(timestamp: i64, values: impl Into<Vec<f64>>) -> Self {
        KpiRowValue {
            time_string: String::new(),
            timestamp,
            values: values.into(),
            is_converted: false,
        }
    }
}

/// A KPI-achieving entity (account, deal, opportunity) and its measured rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiInfo {
    /// Id of the entity, the key of its sessions.
    #[serde(default)]
    pub kpi_id: String,
    /// Group the entity belongs to.
    #[serde(default)]
    pub kpi_group_id: String,
    /// Account or company group of the entity.
    #[serde(default, rename = "kpi_acc_comp_group_id")]
    pub kpi_account_company_group_id: String,
    /// Users associated with the entity.
    #[serde(default, rename = "kpi_users")]
    pub kpi_user_ids: Vec<String>,
    /// Coalesced ids of `kpi_user_ids`.
    #[serde(default, rename = "kpi_coal_users")]
    pub kpi_coal_user_ids: Vec<String>,
    /// Names of the measured values (revenue, pipeline, ...).
    #[serde(default)]
    pub kpi_header_names: Vec<String>,
    /// Aggregation of each measured value (sum, unique, ...).
    #[serde(default, rename = "kpi_agg_fun_types")]
    pub kpi_agg_function_types: Vec<String>,
    /// Rows to attribute.
    #[serde(default, rename = "kpi_value_list")]
    pub kpi_values_list: Vec<KpiRowValue>,
}

impl KpiInfo {
    /// Create a KPI with only its id and rows.
    pub fn new(kpi_id: impl Into<String>, rows: Vec<KpiRowValue>) -> Self {
        KpiInfo {
            kpi_id: kpi_id.into(),
            kpi_values_list: rows,
            ..KpiInfo::default()
        }
    }

    /// Returns `true` if at least one row was attributed.
    pub fn is_converted(&self) -> bool {
        self.kpi_values_list.iter().any(|row| row.is_converted)
    }
}

#[cfg(test)]
mod tests {
    use super::{EventType, KpiInfo, UserEventInfo};

    #[test]
    fn parse_user_event() {
        let event: UserEventInfo = serde_json::from_str(
            r#"
              {"coalUserId": "u1", "eventName": "signup", "timestamp": 1700000000, "eventType": 1}
            "#,
        )
        .unwrap();
        assert_eq!(event.coal_user_id, "u1");
        assert_eq!(event.event_type, EventType::LinkedFunnel);

        assert_eq!(
            serde_json::to_value(EventType::Goal).unwrap(),
            serde_json::json!(0)
        );
    }

    #[test]
    fn reject_unknown_event_type() {
        assert!(serde_json::from_str::<UserEventInfo>(
            r#"{"coalUserId": "u1", "eventName": "signup", "timestamp": 1, "eventType": 7}"#,
        )
        .is_err());
    }

    #[test]
    fn parse_kpi_info() {
        let kpi: KpiInfo = serde_json::from_str(
            r#"
              {
                "kpi_id": "deal-1",
                "kpi_header_names": ["revenue"],
                "kpi_value_list": [
                  {
                    "TimeString": "2024-01-02",
                    "Timestamp": 1704153600,
                    "Values": [1200.0],
                    "IsConverted": false
                  }
                ]
              }
            "#,
        )
        .unwrap();
        assert_eq!(kpi.kpi_id, "deal-1");
        assert_eq!(kpi.kpi_values_list[0].timestamp, 1_704_153_600);
        assert!(!kpi.is_converted());
    }
}
