//! Touchpoint records and their flattening into a time-ordered interaction list.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Touchpoints of a single attribution key for one entity.
///
/// Built by the session-construction layer. Only `time_stamps` is read during attribution; the
/// remaining fields are carried along so the record round-trips through JSON unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSessionData {
    /// Earliest entry of `time_stamps`.
    #[serde(default)]
    pub min_timestamp: i64,
    /// Latest entry of `time_stamps`.
    #[serde(default)]
    pub max_timestamp: i64,
    /// Unix seconds of every interaction with the key.
    pub time_stamps: Vec<i64>,
    /// Whether the session builder saw a touch inside the query period.
    #[serde(default)]
    pub within_query_period: bool,
}

impl UserSessionData {
    /// Create a record from a list of interaction timestamps, filling in min/max.
    pub fn from_timestamps(time_stamps: impl Into<Vec<i64>>) -> Self {
        let time_stamps = time_stamps.into();
        UserSessionData {
            min_timestamp: time_stamps.iter().copied().min().unwrap_or_default(),
            max_timestamp: time_stamps.iter().copied().max().unwrap_or_default(),
            time_stamps,
            within_query_period: false,
        }
    }
}

/// Touchpoints of one entity, keyed by attribution key.
pub type EntitySessions = HashMap<String, UserSessionData>;

/// A single timestamped touch of an attribution key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction<'a> {
    /// Key that was touched.
    pub attribution_key: &'a str,
    /// Unix seconds of the touch.
    pub interaction_time: i64,
}

/// Direction of [`sort_interactions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Earliest first.
    Ascending,
    /// Latest first.
    Descending,
}

/// Flatten session records into one interaction per recorded timestamp.
///
/// Keys are visited in lexicographic order and timestamps in recorded order, so the output (and
/// any tie order after a stable sort) does not depend on hash map iteration order. Repeated
/// touches of the same key are kept.
pub fn merged_interactions(sessions: &EntitySessions) -> Vec<Interaction<'_>> {
    let mut keys: Vec<&String> = sessions.keys().collect();
    keys.sort_unstable();

    keys.into_iter()
        .flat_map(move |key| {
            sessions[key]
                .time_stamps
                .iter()
                .map(move |&interaction_time| Interaction {
                    attribution_key: key.as_str(),
                    interaction_time,
                })
        })
        .collect()
}

/// Sort interactions by time. The sort is stable: interactions with equal timestamps keep their
/// relative order.
pub fn sort_interactions(interactions: &mut [Interaction<'_>], order: SortOrder) {
    match order {
        SortOrder::Ascending => interactions.sort_by_key(|i| i.interaction_time),
        SortOrder::Descending => {
            interactions.sort_by(|a, b| b.interaction_time.cmp(&a.interaction_time))
        }
    }
}

#[cfg(test)]
pub(crate) fn sessions_from(entries: &[(&str, &[i64])]) -> EntitySessions {
    entries
        .iter()
        .map(|&(key, ts)| (key.to_owned(), UserSessionData::from_timestamps(ts.to_vec())))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{merged_interactions, sessions_from, sort_interactions, SortOrder};

    #[test]
    fn empty_sessions_yield_no_interactions() {
        assert!(merged_interactions(&HashMap::new()).is_empty());
    }

    #[test]
    fn every_timestamp_becomes_an_interaction() {
        let sessions = sessions_from(&[("a", &[30, 10, 20]), ("b", &[15])]);
        let interactions = merged_interactions(&sessions);

        assert_eq!(interactions.len(), 4);
        assert_eq!(
            interactions
                .iter()
                .filter(|i| i.attribution_key == "a")
                .count(),
            3
        );
    }

    #[test]
    fn sorts_ascending_and_descending() {
        let sessions = sessions_from(&[("a", &[30, 10]), ("b", &[20])]);
        let mut interactions = merged_interactions(&sessions);

        sort_interactions(&mut interactions, SortOrder::Ascending);
        let times: Vec<i64> = interactions.iter().map(|i| i.interaction_time).collect();
        assert_eq!(times, [10, 20, 30]);

        sort_interactions(&mut interactions, SortOrder::Descending);
        let times: Vec<i64> = interactions.iter().map(|i| i.interaction_time).collect();
        assert_eq!(times, [30, 20, 10]);
    }

    #[test]
    fn ties_keep_extraction_order() {
        let sessions = sessions_from(&[("c", &[5]), ("a", &[5]), ("b", &[5])]);

        let mut interactions = merged_interactions(&sessions);
        sort_interactions(&mut interactions, SortOrder::Ascending);
        let keys: Vec<&str> = interactions.iter().map(|i| i.attribution_key).collect();
        assert_eq!(keys, ["a", "b", "c"]);

        sort_interactions(&mut interactions, SortOrder::Descending);
        let keys: Vec<&str> = interactions.iter().map(|i| i.attribution_key).collect();
        assert_eq!(keys, ["a", "b", "c"]);
    }

    #[test]
    fn from_timestamps_fills_bounds() {
        let data = super::UserSessionData::from_timestamps(vec![40, 10, 25]);
        assert_eq!(data.min_timestamp, 10);
        assert_eq!(data.max_timestamp, 40);
    }
}
