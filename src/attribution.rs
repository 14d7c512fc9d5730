//! Attribution of converted users and KPI rows.
//!
//! [`apply_attribution`] and [`apply_attribution_kpi`] are pure functions over caller-supplied
//! data that validate the query before running. [`Attributor`] bundles a validated
//! [`AttributionQuery`] with its [`ModelRegistry`] so callers don't have to pass them around.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    conversion::{EventType, KpiInfo, UserEventInfo},
    interaction::EntitySessions,
    models::{AttributionMethod, ModelRegistry},
    AttributionKeyWeight, AttributionQuery, Result,
};

/// Sessions of every entity, keyed by entity id (coalesced user id or KPI id).
pub type SessionsByEntity = HashMap<String, EntitySessions>;

/// Attributed weights keyed by entity id.
pub type EntityAttribution = HashMap<String, Vec<AttributionKeyWeight>>;

/// Result of attributing converted users.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAttribution {
    /// Users that performed the goal event.
    pub users: EntityAttribution,
    /// Users that performed a linked funnel event, keyed by event name.
    pub linked_events: HashMap<String, EntityAttribution>,
}

/// Attribute every user in `users_to_be_attributed` with `method`.
///
/// A user's conversion instant is looked up in `conversion_timestamps`; a user missing from it
/// falls back to the event's own timestamp. Users without a creditable touchpoint are left out.
/// Events that are neither the goal event nor a linked funnel event are logged and dropped.
///
/// Fails if `query` does not validate.
pub fn apply_attribution(
    registry: &ModelRegistry,
    query: &AttributionQuery,
    method: AttributionMethod,
    conversion_event: &str,
    users_to_be_attributed: &[UserEventInfo],
    sessions: &SessionsByEntity,
    conversion_timestamps: &HashMap<String, i64>,
) -> Result<EventAttribution> {
    query.validate()?;
    Ok(attribute_users(
        registry,
        query,
        method,
        conversion_event,
        users_to_be_attributed,
        sessions,
        conversion_timestamps,
    ))
}

fn attribute_users(
    registry: &ModelRegistry,
    query: &AttributionQuery,
    method: AttributionMethod,
    conversion_event: &str,
    users_to_be_attributed: &[UserEventInfo],
    sessions: &SessionsByEntity,
    conversion_timestamps: &HashMap<String, i64>,
) -> EventAttribution {
    let empty = EntitySessions::new();
    let mut result = EventAttribution::default();

    for event in users_to_be_attributed {
        let user_id = &event.coal_user_id;
        let conversion_time = conversion_timestamps
            .get(user_id)
            .copied()
            .unwrap_or(event.timestamp);
        let user_sessions = sessions.get(user_id).unwrap_or(&empty);

        let keys = registry.attribute(method, user_sessions, &query.window(conversion_time));

        log::trace!(target: "attribution",
                    user_id:display = user_id,
                    event_name:display = event.event_name,
                    method:display = method,
                    attribution_keys:serde = &keys;
                    "attributed user");

        match event.event_type {
            // A later goal event without creditable touches supersedes an earlier one.
            EventType::Goal if event.event_name == conversion_event => {
                if keys.is_empty() {
                    result.users.remove(user_id);
                } else {
                    result.users.insert(user_id.clone(), keys);
                }
            }
            EventType::LinkedFunnel if keys.is_empty() => {}
            EventType::LinkedFunnel => {
                result
                    .linked_events
                    .entry(event.event_name.clone())
                    .or_default()
                    .insert(user_id.clone(), keys);
            }
            EventType::Goal => {
                log::warn!(target: "attribution",
                           user_id:display = user_id,
                           event_name:display = event.event_name,
                           conversion_event;
                           "goal event does not match the conversion event, dropping");
            }
        }
    }

    result
}

/// Attribute every KPI row with `method`.
///
/// Rows already marked converted are skipped. A row that receives credit is marked converted and
/// its weights become the KPI's attribution (a later row of the same KPI overrides an earlier
/// one). KPIs without any attributed row are left out.
///
/// Fails if `query` does not validate, leaving `kpi_data` untouched.
pub fn apply_attribution_kpi(
    registry: &ModelRegistry,
    query: &AttributionQuery,
    method: AttributionMethod,
    sessions: &SessionsByEntity,
    kpi_data: &mut HashMap<String, KpiInfo>,
) -> Result<EntityAttribution> {
    query.validate()?;
    Ok(attribute_kpis(registry, query, method, sessions, kpi_data))
}

fn attribute_kpis(
    registry: &ModelRegistry,
    query: &AttributionQuery,
    method: AttributionMethod,
    sessions: &SessionsByEntity,
    kpi_data: &mut HashMap<String, KpiInfo>,
) -> EntityAttribution {
    let empty = EntitySessions::new();
    let mut result = EntityAttribution::new();

    for (kpi_id, kpi_info) in kpi_data.iter_mut() {
        let kpi_sessions = sessions.get(kpi_id).unwrap_or(&empty);

        for row in kpi_info
            .kpi_values_list
            .iter_mut()
            .filter(|row| !row.is_converted)
        {
            let keys = registry.attribute(method, kpi_sessions, &query.window(row.timestamp));

            log::trace!(target: "attribution",
                        kpi_id:display = kpi_id,
                        timestamp = row.timestamp,
                        method:display = method,
                        attribution_keys:serde = &keys;
                        "attributed KPI row");

            if keys.is_empty() {
                continue;
            }
            row.is_converted = true;
            result.insert(kpi_id.clone(), keys);
        }
    }

    result
}

/// Runs attribution queries against one [`ModelRegistry`].
pub struct Attributor {
    query: AttributionQuery,
    registry: ModelRegistry,
}

impl Attributor {
    /// Create an attributor with every model tuned by the query's model configuration.
    pub fn new(query: AttributionQuery) -> Result<Attributor> {
        let registry = ModelRegistry::new(query.model_config());
        Attributor::with_registry(query, registry)
    }

    /// Create an attributor that looks models up in `registry`.
    pub fn with_registry(query: AttributionQuery, registry: ModelRegistry) -> Result<Attributor> {
        query.validate()?;
        Ok(Attributor { query, registry })
    }

    /// Attribute a single entity converting at `conversion_time`.
    pub fn attribute(
        &self,
        sessions: &EntitySessions,
        conversion_time: i64,
    ) -> Vec<AttributionKeyWeight> {
        self.registry.attribute(
            self.query.method(),
            sessions,
            &self.query.window(conversion_time),
        )
    }

    /// Query this attributor was created with.
    pub fn query(&self) -> &AttributionQuery {
        &self.query
    }

    /// See [`apply_attribution`]. The query was validated on construction.
    pub fn attribute_users(
        &self,
        conversion_event: &str,
        users_to_be_attributed: &[UserEventInfo],
        sessions: &SessionsByEntity,
        conversion_timestamps: &HashMap<String, i64>,
    ) -> EventAttribution {
        attribute_users(
            &self.registry,
            &self.query,
            self.query.method(),
            conversion_event,
            users_to_be_attributed,
            sessions,
            conversion_timestamps,
        )
    }

    /// See [`apply_attribution_kpi`]. The query was validated on construction.
    pub fn attribute_kpis(
        &self,
        sessions: &SessionsByEntity,
        kpi_data: &mut HashMap<String, KpiInfo>,
    ) -> EntityAttribution {
        attribute_kpis(
            &self.registry,
            &self.query,
            self.query.method(),
            sessions,
            kpi_data,
        )
    }

    /// Attribute users with the query's method and, if set, its compare method.
    pub fn compare_users(
        &self,
        conversion_event: &str,
        users_to_be_attributed: &[UserEventInfo],
        sessions: &SessionsByEntity,
        conversion_timestamps: &HashMap<String, i64>,
    ) -> (EventAttribution, Option<EventAttribution>) {
        let primary = self.attribute_users(
            conversion_event,
            users_to_be_attributed,
            sessions,
            conversion_timestamps,
        );
        let compare = self.query.compare_method().map(|method| {
            attribute_users(
                &self.registry,
                &self.query,
                method,
                conversion_event,
                users_to_be_attributed,
                sessions,
                conversion_timestamps,
            )
        });
        (primary, compare)
    }

    /// Attribute KPIs with the query's method and, if set, its compare method.
    ///
    /// Only the primary run marks rows converted in `kpi_data`. The compare run works on a copy
    /// of the rows as they were before the primary run.
    pub fn compare_kpis(
        &self,
        sessions: &SessionsByEntity,
        kpi_data: &mut HashMap<String, KpiInfo>,
    ) -> (EntityAttribution, Option<EntityAttribution>) {
        let mut compare_data = self.query.compare_method().map(|_| kpi_data.clone());

        let primary = self.attribute_kpis(sessions, kpi_data);
        let compare = self
            .query
            .compare_method()
            .zip(compare_data.as_mut())
            .map(|(method, data)| {
                attribute_kpis(&self.registry, &self.query, method, sessions, data)
            });
        (primary, compare)
    }
}
