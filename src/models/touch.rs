//! Single-touch models and the U-shaped combination of first and last touch.
use crate::{
    interaction::{EntitySessions, SortOrder},
    window::AttributionWindow,
    AttributionKeyWeight,
};

use super::{sorted_interactions, AttributionModel};

/// Full credit to the earliest creditable touch.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstTouch;

/// Full credit to the latest creditable touch.
#[derive(Debug, Clone, Copy, Default)]
pub struct LastTouch;

/// Full credit to the earliest creditable non-direct touch, falling back to direct.
#[derive(Debug, Clone)]
pub struct FirstTouchNonDirect {
    none_key: String,
}

/// Full credit to the latest creditable non-direct touch, falling back to direct.
#[derive(Debug, Clone)]
pub struct LastTouchNonDirect {
    none_key: String,
}

/// Half credit each to the first and last creditable touch.
#[derive(Debug, Clone, Copy, Default)]
pub struct UShaped;

impl AttributionModel for FirstTouch {
    fn attribute(
        &self,
        sessions: &EntitySessions,
        window: &AttributionWindow,
    ) -> Vec<AttributionKeyWeight> {
        single_touch(sessions, window, SortOrder::Ascending)
    }
}

impl AttributionModel for LastTouch {
    fn attribute(
        &self,
        sessions: &EntitySessions,
        window: &AttributionWindow,
    ) -> Vec<AttributionKeyWeight> {
        single_touch(sessions, window, SortOrder::Descending)
    }
}

impl FirstTouchNonDirect {
    /// Create a model treating `none_key` as direct traffic.
    pub fn new(none_key: impl Into<String>) -> Self {
        FirstTouchNonDirect {
            none_key: none_key.into(),
        }
    }
}

impl AttributionModel for FirstTouchNonDirect {
    fn attribute(
        &self,
        sessions: &EntitySessions,
        window: &AttributionWindow,
    ) -> Vec<AttributionKeyWeight> {
        non_direct_touch(sessions, window, SortOrder::Ascending, &self.none_key)
    }
}

impl LastTouchNonDirect {
    /// Create a model treating `none_key` as direct traffic.
    pub fn new(none_key: impl Into<String>) -> Self {
        LastTouchNonDirect {
            none_key: none_key.into(),
        }
    }
}

impl AttributionModel for LastTouchNonDirect {
    fn attribute(
        &self,
        sessions: &EntitySessions,
        window: &AttributionWindow,
    ) -> Vec<AttributionKeyWeight> {
        non_direct_touch(sessions, window, SortOrder::Descending, &self.none_key)
    }
}

impl AttributionModel for UShaped {
    /// A conversion with a single creditable touch has that touch as both first and last, so the
    /// key is listed twice at 0.5 each.
    fn attribute(
        &self,
        sessions: &EntitySessions,
        window: &AttributionWindow,
    ) -> Vec<AttributionKeyWeight> {
        let mut keys = FirstTouch.attribute(sessions, window);
        keys.extend(LastTouch.attribute(sessions, window));

        // First and last touch are either both found or both absent.
        for key in &mut keys {
            key.weight = 0.5;
        }
        keys
    }
}

fn single_touch(
    sessions: &EntitySessions,
    window: &AttributionWindow,
    order: SortOrder,
) -> Vec<AttributionKeyWeight> {
    sorted_interactions(sessions, order)
        .into_iter()
        .find(|interaction| window.admits(interaction.interaction_time))
        .map(|interaction| vec![AttributionKeyWeight::new(interaction.attribution_key, 1.0)])
        .unwrap_or_default()
}

fn non_direct_touch(
    sessions: &EntitySessions,
    window: &AttributionWindow,
    order: SortOrder,
    none_key: &str,
) -> Vec<AttributionKeyWeight> {
    let mut direct_session_exists = false;

    for interaction in sorted_interactions(sessions, order) {
        if !window.admits(interaction.interaction_time) {
            continue;
        }
        if interaction.attribution_key != none_key {
            return vec![AttributionKeyWeight::new(interaction.attribution_key, 1.0)];
        }
        direct_session_exists = true;
    }

    // Direct only gets credit when nothing else was creditable.
    if direct_session_exists {
        vec![AttributionKeyWeight::new(none_key, 1.0)]
    } else {
        Vec::new()
    }
}
