//! Models spreading credit over every creditable touch.
use std::collections::BTreeSet;

use crate::{
    interaction::{merged_interactions, EntitySessions, Interaction},
    window::AttributionWindow,
    AttributionKeyWeight,
};

use super::AttributionModel;

const SECONDS_PER_DAY: i64 = 86_400;

/// Equal credit to every creditable touch. Repeated touches of a key are credited separately.
#[derive(Debug, Clone, Copy, Default)]
pub struct Linear;

/// Credit halving for every `half_life_days` a touch happened before the conversion.
#[derive(Debug, Clone, Copy)]
pub struct TimeDecay {
    half_life_days: f64,
}

/// Weight 1 for every distinct creditable key.
///
/// Unlike every other model the result is not a credit share and does not sum to 1: it records
/// which keys were touched on the way to a conversion.
#[derive(Debug, Clone, Copy, Default)]
pub struct Influence;

fn creditable<'a>(
    sessions: &'a EntitySessions,
    window: &'a AttributionWindow,
) -> impl Iterator<Item = Interaction<'a>> + 'a {
    merged_interactions(sessions)
        .into_iter()
        .filter(move |interaction| window.admits(interaction.interaction_time))
}

impl AttributionModel for Linear {
    fn attribute(
        &self,
        sessions: &EntitySessions,
        window: &AttributionWindow,
    ) -> Vec<AttributionKeyWeight> {
        let mut keys: Vec<_> = creditable(sessions, window)
            .map(|interaction| AttributionKeyWeight::new(interaction.attribution_key, 0.0))
            .collect();

        let weight = 1.0 / keys.len() as f64;
        for key in &mut keys {
            key.weight = weight;
        }
        keys
    }
}

impl TimeDecay {
    /// Half-life used when none is configured.
    pub const DEFAULT_HALF_LIFE_DAYS: f64 = 7.0;

    /// Create a model with the given half-life, in days.
    pub fn new(half_life_days: f64) -> Self {
        TimeDecay { half_life_days }
    }

    /// `2^(-days / half_life)` where `days` counts whole days between touch and conversion.
    pub fn decay(&self, conversion_time: i64, interaction_time: i64) -> f64 {
        let days = (conversion_time - interaction_time) / SECONDS_PER_DAY;
        (-(days as f64) / self.half_life_days).exp2()
    }
}

impl Default for TimeDecay {
    fn default() -> Self {
        TimeDecay::new(Self::DEFAULT_HALF_LIFE_DAYS)
    }
}

impl AttributionModel for TimeDecay {
    fn attribute(
        &self,
        sessions: &EntitySessions,
        window: &AttributionWindow,
    ) -> Vec<AttributionKeyWeight> {
        let mut keys: Vec<_> = creditable(sessions, window)
            .map(|interaction| {
                AttributionKeyWeight::new(
                    interaction.attribution_key,
                    self.decay(window.conversion_time, interaction.interaction_time),
                )
            })
            .collect();

        let total_weight: f64 = keys.iter().map(|key| key.weight).sum();
        // Also rejects NaN from a degenerate half-life.
        if !(total_weight > 0.0 && total_weight.is_finite()) {
            return Vec::new();
        }

        for key in &mut keys {
            key.weight /= total_weight;
        }
        keys
    }
}

impl AttributionModel for Influence {
    fn attribute(
        &self,
        sessions: &EntitySessions,
        window: &AttributionWindow,
    ) -> Vec<AttributionKeyWeight> {
        creditable(sessions, window)
            .map(|interaction| interaction.attribution_key)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|key| AttributionKeyWeight::new(key, 1.0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        interaction::sessions_from,
        models::{
            tests::{assert_weights, conversion_window},
            AttributionModel,
        },
    };

    use super::{Influence, Linear, TimeDecay};

    const DAY: i64 = 86_400;

    #[test]
    fn linear_counts_duplicate_keys_separately() {
        let sessions = sessions_from(&[("a", &[100, 200]), ("b", &[300])]);
        let window = conversion_window(1_000, 10_000);

        let third = 1.0 / 3.0;
        assert_weights(
            &Linear.attribute(&sessions, &window),
            &[("a", third), ("a", third), ("b", third)],
        );
    }

    #[test]
    fn linear_without_creditable_touch() {
        let sessions = sessions_from(&[("a", &[2_000])]);
        let window = conversion_window(1_000, 10_000);
        assert!(Linear.attribute(&sessions, &window).is_empty());
    }

    #[test]
    fn time_decay_halves_per_half_life() {
        let conversion = 100 * DAY;
        let sessions =
            sessions_from(&[("recent", &[conversion]), ("old", &[conversion - 7 * DAY])]);
        let window = conversion_window(conversion, 30 * DAY);

        let keys = TimeDecay::default().attribute(&sessions, &window);
        assert_weights(&keys, &[("old", 1.0 / 3.0), ("recent", 2.0 / 3.0)]);
    }

    #[test]
    fn time_decay_counts_whole_days() {
        let model = TimeDecay::default();
        assert!((model.decay(DAY, DAY) - 1.0).abs() < 1e-12);
        assert!((model.decay(DAY - 1, 0) - 1.0).abs() < 1e-12);
        assert!((model.decay(8 * DAY - 1, 0) - 0.5).abs() < 1e-12);
        assert!((model.decay(14 * DAY, 0) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn time_decay_closer_touch_never_gets_less() {
        let conversion = 100 * DAY;
        let times = [conversion - 20 * DAY, conversion - 3 * DAY - 5, conversion - 1];
        let sessions = sessions_from(&[("a", &times)]);
        let window = conversion_window(conversion, 30 * DAY);

        let keys = TimeDecay::default().attribute(&sessions, &window);
        assert_eq!(keys.len(), 3);
        assert!(keys[0].weight <= keys[1].weight);
        assert!(keys[1].weight <= keys[2].weight);
        assert!((keys.iter().map(|k| k.weight).sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn time_decay_custom_half_life() {
        let conversion = 100 * DAY;
        let sessions = sessions_from(&[("recent", &[conversion]), ("old", &[conversion - DAY])]);
        let window = conversion_window(conversion, 30 * DAY);

        let keys = TimeDecay::new(1.0).attribute(&sessions, &window);
        assert_weights(&keys, &[("old", 1.0 / 3.0), ("recent", 2.0 / 3.0)]);
    }

    #[test]
    fn time_decay_degenerate_half_life_is_empty() {
        let sessions = sessions_from(&[("a", &[1_000])]);
        let window = conversion_window(1_000, 10_000);

        assert!(TimeDecay::new(0.0).attribute(&sessions, &window).is_empty());
        assert!(TimeDecay::default()
            .attribute(&sessions_from(&[]), &window)
            .is_empty());
    }

    #[test]
    fn influence_marks_every_distinct_key() {
        let sessions = sessions_from(&[("a", &[100, 200, 300]), ("b", &[400]), ("c", &[5_000])]);
        let window = conversion_window(1_000, 10_000);

        assert_weights(
            &Influence.attribute(&sessions, &window),
            &[("a", 1.0), ("b", 1.0)],
        );
    }
}
