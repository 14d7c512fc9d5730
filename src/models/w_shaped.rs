//! W-shaped attribution: fixed shares for the first, middle and last touch.
use serde::{Deserialize, Serialize};

use crate::{
    interaction::{EntitySessions, SortOrder},
    window::AttributionWindow,
    AttributionKeyWeight, Error, Result,
};

use super::{sorted_interactions, AttributionModel};

/// Position weights used by [`WShaped`].
///
/// Each configuration must keep every row summing to 1:
/// - four touches: `2 * four_touch_outer + 2 * four_touch_inner`;
/// - odd count above four: `3 * anchor + remainder`;
/// - even count above four: `2 * anchor + 2 * even_middle + remainder`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WShapedWeights {
    /// First and last of exactly four touches.
    pub four_touch_outer: f64,
    /// Second and third of exactly four touches.
    pub four_touch_inner: f64,
    /// First, middle (odd count) and last touch.
    pub anchor: f64,
    /// Each of the two middle touches of an even count.
    pub even_middle: f64,
    /// Spread evenly over the touches that are not anchors.
    pub remainder: f64,
}

impl Default for WShapedWeights {
    fn default() -> Self {
        WShapedWeights {
            four_touch_outer: 0.325,
            four_touch_inner: 0.175,
            anchor: 0.3,
            even_middle: 0.15,
            remainder: 0.1,
        }
    }
}

impl WShapedWeights {
    /// Check every weight is a share in `[0, 1]` and every row sums to 1.
    pub fn validate(&self) -> Result<()> {
        let weights = [
            self.four_touch_outer,
            self.four_touch_inner,
            self.anchor,
            self.even_middle,
            self.remainder,
        ];
        if !weights.iter().all(|w| (0.0..=1.0).contains(w)) {
            return Err(Error::InvalidWShapedWeights("weights must be within [0, 1]"));
        }

        let rows = [
            (
                "four-touch weights must sum to 1",
                2.0 * self.four_touch_outer + 2.0 * self.four_touch_inner,
            ),
            (
                "odd-count weights must sum to 1",
                3.0 * self.anchor + self.remainder,
            ),
            (
                "even-count weights must sum to 1",
                2.0 * self.anchor + 2.0 * self.even_middle + self.remainder,
            ),
        ];
        for (reason, sum) in rows {
            if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
                return Err(Error::InvalidWShapedWeights(reason));
            }
        }
        Ok(())
    }

    /// Weight of every position for `n` creditable touches, in chronological order.
    pub fn position_weights(&self, n: usize) -> Vec<f64> {
        match n {
            0 => Vec::new(),
            1 => vec![1.0],
            2 => vec![0.5; 2],
            3 => vec![1.0 / 3.0; 3],
            4 => vec![
                self.four_touch_outer,
                self.four_touch_inner,
                self.four_touch_inner,
                self.four_touch_outer,
            ],
            n if n % 2 == 1 => {
                let mut weights = vec![spread(self.remainder, n - 3); n];
                weights[0] = self.anchor;
                weights[n / 2] = self.anchor;
                weights[n - 1] = self.anchor;
                weights
            }
            n => {
                let mut weights = vec![spread(self.remainder, n - 4); n];
                weights[0] = self.anchor;
                weights[n / 2 - 1] = self.even_middle;
                weights[n / 2] = self.even_middle;
                weights[n - 1] = self.anchor;
                weights
            }
        }
    }
}

const WEIGHT_TOLERANCE: f64 = 1e-9;

fn spread(total: f64, touches: usize) -> f64 {
    if touches == 0 {
        0.0
    } else {
        total / touches as f64
    }
}

/// Fixed shares for the first, middle and last touch with the rest spread across the others.
#[derive(Debug, Clone, Copy, Default)]
pub struct WShaped {
    weights: WShapedWeights,
}

impl WShaped {
    /// Create a model using `weights`. See [`WShapedWeights::validate`].
    pub fn new(weights: WShapedWeights) -> Self {
        WShaped { weights }
    }
}

impl AttributionModel for WShaped {
    fn attribute(
        &self,
        sessions: &EntitySessions,
        window: &AttributionWindow,
    ) -> Vec<AttributionKeyWeight> {
        let creditable: Vec<_> = sorted_interactions(sessions, SortOrder::Ascending)
            .into_iter()
            .filter(|interaction| window.admits(interaction.interaction_time))
            .collect();

        creditable
            .iter()
            .zip(self.weights.position_weights(creditable.len()))
            .map(|(interaction, weight)| {
                AttributionKeyWeight::new(interaction.attribution_key, weight)
            })
            .collect()
    }
}
