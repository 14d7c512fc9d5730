//! Credit-distribution models.
//!
//! Every model implements [`AttributionModel`]: given one entity's touchpoints and the
//! [`AttributionWindow`] of its conversion, it returns the keys that receive credit. The
//! [`ModelRegistry`] maps each [`AttributionMethod`] to a configured model instance.
use std::collections::HashMap;

mod distributed;
mod method;
mod touch;
mod w_shaped;

pub use distributed::{Influence, Linear, TimeDecay};
pub use method::AttributionMethod;
pub use touch::{FirstTouch, FirstTouchNonDirect, LastTouch, LastTouchNonDirect, UShaped};
pub use w_shaped::{WShaped, WShapedWeights};

use crate::{
    config::ModelConfig,
    interaction::{merged_interactions, sort_interactions, EntitySessions, Interaction, SortOrder},
    window::AttributionWindow,
    AttributionKeyWeight,
};

/// A credit-distribution algorithm.
///
/// Implementations are pure: the same input always produces the same output. An empty result
/// means nothing was creditable and is not an error.
pub trait AttributionModel: Send + Sync {
    /// Weights of the keys credited for the conversion described by `window`.
    fn attribute(
        &self,
        sessions: &EntitySessions,
        window: &AttributionWindow,
    ) -> Vec<AttributionKeyWeight>;
}

impl<T: Fn(&EntitySessions, &AttributionWindow) -> Vec<AttributionKeyWeight> + Send + Sync>
    AttributionModel for T
{
    fn attribute(
        &self,
        sessions: &EntitySessions,
        window: &AttributionWindow,
    ) -> Vec<AttributionKeyWeight> {
        self(sessions, window)
    }
}

fn sorted_interactions(sessions: &EntitySessions, order: SortOrder) -> Vec<Interaction<'_>> {
    let mut interactions = merged_interactions(sessions);
    sort_interactions(&mut interactions, order);
    interactions
}

/// Lookup table from [`AttributionMethod`] to the model that implements it.
pub struct ModelRegistry {
    models: HashMap<AttributionMethod, Box<dyn AttributionModel>>,
}

impl ModelRegistry {
    /// Create a registry without any model.
    pub fn empty() -> Self {
        ModelRegistry {
            models: HashMap::new(),
        }
    }

    /// Create a registry with every supported method, tuned by `config`.
    pub fn new(config: &ModelConfig) -> Self {
        let mut registry = ModelRegistry::empty();
        for method in AttributionMethod::ALL {
            let model: Box<dyn AttributionModel> = match method {
                AttributionMethod::FirstTouch => Box::new(FirstTouch),
                AttributionMethod::LastTouch => Box::new(LastTouch),
                AttributionMethod::FirstTouchNonDirect => {
                    Box::new(FirstTouchNonDirect::new(config.none_key.clone()))
                }
                AttributionMethod::LastTouchNonDirect => {
                    Box::new(LastTouchNonDirect::new(config.none_key.clone()))
                }
                AttributionMethod::UShaped => Box::new(UShaped),
                AttributionMethod::WShaped => Box::new(WShaped::new(config.w_shaped)),
                AttributionMethod::Linear => Box::new(Linear),
                AttributionMethod::TimeDecay => Box::new(TimeDecay::new(config.half_life_days)),
                AttributionMethod::Influence => Box::new(Influence),
            };
            registry.register(method, model);
        }
        registry
    }

    /// Register `model` for `method`, returning the model previously registered for it.
    pub fn register(
        &mut self,
        method: AttributionMethod,
        model: Box<dyn AttributionModel>,
    ) -> Option<Box<dyn AttributionModel>> {
        self.models.insert(method, model)
    }

    /// Model registered for `method`.
    pub fn get(&self, method: AttributionMethod) -> Option<&dyn AttributionModel> {
        self.models.get(&method).map(|model| &**model)
    }

    /// Run the model registered for `method`. A method without a model attributes nothing.
    pub fn attribute(
        &self,
        method: AttributionMethod,
        sessions: &EntitySessions,
        window: &AttributionWindow,
    ) -> Vec<AttributionKeyWeight> {
        match self.get(method) {
            Some(model) => model.attribute(sessions, window),
            None => {
                log::debug!(target: "attribution",
                            method:display = method;
                            "no model registered for method");
                Vec::new()
            }
        }
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        ModelRegistry::new(&ModelConfig::default())
    }
}
