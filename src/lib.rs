//! Multi-touch attribution: deciding which marketing touchpoints get credit for a conversion.
//!
//! # Overview
//!
//! A converted entity (a user that performed a goal event, or an account/deal that achieved a
//! KPI) comes with its touchpoints: for every attribution key (campaign, channel, ad group, ...)
//! the timestamps at which the entity interacted with it, see [`UserSessionData`]. An
//! [`AttributionMethod`] decides how credit for the conversion is split across those
//! touchpoints, producing a list of [`AttributionKeyWeight`]s that sums to 1.0.
//!
//! Only touchpoints inside the [`AttributionWindow`] are creditable: at or before the conversion
//! and within the lookback period. Engagement-based attribution additionally requires the touch
//! to fall inside the query period (see [`AttributionType`]).
//!
//! [`models`] contains the credit-distribution algorithms behind the [`AttributionModel`] trait
//! and a [`ModelRegistry`] mapping methods to configured models. [`apply_attribution`] and
//! [`apply_attribution_kpi`] attribute whole populations of users or KPI rows. [`Attributor`]
//! bundles a validated [`AttributionQuery`] with a registry.
//!
//! All attribution functions are pure and synchronous. A conversion that cannot be attributed
//! yields an empty weight list and is left out of result maps; it is not an error.
//!
//! # Error Handling
//!
//! Errors are represented by the [`Error`] enum and only describe queries that cannot run
//! (unknown method names, negative lookback, ...).
//!
//! # Logging
//!
//! The crate uses the [`log`](https://docs.rs/log/latest/log/) crate with the `attribution`
//! target. Per-entity results are logged at `trace` level, dropped events at `warn`.

#![warn(rustdoc::missing_crate_level_docs)]
#![warn(missing_docs)]

pub mod attribution;
pub mod conversion;
pub mod interaction;
pub mod key;
pub mod models;
pub mod window;

mod config;
mod error;

pub use attribution::{apply_attribution, apply_attribution_kpi, Attributor, EventAttribution};
pub use config::{AttributionQuery, ModelConfig};
pub use conversion::{EventType, KpiInfo, KpiRowValue, UserEventInfo};
pub use error::{Error, Result};
pub use interaction::{EntitySessions, UserSessionData};
pub use key::{AttributionKeyDimension, AttributionKeyWeight};
pub use models::{AttributionMethod, AttributionModel, ModelRegistry};
pub use window::{AttributionType, AttributionWindow};
