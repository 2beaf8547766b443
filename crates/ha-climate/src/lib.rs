//! Climate entity platform for Home Assistant
//!
//! This crate provides the climate domain vocabulary (HVAC modes and
//! actions, fan and preset names, feature flags), the [`ClimateEntity`]
//! trait integrations implement, and the [`ClimatePlatform`] that registers
//! entities, publishes their state and routes service calls to them.

pub mod consts;
mod entity;
mod error;
mod platform;
mod service;
mod state;
mod state_store;

pub use consts::{ClimateEntityFeature, HvacAction, HvacMode, UnitOfTemperature, DOMAIN};
pub use entity::{ClimateEntity, DeviceInfo, EntityHandle, TemperatureRequest};
pub use error::{ClimateError, ClimateResult};
pub use platform::{slugify, ClimatePlatform};
pub use service::{dispatch, ClimateServiceCall};
pub use state::{friendly_name, ClimateState, STATE_UNAVAILABLE, STATE_UNKNOWN};
pub use state_store::{StateChanged, StateStore};
