//! Device-control interface for Polyaire AirTouch consoles
//!
//! This crate describes the object model exposed by an AirTouch console:
//! the console itself, the air-conditioner units it manages, and the zones
//! each unit conditions. Consumers only see the [`AirTouch`],
//! [`AirConditioner`] and [`Zone`] traits; the [`memory`] module provides an
//! in-process implementation that behaves like a connected console.

mod error;
pub mod memory;
mod subscription;
mod types;

use std::sync::Arc;

use async_trait::async_trait;

pub use error::{AirTouchError, AirTouchResult};
pub use subscription::{SubscriptionId, Subscribers, UpdateCallback};
pub use types::{AcFanSpeed, AcMode, AcPowerControl, AcPowerState, AirTouchModel, ZonePowerState};

/// A single AirTouch console
pub trait AirTouch: Send + Sync {
    /// Serial number of the console, stable across reconnects
    fn serial(&self) -> String;

    /// User-assigned console name
    fn name(&self) -> String;

    /// Hardware generation of the console
    fn model(&self) -> AirTouchModel;

    /// Air-conditioner units managed by this console
    fn air_conditioners(&self) -> Vec<Arc<dyn AirConditioner>>;
}

/// An air-conditioner unit managed by a console
///
/// Getters reflect the last state reported by the console. Setters send a
/// request and resolve once the console has acknowledged it; the new state
/// becomes visible through the getters and a notification to every
/// subscriber.
#[async_trait]
pub trait AirConditioner: Send + Sync {
    /// Console-assigned identifier of the unit
    fn ac_id(&self) -> u8;

    fn name(&self) -> String;

    fn power_state(&self) -> AcPowerState;

    fn mode(&self) -> AcMode;

    fn fan_speed(&self) -> AcFanSpeed;

    /// Temperature measured at the unit's return air sensor
    fn current_temp(&self) -> Option<f64>;

    /// Current set point
    fn set_point(&self) -> Option<f64>;

    fn min_set_point(&self) -> Option<f64>;

    fn max_set_point(&self) -> Option<f64>;

    fn supported_modes(&self) -> Vec<AcMode>;

    fn supported_fan_speeds(&self) -> Vec<AcFanSpeed>;

    /// Zones conditioned by this unit
    fn zones(&self) -> Vec<Arc<dyn Zone>>;

    async fn set_fan_speed(&self, fan_speed: AcFanSpeed) -> AirTouchResult<()>;

    /// Change the operating mode, optionally turning the unit on in the same request
    async fn set_mode(&self, mode: AcMode, power_on: bool) -> AirTouchResult<()>;

    async fn set_power(&self, control: AcPowerControl) -> AirTouchResult<()>;

    async fn set_set_point(&self, set_point: f64) -> AirTouchResult<()>;

    /// Register a callback invoked with the unit id whenever its state changes
    fn subscribe_ac_state(&self, callback: UpdateCallback) -> SubscriptionId;

    /// Remove a previously registered callback. Returns false if it was not registered.
    fn unsubscribe_ac_state(&self, id: SubscriptionId) -> bool;
}

/// A zone conditioned by one air-conditioner unit
#[async_trait]
pub trait Zone: Send + Sync {
    /// Console-assigned identifier of the zone
    fn zone_id(&self) -> u8;

    fn name(&self) -> String;

    fn power_state(&self) -> ZonePowerState;

    /// Measured zone temperature, `None` when the zone has no sensor
    fn current_temp(&self) -> Option<f64>;

    fn set_point(&self) -> Option<f64>;

    fn has_temp_sensor(&self) -> bool;

    async fn set_power(&self, power_state: ZonePowerState) -> AirTouchResult<()>;

    async fn set_set_point(&self, set_point: f64) -> AirTouchResult<()>;

    /// Register a callback invoked with the zone id whenever the zone changes
    fn subscribe(&self, callback: UpdateCallback) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
