//! In-process console implementation
//!
//! Holds console state in memory and applies requests the way the hardware
//! does: unsupported modes and fan speeds are rejected, set points are
//! clamped to the unit's bounds, and every accepted request notifies the
//! subscribers of the object it changed. A failure can be queued with
//! `fail_next` to exercise error paths.

use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::{
    AcFanSpeed, AcMode, AcPowerControl, AcPowerState, AirConditioner, AirTouch, AirTouchError,
    AirTouchModel, AirTouchResult, Subscribers, SubscriptionId, UpdateCallback, Zone,
    ZonePowerState,
};

// =============================================================================
// Configuration
// =============================================================================

/// Description of a console and everything attached to it
#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    pub serial: String,
    pub name: String,
    #[serde(default)]
    pub model: AirTouchModel,
    #[serde(default)]
    pub air_conditioners: Vec<AcConfig>,
}

/// Initial state and capabilities of an air-conditioner unit
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AcConfig {
    pub id: u8,
    pub name: String,
    pub power_state: AcPowerState,
    pub mode: AcMode,
    pub fan_speed: AcFanSpeed,
    pub supported_modes: Vec<AcMode>,
    pub supported_fan_speeds: Vec<AcFanSpeed>,
    pub current_temp: Option<f64>,
    pub set_point: Option<f64>,
    pub min_set_point: Option<f64>,
    pub max_set_point: Option<f64>,
    pub zones: Vec<ZoneConfig>,
}

impl Default for AcConfig {
    fn default() -> Self {
        Self {
            id: 0,
            name: "AC".to_string(),
            power_state: AcPowerState::Off,
            mode: AcMode::Auto,
            fan_speed: AcFanSpeed::Auto,
            supported_modes: vec![
                AcMode::Auto,
                AcMode::Heat,
                AcMode::Dry,
                AcMode::Fan,
                AcMode::Cool,
            ],
            supported_fan_speeds: vec![
                AcFanSpeed::Auto,
                AcFanSpeed::Low,
                AcFanSpeed::Medium,
                AcFanSpeed::High,
            ],
            current_temp: None,
            set_point: None,
            min_set_point: Some(16.0),
            max_set_point: Some(30.0),
            zones: Vec::new(),
        }
    }
}

/// Initial state of a zone
///
/// A zone has a temperature sensor exactly when `current_temp` is given.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    pub id: u8,
    pub name: String,
    pub power_state: ZonePowerState,
    pub current_temp: Option<f64>,
    pub set_point: Option<f64>,
}

// =============================================================================
// Shared helpers
// =============================================================================

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// One-shot failure queued for the next request
#[derive(Default)]
struct FailureSlot(Mutex<Option<AirTouchError>>);

impl FailureSlot {
    fn set(&self, error: AirTouchError) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    fn check(&self) -> AirTouchResult<()> {
        match self.0.lock().unwrap_or_else(PoisonError::into_inner).take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

// =============================================================================
// Console
// =============================================================================

/// In-memory console
pub struct MemoryAirTouch {
    serial: String,
    name: String,
    model: AirTouchModel,
    air_conditioners: Vec<Arc<MemoryAirConditioner>>,
}

impl MemoryAirTouch {
    pub fn new(config: ConsoleConfig) -> Arc<Self> {
        let air_conditioners = config
            .air_conditioners
            .into_iter()
            .map(MemoryAirConditioner::new)
            .collect();

        Arc::new(Self {
            serial: config.serial,
            name: config.name,
            model: config.model,
            air_conditioners,
        })
    }

    /// Look up a unit by id with its concrete type
    pub fn air_conditioner(&self, ac_id: u8) -> Option<Arc<MemoryAirConditioner>> {
        self.air_conditioners
            .iter()
            .find(|ac| ac.ac_id == ac_id)
            .cloned()
    }
}

impl AirTouch for MemoryAirTouch {
    fn serial(&self) -> String {
        self.serial.clone()
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn model(&self) -> AirTouchModel {
        self.model
    }

    fn air_conditioners(&self) -> Vec<Arc<dyn AirConditioner>> {
        self.air_conditioners
            .iter()
            .map(|ac| ac.clone() as Arc<dyn AirConditioner>)
            .collect()
    }
}

// =============================================================================
// Air conditioner
// =============================================================================

#[derive(Debug, Clone)]
struct AcState {
    power_state: AcPowerState,
    mode: AcMode,
    fan_speed: AcFanSpeed,
    current_temp: Option<f64>,
    set_point: Option<f64>,
}

/// In-memory air-conditioner unit
pub struct MemoryAirConditioner {
    ac_id: u8,
    name: String,
    supported_modes: Vec<AcMode>,
    supported_fan_speeds: Vec<AcFanSpeed>,
    min_set_point: Option<f64>,
    max_set_point: Option<f64>,
    state: RwLock<AcState>,
    zones: Vec<Arc<MemoryZone>>,
    subscribers: Subscribers,
    failure: FailureSlot,
}

impl MemoryAirConditioner {
    pub fn new(config: AcConfig) -> Arc<Self> {
        let zones = config.zones.into_iter().map(MemoryZone::new).collect();

        Arc::new(Self {
            ac_id: config.id,
            name: config.name,
            supported_modes: config.supported_modes,
            supported_fan_speeds: config.supported_fan_speeds,
            min_set_point: config.min_set_point,
            max_set_point: config.max_set_point,
            state: RwLock::new(AcState {
                power_state: config.power_state,
                mode: config.mode,
                fan_speed: config.fan_speed,
                current_temp: config.current_temp,
                set_point: config.set_point,
            }),
            zones,
            subscribers: Subscribers::new(),
            failure: FailureSlot::default(),
        })
    }

    /// Look up a zone by id with its concrete type
    pub fn zone(&self, zone_id: u8) -> Option<Arc<MemoryZone>> {
        self.zones.iter().find(|z| z.zone_id == zone_id).cloned()
    }

    /// Make the next request fail with `error`
    pub fn fail_next(&self, error: AirTouchError) {
        self.failure.set(error);
    }

    /// Simulate a state report from the console, as if changed at the wall controller
    pub fn report(&self, power_state: AcPowerState, mode: AcMode) {
        {
            let mut state = write(&self.state);
            state.power_state = power_state;
            state.mode = mode;
        }
        self.subscribers.notify(self.ac_id);
    }

    /// Simulate a new temperature reading
    pub fn report_temperature(&self, current_temp: f64) {
        write(&self.state).current_temp = Some(current_temp);
        self.subscribers.notify(self.ac_id);
    }

    /// Number of registered state subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn clamp(&self, set_point: f64) -> f64 {
        let low = self.min_set_point.unwrap_or(f64::NEG_INFINITY);
        let high = self.max_set_point.unwrap_or(f64::INFINITY);
        set_point.max(low).min(high)
    }

    fn update(&self, apply: impl FnOnce(&mut AcState)) {
        apply(&mut write(&self.state));
        self.subscribers.notify(self.ac_id);
    }
}

#[async_trait]
impl AirConditioner for MemoryAirConditioner {
    fn ac_id(&self) -> u8 {
        self.ac_id
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn power_state(&self) -> AcPowerState {
        read(&self.state).power_state
    }

    fn mode(&self) -> AcMode {
        read(&self.state).mode
    }

    fn fan_speed(&self) -> AcFanSpeed {
        read(&self.state).fan_speed
    }

    fn current_temp(&self) -> Option<f64> {
        read(&self.state).current_temp
    }

    fn set_point(&self) -> Option<f64> {
        read(&self.state).set_point
    }

    fn min_set_point(&self) -> Option<f64> {
        self.min_set_point
    }

    fn max_set_point(&self) -> Option<f64> {
        self.max_set_point
    }

    fn supported_modes(&self) -> Vec<AcMode> {
        self.supported_modes.clone()
    }

    fn supported_fan_speeds(&self) -> Vec<AcFanSpeed> {
        self.supported_fan_speeds.clone()
    }

    fn zones(&self) -> Vec<Arc<dyn Zone>> {
        self.zones
            .iter()
            .map(|zone| zone.clone() as Arc<dyn Zone>)
            .collect()
    }

    async fn set_fan_speed(&self, fan_speed: AcFanSpeed) -> AirTouchResult<()> {
        self.failure.check()?;
        if !self.supported_fan_speeds.contains(&fan_speed) {
            return Err(AirTouchError::UnsupportedFanSpeed(fan_speed));
        }
        debug!(ac_id = self.ac_id, ?fan_speed, "Setting fan speed");
        self.update(|state| state.fan_speed = fan_speed);
        Ok(())
    }

    async fn set_mode(&self, mode: AcMode, power_on: bool) -> AirTouchResult<()> {
        self.failure.check()?;
        if !self.supported_modes.contains(&mode) {
            return Err(AirTouchError::UnsupportedMode(mode));
        }
        debug!(ac_id = self.ac_id, ?mode, power_on, "Setting mode");
        self.update(|state| {
            state.mode = mode;
            if power_on {
                state.power_state = state.power_state.apply(AcPowerControl::TurnOn);
            }
        });
        Ok(())
    }

    async fn set_power(&self, control: AcPowerControl) -> AirTouchResult<()> {
        self.failure.check()?;
        debug!(ac_id = self.ac_id, ?control, "Setting power");
        self.update(|state| state.power_state = state.power_state.apply(control));
        Ok(())
    }

    async fn set_set_point(&self, set_point: f64) -> AirTouchResult<()> {
        self.failure.check()?;
        let clamped = self.clamp(set_point);
        debug!(ac_id = self.ac_id, set_point = clamped, "Setting set point");
        self.update(|state| state.set_point = Some(clamped));
        Ok(())
    }

    fn subscribe_ac_state(&self, callback: UpdateCallback) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    fn unsubscribe_ac_state(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}

// =============================================================================
// Zone
// =============================================================================

#[derive(Debug, Clone)]
struct ZoneState {
    power_state: ZonePowerState,
    current_temp: Option<f64>,
    set_point: Option<f64>,
}

/// In-memory zone
pub struct MemoryZone {
    zone_id: u8,
    name: String,
    has_temp_sensor: bool,
    state: RwLock<ZoneState>,
    subscribers: Subscribers,
    failure: FailureSlot,
}

impl MemoryZone {
    pub fn new(config: ZoneConfig) -> Arc<Self> {
        Arc::new(Self {
            zone_id: config.id,
            name: config.name,
            has_temp_sensor: config.current_temp.is_some(),
            state: RwLock::new(ZoneState {
                power_state: config.power_state,
                current_temp: config.current_temp,
                set_point: config.set_point,
            }),
            subscribers: Subscribers::new(),
            failure: FailureSlot::default(),
        })
    }

    /// Make the next request fail with `error`
    pub fn fail_next(&self, error: AirTouchError) {
        self.failure.set(error);
    }

    /// Simulate a new temperature reading
    pub fn report_temperature(&self, current_temp: f64) {
        if !self.has_temp_sensor {
            return;
        }
        write(&self.state).current_temp = Some(current_temp);
        self.subscribers.notify(self.zone_id);
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn update(&self, apply: impl FnOnce(&mut ZoneState)) {
        apply(&mut write(&self.state));
        self.subscribers.notify(self.zone_id);
    }
}

#[async_trait]
impl Zone for MemoryZone {
    fn zone_id(&self) -> u8 {
        self.zone_id
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn power_state(&self) -> ZonePowerState {
        read(&self.state).power_state
    }

    fn current_temp(&self) -> Option<f64> {
        read(&self.state).current_temp
    }

    fn set_point(&self) -> Option<f64> {
        read(&self.state).set_point
    }

    fn has_temp_sensor(&self) -> bool {
        self.has_temp_sensor
    }

    async fn set_power(&self, power_state: ZonePowerState) -> AirTouchResult<()> {
        self.failure.check()?;
        debug!(zone_id = self.zone_id, ?power_state, "Setting zone power");
        self.update(|state| state.power_state = power_state);
        Ok(())
    }

    async fn set_set_point(&self, set_point: f64) -> AirTouchResult<()> {
        self.failure.check()?;
        debug!(zone_id = self.zone_id, set_point, "Setting zone set point");
        self.update(|state| state.set_point = Some(set_point));
        Ok(())
    }

    fn subscribe(&self, callback: UpdateCallback) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}
