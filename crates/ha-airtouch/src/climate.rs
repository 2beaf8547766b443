//! AirTouch climate entities
//!
//! Every AC becomes one climate entity. Every zone with a temperature sensor
//! becomes another; zones without one cannot report a current temperature
//! and are skipped.

use std::sync::Arc;

use airtouch_api::{AcPowerControl, AcPowerState, AirConditioner, AirTouch, Zone, ZonePowerState};
use async_trait::async_trait;
use ha_climate::consts::{ATTR_TEMPERATURE, PRESET_AWAY, PRESET_NONE, PRESET_SLEEP};
use ha_climate::{
    ClimateEntity, ClimateEntityFeature, ClimateError, ClimateResult, DeviceInfo, EntityHandle,
    HvacAction, HvacMode, TemperatureRequest, UnitOfTemperature,
};
use tracing::{debug, warn};

use crate::devices::{AcDevice, AirTouchDevice, ZoneDevice};
use crate::entities::{Subscriptions, UpdateSubscription};
use crate::mapping::{
    ac_to_climate_fan_mode, ac_to_climate_hvac_action, ac_to_climate_hvac_mode,
    climate_to_ac_fan_mode, climate_to_ac_hvac_mode, climate_to_zone_fan_mode,
    zone_to_climate_fan_mode,
};

/// Build the climate entities for every AC and sensor-equipped zone
pub fn discover_entities(consoles: &[Arc<dyn AirTouch>]) -> Vec<Arc<dyn ClimateEntity>> {
    let mut discovered: Vec<Arc<dyn ClimateEntity>> = Vec::new();

    for airtouch in consoles {
        let airtouch_device = AirTouchDevice::new(airtouch.as_ref());

        for ac in airtouch.air_conditioners() {
            let ac_device = airtouch_device.ac_device(ac.as_ref());
            discovered.push(Arc::new(AcClimateEntity::new(ac_device.clone(), ac.clone())));

            // Only zones with temperature sensors can be climate entities
            for zone in ac.zones().into_iter().filter(|z| z.has_temp_sensor()) {
                let zone_device = ac_device.zone_device(zone.as_ref());
                discovered.push(Arc::new(ZoneClimateEntity::new(
                    zone_device,
                    ac.clone(),
                    zone,
                )));
            }
        }
    }

    debug!(
        "Found entities {:?}",
        discovered
            .iter()
            .filter_map(|e| e.unique_id())
            .collect::<Vec<_>>()
    );
    discovered
}

fn require_temperature(request: TemperatureRequest) -> ClimateResult<f64> {
    request
        .temperature
        .ok_or(ClimateError::MissingArgument(ATTR_TEMPERATURE))
}

/// HVAC mode of an AC as users see it. Any off state hides the underlying mode.
fn ac_hvac_mode(ac: &dyn AirConditioner) -> HvacMode {
    if ac.power_state().is_off() {
        HvacMode::Off
    } else {
        ac_to_climate_hvac_mode(ac.mode())
    }
}

// =============================================================================
// Air conditioner
// =============================================================================

/// A climate entity for an AirTouch air conditioner
pub struct AcClimateEntity {
    device: AcDevice,
    ac: Arc<dyn AirConditioner>,
    hvac_modes: Vec<HvacMode>,
    fan_modes: Vec<String>,
    subscriptions: Subscriptions,
}

impl AcClimateEntity {
    pub fn new(device: AcDevice, ac: Arc<dyn AirConditioner>) -> Self {
        // The climate entity groups the off power states into the HVAC mode
        let mut hvac_modes = vec![HvacMode::Off];
        for mode in ac.supported_modes() {
            let hvac_mode = ac_to_climate_hvac_mode(mode);
            if !hvac_modes.contains(&hvac_mode) {
                hvac_modes.push(hvac_mode);
            }
        }

        let fan_modes = ac
            .supported_fan_speeds()
            .into_iter()
            .map(|speed| ac_to_climate_fan_mode(speed).to_string())
            .collect();

        Self {
            device,
            ac,
            hvac_modes,
            fan_modes,
            subscriptions: Subscriptions::default(),
        }
    }
}

#[async_trait]
impl ClimateEntity for AcClimateEntity {
    fn unique_id(&self) -> Option<String> {
        Some(self.device.id().to_string())
    }

    fn has_entity_name(&self) -> bool {
        true
    }

    fn device_info(&self) -> Option<DeviceInfo> {
        Some(self.device.device_info())
    }

    fn temperature_unit(&self) -> UnitOfTemperature {
        UnitOfTemperature::Celsius
    }

    fn supported_features(&self) -> ClimateEntityFeature {
        ClimateEntityFeature::FAN_MODE
            | ClimateEntityFeature::TARGET_TEMPERATURE
            | ClimateEntityFeature::PRESET_MODE
    }

    fn hvac_modes(&self) -> Vec<HvacMode> {
        self.hvac_modes.clone()
    }

    fn hvac_mode(&self) -> Option<HvacMode> {
        Some(ac_hvac_mode(self.ac.as_ref()))
    }

    fn hvac_action(&self) -> Option<HvacAction> {
        if self.ac.power_state().is_off() {
            Some(HvacAction::Off)
        } else {
            Some(ac_to_climate_hvac_action(self.ac.mode()))
        }
    }

    fn current_temperature(&self) -> Option<f64> {
        self.ac.current_temp()
    }

    fn target_temperature(&self) -> Option<f64> {
        self.ac.set_point()
    }

    fn min_temp(&self) -> Option<f64> {
        self.ac.min_set_point()
    }

    fn max_temp(&self) -> Option<f64> {
        self.ac.max_set_point()
    }

    fn fan_modes(&self) -> Option<Vec<String>> {
        Some(self.fan_modes.clone())
    }

    fn fan_mode(&self) -> Option<String> {
        Some(ac_to_climate_fan_mode(self.ac.fan_speed()).to_string())
    }

    // TODO: advertise only the presets the AC reports once the console exposes them
    fn preset_modes(&self) -> Option<Vec<String>> {
        Some(vec![
            PRESET_NONE.to_string(),
            PRESET_AWAY.to_string(),
            PRESET_SLEEP.to_string(),
        ])
    }

    fn preset_mode(&self) -> Option<String> {
        let preset = match self.ac.power_state() {
            AcPowerState::OffAway | AcPowerState::OnAway => PRESET_AWAY,
            AcPowerState::Sleep => PRESET_SLEEP,
            _ => PRESET_NONE,
        };
        Some(preset.to_string())
    }

    async fn added_to_hass(&self, handle: EntityHandle) {
        self.subscriptions
            .hold(vec![UpdateSubscription::ac_state(&self.ac, handle)])
            .await;
    }

    async fn will_remove_from_hass(&self) {
        self.subscriptions.release().await;
    }

    async fn set_fan_mode(&self, fan_mode: &str) -> ClimateResult<()> {
        let fan_speed = climate_to_ac_fan_mode(fan_mode)
            .ok_or_else(|| ClimateError::lookup("fan mode", fan_mode))?;
        debug!(ac = self.device.id(), ?fan_speed, "Setting fan speed");
        self.ac
            .set_fan_speed(fan_speed)
            .await
            .map_err(ClimateError::device)
    }

    async fn set_hvac_mode(&self, hvac_mode: HvacMode) -> ClimateResult<()> {
        let result = if hvac_mode == HvacMode::Off {
            debug!(ac = self.device.id(), "Turning off");
            self.ac.set_power(AcPowerControl::TurnOff).await
        } else {
            let mode = climate_to_ac_hvac_mode(hvac_mode)
                .ok_or_else(|| ClimateError::lookup("hvac mode", hvac_mode.as_str()))?;
            debug!(ac = self.device.id(), ?mode, "Setting mode");
            self.ac.set_mode(mode, true).await
        };
        result.map_err(ClimateError::device)
    }

    async fn set_preset_mode(&self, preset_mode: &str) -> ClimateResult<()> {
        let control = match preset_mode {
            PRESET_AWAY => AcPowerControl::SetToAway,
            PRESET_SLEEP => AcPowerControl::SetToSleep,
            _ => {
                warn!("Unsupported preset mode: {}", preset_mode);
                return Ok(());
            }
        };
        debug!(ac = self.device.id(), ?control, "Setting preset");
        self.ac
            .set_power(control)
            .await
            .map_err(ClimateError::device)
    }

    async fn set_temperature(&self, request: TemperatureRequest) -> ClimateResult<()> {
        let temperature = require_temperature(request)?;
        self.ac
            .set_set_point(temperature)
            .await
            .map_err(ClimateError::device)
    }
}

// =============================================================================
// Zone
// =============================================================================

/// A climate entity for an AirTouch zone
///
/// A zone has no mode of its own: it is either off or running in whatever
/// mode its AC is in. The entity therefore also follows AC updates.
pub struct ZoneClimateEntity {
    device: ZoneDevice,
    ac: Arc<dyn AirConditioner>,
    zone: Arc<dyn Zone>,
    subscriptions: Subscriptions,
}

impl ZoneClimateEntity {
    pub fn new(device: ZoneDevice, ac: Arc<dyn AirConditioner>, zone: Arc<dyn Zone>) -> Self {
        Self {
            device,
            ac,
            zone,
            subscriptions: Subscriptions::default(),
        }
    }
}

#[async_trait]
impl ClimateEntity for ZoneClimateEntity {
    fn unique_id(&self) -> Option<String> {
        Some(self.device.id().to_string())
    }

    fn has_entity_name(&self) -> bool {
        true
    }

    fn device_info(&self) -> Option<DeviceInfo> {
        Some(self.device.device_info())
    }

    fn temperature_unit(&self) -> UnitOfTemperature {
        UnitOfTemperature::Celsius
    }

    fn supported_features(&self) -> ClimateEntityFeature {
        ClimateEntityFeature::FAN_MODE | ClimateEntityFeature::TARGET_TEMPERATURE
    }

    fn hvac_modes(&self) -> Vec<HvacMode> {
        // The zone can either be off, or on in the current mode of the AC
        vec![HvacMode::Off, ac_to_climate_hvac_mode(self.ac.mode())]
    }

    fn hvac_mode(&self) -> Option<HvacMode> {
        if self.zone.power_state() == ZonePowerState::Off {
            return Some(HvacMode::Off);
        }
        Some(ac_hvac_mode(self.ac.as_ref()))
    }

    fn current_temperature(&self) -> Option<f64> {
        self.zone.current_temp()
    }

    fn target_temperature(&self) -> Option<f64> {
        self.zone.set_point()
    }

    fn fan_modes(&self) -> Option<Vec<String>> {
        Some(
            ZonePowerState::ALL
                .into_iter()
                .map(|state| zone_to_climate_fan_mode(state).to_string())
                .collect(),
        )
    }

    fn fan_mode(&self) -> Option<String> {
        Some(zone_to_climate_fan_mode(self.zone.power_state()).to_string())
    }

    async fn added_to_hass(&self, handle: EntityHandle) {
        self.subscriptions
            .hold(vec![
                UpdateSubscription::zone(&self.zone, handle.clone()),
                UpdateSubscription::ac_state(&self.ac, handle),
            ])
            .await;
    }

    async fn will_remove_from_hass(&self) {
        self.subscriptions.release().await;
    }

    async fn set_fan_mode(&self, fan_mode: &str) -> ClimateResult<()> {
        let power_state = climate_to_zone_fan_mode(fan_mode)
            .ok_or_else(|| ClimateError::lookup("fan mode", fan_mode))?;
        debug!(zone = self.device.id(), ?power_state, "Setting zone power");
        self.zone
            .set_power(power_state)
            .await
            .map_err(ClimateError::device)
    }

    async fn set_hvac_mode(&self, hvac_mode: HvacMode) -> ClimateResult<()> {
        // Any mode other than off is a request to turn the zone on
        let power_state = if hvac_mode == HvacMode::Off {
            ZonePowerState::Off
        } else {
            ZonePowerState::On
        };
        debug!(zone = self.device.id(), ?power_state, "Setting zone power");
        self.zone
            .set_power(power_state)
            .await
            .map_err(ClimateError::device)
    }

    async fn set_temperature(&self, request: TemperatureRequest) -> ClimateResult<()> {
        let temperature = require_temperature(request)?;
        self.zone
            .set_set_point(temperature)
            .await
            .map_err(ClimateError::device)
    }
}
