//! Translation between AirTouch and climate vocabularies
//!
//! Forward mappings are exhaustive matches. Reverse mappings are derived by
//! inverting the forward ones over every vendor value, so the two can never
//! disagree. The HVAC mode mapping is lossy: AUTO, AUTO_HEAT and AUTO_COOL
//! all present as HEAT_COOL, which maps back to AUTO.

use airtouch_api::{AcFanSpeed, AcMode, ZonePowerState};
use ha_climate::consts::{FAN_AUTO, FAN_HIGH, FAN_LOW, FAN_MEDIUM, FAN_OFF, FAN_ON};
use ha_climate::{HvacAction, HvacMode};

pub const FAN_QUIET: &str = "quiet";
pub const FAN_POWERFUL: &str = "powerful";
pub const FAN_TURBO: &str = "turbo";
pub const FAN_INTELLIGENT: &str = "intelligent";

/// HVAC mode shown for an AC mode. OFF is never produced; power state covers it.
pub fn ac_to_climate_hvac_mode(mode: AcMode) -> HvacMode {
    match mode {
        AcMode::Auto => HvacMode::HeatCool,
        AcMode::Heat => HvacMode::Heat,
        AcMode::Dry => HvacMode::Dry,
        AcMode::Fan => HvacMode::FanOnly,
        AcMode::Cool => HvacMode::Cool,
        AcMode::AutoHeat => HvacMode::HeatCool,
        AcMode::AutoCool => HvacMode::HeatCool,
    }
}

/// AC mode to request for an HVAC mode. `None` for OFF and modes the AC has no equivalent for.
pub fn climate_to_ac_hvac_mode(hvac_mode: HvacMode) -> Option<AcMode> {
    AcMode::ALL
        .into_iter()
        .find(|mode| ac_to_climate_hvac_mode(*mode) == hvac_mode)
}

/// Activity shown for a running AC in the given mode
pub fn ac_to_climate_hvac_action(mode: AcMode) -> HvacAction {
    match mode {
        AcMode::Auto => HvacAction::Idle,
        AcMode::Heat => HvacAction::Heating,
        AcMode::Dry => HvacAction::Drying,
        AcMode::Fan => HvacAction::Fan,
        AcMode::Cool => HvacAction::Cooling,
        AcMode::AutoHeat => HvacAction::Heating,
        AcMode::AutoCool => HvacAction::Cooling,
    }
}

pub fn ac_to_climate_fan_mode(fan_speed: AcFanSpeed) -> &'static str {
    match fan_speed {
        AcFanSpeed::Auto => FAN_AUTO,
        AcFanSpeed::Quiet => FAN_QUIET,
        AcFanSpeed::Low => FAN_LOW,
        AcFanSpeed::Medium => FAN_MEDIUM,
        AcFanSpeed::High => FAN_HIGH,
        AcFanSpeed::Powerful => FAN_POWERFUL,
        AcFanSpeed::Turbo => FAN_TURBO,
        AcFanSpeed::IntelligentAuto => FAN_INTELLIGENT,
    }
}

pub fn climate_to_ac_fan_mode(fan_mode: &str) -> Option<AcFanSpeed> {
    AcFanSpeed::ALL
        .into_iter()
        .find(|speed| ac_to_climate_fan_mode(*speed) == fan_mode)
}

/// Zones have no fan speed; their power state doubles as the fan mode
pub fn zone_to_climate_fan_mode(power_state: ZonePowerState) -> &'static str {
    match power_state {
        ZonePowerState::Off => FAN_OFF,
        ZonePowerState::On => FAN_ON,
        ZonePowerState::Turbo => FAN_TURBO,
    }
}

pub fn climate_to_zone_fan_mode(fan_mode: &str) -> Option<ZonePowerState> {
    ZonePowerState::ALL
        .into_iter()
        .find(|state| zone_to_climate_fan_mode(*state) == fan_mode)
}
