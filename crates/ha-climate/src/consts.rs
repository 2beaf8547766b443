//! Climate domain vocabulary
//!
//! HVAC modes and actions, fan and preset names, feature flags and attribute
//! keys shared by every climate entity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The climate entity domain
pub const DOMAIN: &str = "climate";

/// Default lower set-point bound when an entity reports none (°C)
pub const DEFAULT_MIN_TEMP: f64 = 7.0;

/// Default upper set-point bound when an entity reports none (°C)
pub const DEFAULT_MAX_TEMP: f64 = 35.0;

// Fan modes
pub const FAN_ON: &str = "on";
pub const FAN_OFF: &str = "off";
pub const FAN_AUTO: &str = "auto";
pub const FAN_LOW: &str = "low";
pub const FAN_MEDIUM: &str = "medium";
pub const FAN_HIGH: &str = "high";

// Preset modes
pub const PRESET_NONE: &str = "none";
pub const PRESET_AWAY: &str = "away";
pub const PRESET_SLEEP: &str = "sleep";

// Attributes
pub const ATTR_HVAC_MODES: &str = "hvac_modes";
pub const ATTR_HVAC_ACTION: &str = "hvac_action";
pub const ATTR_MIN_TEMP: &str = "min_temp";
pub const ATTR_MAX_TEMP: &str = "max_temp";
pub const ATTR_CURRENT_TEMPERATURE: &str = "current_temperature";
pub const ATTR_TEMPERATURE: &str = "temperature";
pub const ATTR_FAN_MODES: &str = "fan_modes";
pub const ATTR_FAN_MODE: &str = "fan_mode";
pub const ATTR_PRESET_MODES: &str = "preset_modes";
pub const ATTR_PRESET_MODE: &str = "preset_mode";
pub const ATTR_FRIENDLY_NAME: &str = "friendly_name";
pub const ATTR_SUPPORTED_FEATURES: &str = "supported_features";

// Services
pub const SERVICE_SET_TEMPERATURE: &str = "set_temperature";
pub const SERVICE_SET_HVAC_MODE: &str = "set_hvac_mode";
pub const SERVICE_SET_FAN_MODE: &str = "set_fan_mode";
pub const SERVICE_SET_PRESET_MODE: &str = "set_preset_mode";
pub const SERVICE_TURN_ON: &str = "turn_on";
pub const SERVICE_TURN_OFF: &str = "turn_off";

/// HVAC operating mode as presented to users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacMode {
    Off,
    Heat,
    Cool,
    HeatCool,
    Auto,
    Dry,
    FanOnly,
}

impl HvacMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HvacMode::Off => "off",
            HvacMode::Heat => "heat",
            HvacMode::Cool => "cool",
            HvacMode::HeatCool => "heat_cool",
            HvacMode::Auto => "auto",
            HvacMode::Dry => "dry",
            HvacMode::FanOnly => "fan_only",
        }
    }
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the equipment is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacAction {
    Off,
    Idle,
    Heating,
    Cooling,
    Drying,
    Fan,
}

impl HvacAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            HvacAction::Off => "off",
            HvacAction::Idle => "idle",
            HvacAction::Heating => "heating",
            HvacAction::Cooling => "cooling",
            HvacAction::Drying => "drying",
            HvacAction::Fan => "fan",
        }
    }
}

impl fmt::Display for HvacAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Temperature unit an entity reports in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnitOfTemperature {
    #[default]
    #[serde(rename = "°C")]
    Celsius,
    #[serde(rename = "°F")]
    Fahrenheit,
}

bitflags::bitflags! {
    /// Optional capabilities of a climate entity
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClimateEntityFeature: u32 {
        const TARGET_TEMPERATURE = 1;
        const FAN_MODE = 8;
        const PRESET_MODE = 16;
    }
}

impl Default for ClimateEntityFeature {
    fn default() -> Self {
        Self::empty()
    }
}

// Published as the raw bit mask, like the supported_features attribute
impl Serialize for ClimateEntityFeature {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ClimateEntityFeature {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u32::deserialize(deserializer).map(Self::from_bits_retain)
    }
}
