//! Climate service calls
//!
//! Parses service data into typed calls and checks them against what the
//! target entity advertises before the entity sees them.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::consts::*;
use crate::{
    ClimateEntity, ClimateEntityFeature, ClimateError, ClimateResult, HvacMode, TemperatureRequest,
};

/// A typed climate service call
#[derive(Debug, Clone, PartialEq)]
pub enum ClimateServiceCall {
    SetTemperature(TemperatureRequest),
    SetHvacMode(HvacMode),
    SetFanMode(String),
    SetPresetMode(String),
    TurnOn,
    TurnOff,
}

#[derive(Deserialize)]
struct HvacModeData {
    hvac_mode: HvacMode,
}

#[derive(Deserialize)]
struct FanModeData {
    fan_mode: String,
}

#[derive(Deserialize)]
struct PresetModeData {
    preset_mode: String,
}

fn parse<T: serde::de::DeserializeOwned>(data: &Value) -> ClimateResult<T> {
    serde_json::from_value(data.clone()).map_err(|e| ClimateError::InvalidServiceData(e.to_string()))
}

impl ClimateServiceCall {
    /// Build a call from a service name and its data
    pub fn from_service_data(service: &str, data: &Value) -> ClimateResult<Self> {
        let call = match service {
            SERVICE_SET_TEMPERATURE => {
                let request: TemperatureRequest = parse(data)?;
                if request.temperature.is_none() {
                    return Err(ClimateError::MissingArgument(ATTR_TEMPERATURE));
                }
                ClimateServiceCall::SetTemperature(request)
            }
            SERVICE_SET_HVAC_MODE => {
                ClimateServiceCall::SetHvacMode(parse::<HvacModeData>(data)?.hvac_mode)
            }
            SERVICE_SET_FAN_MODE => {
                ClimateServiceCall::SetFanMode(parse::<FanModeData>(data)?.fan_mode)
            }
            SERVICE_SET_PRESET_MODE => {
                ClimateServiceCall::SetPresetMode(parse::<PresetModeData>(data)?.preset_mode)
            }
            SERVICE_TURN_ON => ClimateServiceCall::TurnOn,
            SERVICE_TURN_OFF => ClimateServiceCall::TurnOff,
            other => return Err(ClimateError::UnknownService(other.to_string())),
        };
        Ok(call)
    }

    /// Service name of this call
    pub fn service(&self) -> &'static str {
        match self {
            ClimateServiceCall::SetTemperature(_) => SERVICE_SET_TEMPERATURE,
            ClimateServiceCall::SetHvacMode(_) => SERVICE_SET_HVAC_MODE,
            ClimateServiceCall::SetFanMode(_) => SERVICE_SET_FAN_MODE,
            ClimateServiceCall::SetPresetMode(_) => SERVICE_SET_PRESET_MODE,
            ClimateServiceCall::TurnOn => SERVICE_TURN_ON,
            ClimateServiceCall::TurnOff => SERVICE_TURN_OFF,
        }
    }
}

fn require_feature(
    entity: &dyn ClimateEntity,
    feature: ClimateEntityFeature,
    service: &'static str,
) -> ClimateResult<()> {
    if entity.supported_features().contains(feature) {
        Ok(())
    } else {
        Err(ClimateError::NotSupported(service))
    }
}

fn check_hvac_mode(entity: &dyn ClimateEntity, mode: HvacMode) -> ClimateResult<()> {
    let modes = entity.hvac_modes();
    if modes.contains(&mode) {
        return Ok(());
    }
    Err(ClimateError::InvalidHvacMode {
        mode,
        valid: modes
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

fn check_listed(value: &str, listed: Option<Vec<String>>) -> Result<(), String> {
    let listed = listed.unwrap_or_default();
    if listed.iter().any(|v| v == value) {
        Ok(())
    } else {
        Err(listed.join(", "))
    }
}

/// Mode to switch to for turn_on
///
/// An entity offering only OFF and one other mode turns on in that mode.
/// Otherwise the first of HEAT_COOL, HEAT and COOL it offers is used.
fn turn_on_mode(modes: &[HvacMode]) -> Option<HvacMode> {
    if let [first, second] = modes {
        match (first, second) {
            (HvacMode::Off, other) | (other, HvacMode::Off) if *other != HvacMode::Off => {
                return Some(*other)
            }
            _ => {}
        }
    }
    [HvacMode::HeatCool, HvacMode::Heat, HvacMode::Cool]
        .into_iter()
        .find(|mode| modes.contains(mode))
}

/// Validate a call against the entity's advertised capabilities and run it
pub async fn dispatch(entity: &dyn ClimateEntity, call: ClimateServiceCall) -> ClimateResult<()> {
    debug!(service = call.service(), "Dispatching climate service");

    match call {
        ClimateServiceCall::SetTemperature(request) => {
            require_feature(
                entity,
                ClimateEntityFeature::TARGET_TEMPERATURE,
                SERVICE_SET_TEMPERATURE,
            )?;
            if let Some(mode) = request.hvac_mode {
                check_hvac_mode(entity, mode)?;
                entity.set_hvac_mode(mode).await?;
            }
            entity.set_temperature(request).await
        }
        ClimateServiceCall::SetHvacMode(mode) => {
            check_hvac_mode(entity, mode)?;
            entity.set_hvac_mode(mode).await
        }
        ClimateServiceCall::SetFanMode(fan_mode) => {
            require_feature(entity, ClimateEntityFeature::FAN_MODE, SERVICE_SET_FAN_MODE)?;
            check_listed(&fan_mode, entity.fan_modes())
                .map_err(|valid| ClimateError::InvalidFanMode {
                    mode: fan_mode.clone(),
                    valid,
                })?;
            entity.set_fan_mode(&fan_mode).await
        }
        ClimateServiceCall::SetPresetMode(preset_mode) => {
            require_feature(
                entity,
                ClimateEntityFeature::PRESET_MODE,
                SERVICE_SET_PRESET_MODE,
            )?;
            check_listed(&preset_mode, entity.preset_modes()).map_err(|valid| {
                ClimateError::InvalidPresetMode {
                    mode: preset_mode.clone(),
                    valid,
                }
            })?;
            entity.set_preset_mode(&preset_mode).await
        }
        ClimateServiceCall::TurnOn => {
            let mode = turn_on_mode(&entity.hvac_modes())
                .ok_or(ClimateError::NotSupported(SERVICE_TURN_ON))?;
            entity.set_hvac_mode(mode).await
        }
        ClimateServiceCall::TurnOff => {
            if !entity.hvac_modes().contains(&HvacMode::Off) {
                return Err(ClimateError::NotSupported(SERVICE_TURN_OFF));
            }
            entity.set_hvac_mode(HvacMode::Off).await
        }
    }
}
