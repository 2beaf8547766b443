//! The climate entity contract
//!
//! Integrations implement [`ClimateEntity`] for each controllable climate
//! device. The platform reads the getters to build the published state and
//! routes validated service calls to the command methods.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::trace;

use crate::{
    ClimateEntityFeature, ClimateError, ClimateResult, HvacAction, HvacMode, UnitOfTemperature,
};

/// Device an entity belongs to, as shown in the device registry
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// (domain, id) pairs identifying the device
    pub identifiers: Vec<(String, String)>,
    pub name: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    /// Identifier of the device this one is connected through
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via_device: Option<(String, String)>,
}

/// Arguments of a set_temperature request
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TemperatureRequest {
    /// New target temperature
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Mode to switch to before setting the temperature
    #[serde(default)]
    pub hvac_mode: Option<HvacMode>,
}

impl TemperatureRequest {
    pub fn new(temperature: f64) -> Self {
        Self {
            temperature: Some(temperature),
            hvac_mode: None,
        }
    }
}

/// Lets an entity ask the platform to re-read and republish its state
#[derive(Debug, Clone)]
pub struct EntityHandle {
    entity_id: String,
    update_tx: mpsc::UnboundedSender<String>,
}

impl EntityHandle {
    pub(crate) fn new(entity_id: String, update_tx: mpsc::UnboundedSender<String>) -> Self {
        Self {
            entity_id,
            update_tx,
        }
    }

    /// The entity id assigned by the platform
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// Queue a state refresh. Never blocks; safe to call from device callbacks.
    pub fn schedule_update_ha_state(&self) {
        if self.update_tx.send(self.entity_id.clone()).is_err() {
            // Platform is gone; nothing left to publish to
            trace!(entity_id = %self.entity_id, "Dropping update request");
        }
    }
}

/// A climate device exposed to Home Assistant
#[async_trait]
pub trait ClimateEntity: Send + Sync {
    /// Stable id used by the entity registry
    fn unique_id(&self) -> Option<String> {
        None
    }

    /// Entity name. With `has_entity_name` and no name, the device name is used.
    fn name(&self) -> Option<String> {
        None
    }

    fn has_entity_name(&self) -> bool {
        false
    }

    fn device_info(&self) -> Option<DeviceInfo> {
        None
    }

    fn available(&self) -> bool {
        true
    }

    fn temperature_unit(&self) -> UnitOfTemperature;

    fn supported_features(&self) -> ClimateEntityFeature {
        ClimateEntityFeature::empty()
    }

    fn hvac_modes(&self) -> Vec<HvacMode>;

    fn hvac_mode(&self) -> Option<HvacMode>;

    fn hvac_action(&self) -> Option<HvacAction> {
        None
    }

    fn current_temperature(&self) -> Option<f64> {
        None
    }

    fn target_temperature(&self) -> Option<f64> {
        None
    }

    fn min_temp(&self) -> Option<f64> {
        None
    }

    fn max_temp(&self) -> Option<f64> {
        None
    }

    fn fan_modes(&self) -> Option<Vec<String>> {
        None
    }

    fn fan_mode(&self) -> Option<String> {
        None
    }

    fn preset_modes(&self) -> Option<Vec<String>> {
        None
    }

    fn preset_mode(&self) -> Option<String> {
        None
    }

    /// Called once the entity is registered; `handle` stays valid until removal
    async fn added_to_hass(&self, _handle: EntityHandle) {}

    /// Called before the entity is removed
    async fn will_remove_from_hass(&self) {}

    async fn set_temperature(&self, _request: TemperatureRequest) -> ClimateResult<()> {
        Err(ClimateError::NotSupported("set_temperature"))
    }

    async fn set_hvac_mode(&self, _hvac_mode: HvacMode) -> ClimateResult<()> {
        Err(ClimateError::NotSupported("set_hvac_mode"))
    }

    async fn set_fan_mode(&self, _fan_mode: &str) -> ClimateResult<()> {
        Err(ClimateError::NotSupported("set_fan_mode"))
    }

    async fn set_preset_mode(&self, _preset_mode: &str) -> ClimateResult<()> {
        Err(ClimateError::NotSupported("set_preset_mode"))
    }
}
