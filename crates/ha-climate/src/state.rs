//! Published climate state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::consts::*;
use crate::{ClimateEntity, ClimateEntityFeature};

/// State value for entities that cannot currently be reached
pub const STATE_UNAVAILABLE: &str = "unavailable";

/// State value when the entity reports no HVAC mode
pub const STATE_UNKNOWN: &str = "unknown";

/// The published state of a climate entity at a point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClimateState {
    pub entity_id: String,

    /// The HVAC mode, or "unknown"/"unavailable"
    pub state: String,

    #[serde(default)]
    pub attributes: Map<String, Value>,

    /// When the state value last changed
    pub last_changed: DateTime<Utc>,

    /// When the state or attributes last changed
    pub last_updated: DateTime<Utc>,
}

impl ClimateState {
    /// Read the entity and build its current state
    pub fn from_entity(entity_id: impl Into<String>, entity: &dyn ClimateEntity) -> Self {
        let now = Utc::now();
        let (state, attributes) = render(entity);
        Self {
            entity_id: entity_id.into(),
            state,
            attributes,
            last_changed: now,
            last_updated: now,
        }
    }

    /// Carry timestamps over from the previous state where nothing changed
    pub(crate) fn succeeding(mut self, previous: &ClimateState) -> Self {
        if self.state == previous.state {
            self.last_changed = previous.last_changed;
        }
        self
    }

    /// Get an attribute value by key
    pub fn attribute<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.attributes
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

impl PartialEq for ClimateState {
    fn eq(&self, other: &Self) -> bool {
        // Timestamps are not compared
        self.entity_id == other.entity_id
            && self.state == other.state
            && self.attributes == other.attributes
    }
}

/// Friendly name of an entity, falling back to its device name
pub fn friendly_name(entity: &dyn ClimateEntity) -> Option<String> {
    match entity.name() {
        Some(name) => Some(name),
        None if entity.has_entity_name() => entity.device_info().and_then(|d| d.name),
        None => None,
    }
}

fn render(entity: &dyn ClimateEntity) -> (String, Map<String, Value>) {
    let mut attributes = Map::new();
    let features = entity.supported_features();

    if let Some(name) = friendly_name(entity) {
        attributes.insert(ATTR_FRIENDLY_NAME.to_string(), json!(name));
    }
    attributes.insert(ATTR_SUPPORTED_FEATURES.to_string(), json!(features.bits()));

    if !entity.available() {
        return (STATE_UNAVAILABLE.to_string(), attributes);
    }

    // Capability attributes
    attributes.insert(ATTR_HVAC_MODES.to_string(), json!(entity.hvac_modes()));
    attributes.insert(
        ATTR_MIN_TEMP.to_string(),
        json!(entity.min_temp().unwrap_or(DEFAULT_MIN_TEMP)),
    );
    attributes.insert(
        ATTR_MAX_TEMP.to_string(),
        json!(entity.max_temp().unwrap_or(DEFAULT_MAX_TEMP)),
    );
    if features.contains(ClimateEntityFeature::FAN_MODE) {
        attributes.insert(ATTR_FAN_MODES.to_string(), json!(entity.fan_modes()));
    }
    if features.contains(ClimateEntityFeature::PRESET_MODE) {
        attributes.insert(ATTR_PRESET_MODES.to_string(), json!(entity.preset_modes()));
    }

    // State attributes
    attributes.insert(
        ATTR_CURRENT_TEMPERATURE.to_string(),
        json!(entity.current_temperature()),
    );
    if features.contains(ClimateEntityFeature::TARGET_TEMPERATURE) {
        attributes.insert(
            ATTR_TEMPERATURE.to_string(),
            json!(entity.target_temperature()),
        );
    }
    if let Some(action) = entity.hvac_action() {
        attributes.insert(ATTR_HVAC_ACTION.to_string(), json!(action));
    }
    if features.contains(ClimateEntityFeature::FAN_MODE) {
        attributes.insert(ATTR_FAN_MODE.to_string(), json!(entity.fan_mode()));
    }
    if features.contains(ClimateEntityFeature::PRESET_MODE) {
        attributes.insert(ATTR_PRESET_MODE.to_string(), json!(entity.preset_mode()));
    }

    let state = entity
        .hvac_mode()
        .map(|mode| mode.as_str().to_string())
        .unwrap_or_else(|| STATE_UNKNOWN.to_string());

    (state, attributes)
}
