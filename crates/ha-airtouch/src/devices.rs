//! Device registry information for consoles, air conditioners and zones
//!
//! Devices form a tree: each AC is connected via its console and each zone
//! via its AC. Device ids are derived from the console serial so they stay
//! stable across restarts.

use airtouch_api::{AirConditioner, AirTouch, Zone};
use ha_climate::DeviceInfo;

use crate::DOMAIN;

pub const MANUFACTURER: &str = "Polyaire";

fn identifier(id: &str) -> (String, String) {
    (DOMAIN.to_string(), id.to_string())
}

/// An AirTouch console
#[derive(Debug, Clone)]
pub struct AirTouchDevice {
    id: String,
    info: DeviceInfo,
}

impl AirTouchDevice {
    pub fn new(airtouch: &dyn AirTouch) -> Self {
        let id = airtouch.serial();
        let info = DeviceInfo {
            identifiers: vec![identifier(&id)],
            name: Some(airtouch.name()),
            manufacturer: Some(MANUFACTURER.to_string()),
            model: Some(airtouch.model().display_name().to_string()),
            via_device: None,
        };
        Self { id, info }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn device_info(&self) -> DeviceInfo {
        self.info.clone()
    }

    /// Device for an AC managed by this console
    pub fn ac_device(&self, ac: &dyn AirConditioner) -> AcDevice {
        let id = format!("{}_ac_{}", self.id, ac.ac_id());
        let info = DeviceInfo {
            identifiers: vec![identifier(&id)],
            name: Some(ac.name()),
            manufacturer: Some(MANUFACTURER.to_string()),
            model: Some("Air Conditioner".to_string()),
            via_device: Some(identifier(&self.id)),
        };
        AcDevice { id, info }
    }
}

/// An air-conditioner unit
#[derive(Debug, Clone)]
pub struct AcDevice {
    id: String,
    info: DeviceInfo,
}

impl AcDevice {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn device_info(&self) -> DeviceInfo {
        self.info.clone()
    }

    /// Device for a zone conditioned by this AC
    pub fn zone_device(&self, zone: &dyn Zone) -> ZoneDevice {
        let id = format!("{}_zone_{}", self.id, zone.zone_id());
        let info = DeviceInfo {
            identifiers: vec![identifier(&id)],
            name: Some(zone.name()),
            manufacturer: Some(MANUFACTURER.to_string()),
            model: Some("Zone".to_string()),
            via_device: Some(identifier(&self.id)),
        };
        ZoneDevice { id, info }
    }
}

/// A zone
#[derive(Debug, Clone)]
pub struct ZoneDevice {
    id: String,
    info: DeviceInfo,
}

impl ZoneDevice {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn device_info(&self) -> DeviceInfo {
        self.info.clone()
    }
}
