//! Console-level enums

use serde::{Deserialize, Serialize};

/// Power state of an air-conditioner unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcPowerState {
    #[default]
    Off,
    On,
    /// Off while the away profile is active
    OffAway,
    /// Running the away profile
    OnAway,
    /// Running the sleep profile
    Sleep,
}

impl AcPowerState {
    /// Check if the unit is not running, regardless of profile
    pub fn is_off(&self) -> bool {
        matches!(self, AcPowerState::Off | AcPowerState::OffAway)
    }

    /// Power state after applying a power control request
    pub fn apply(self, control: AcPowerControl) -> Self {
        match control {
            AcPowerControl::TurnOff => match self {
                AcPowerState::OnAway | AcPowerState::OffAway => AcPowerState::OffAway,
                _ => AcPowerState::Off,
            },
            AcPowerControl::TurnOn => match self {
                AcPowerState::Off => AcPowerState::On,
                AcPowerState::OffAway => AcPowerState::OnAway,
                running => running,
            },
            AcPowerControl::SetToAway => AcPowerState::OnAway,
            AcPowerControl::SetToSleep => AcPowerState::Sleep,
            AcPowerControl::Toggle => {
                if self.is_off() {
                    self.apply(AcPowerControl::TurnOn)
                } else {
                    self.apply(AcPowerControl::TurnOff)
                }
            }
        }
    }
}

/// Power control request sent to an air-conditioner unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcPowerControl {
    TurnOff,
    TurnOn,
    SetToAway,
    SetToSleep,
    Toggle,
}

/// Operating mode of an air-conditioner unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcMode {
    #[default]
    Auto,
    Heat,
    Dry,
    Fan,
    Cool,
    /// Auto mode, currently heating
    AutoHeat,
    /// Auto mode, currently cooling
    AutoCool,
}

impl AcMode {
    /// Every mode a console can report
    pub const ALL: [AcMode; 7] = [
        AcMode::Auto,
        AcMode::Heat,
        AcMode::Dry,
        AcMode::Fan,
        AcMode::Cool,
        AcMode::AutoHeat,
        AcMode::AutoCool,
    ];
}

/// Fan speed of an air-conditioner unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcFanSpeed {
    #[default]
    Auto,
    Quiet,
    Low,
    Medium,
    High,
    Powerful,
    Turbo,
    IntelligentAuto,
}

impl AcFanSpeed {
    /// Every fan speed a console can report
    pub const ALL: [AcFanSpeed; 8] = [
        AcFanSpeed::Auto,
        AcFanSpeed::Quiet,
        AcFanSpeed::Low,
        AcFanSpeed::Medium,
        AcFanSpeed::High,
        AcFanSpeed::Powerful,
        AcFanSpeed::Turbo,
        AcFanSpeed::IntelligentAuto,
    ];
}

/// Power state of a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZonePowerState {
    #[default]
    Off,
    On,
    Turbo,
}

impl ZonePowerState {
    /// Every power state a zone can report
    pub const ALL: [ZonePowerState; 3] = [
        ZonePowerState::Off,
        ZonePowerState::On,
        ZonePowerState::Turbo,
    ];
}

/// Console hardware generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirTouchModel {
    #[serde(rename = "airtouch4")]
    AirTouch4,
    #[default]
    #[serde(rename = "airtouch5")]
    AirTouch5,
}

impl AirTouchModel {
    /// Marketing name of the model
    pub fn display_name(&self) -> &'static str {
        match self {
            AirTouchModel::AirTouch4 => "AirTouch 4",
            AirTouchModel::AirTouch5 => "AirTouch 5",
        }
    }
}
