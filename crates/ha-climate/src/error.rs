//! Error types for climate entities and services

use thiserror::Error;

use crate::HvacMode;

/// Result type for climate operations
pub type ClimateResult<T> = Result<T, ClimateError>;

/// Errors raised by climate entities or the climate platform
#[derive(Debug, Error)]
pub enum ClimateError {
    /// An integration has no mapping for a value it was handed
    #[error("no {kind} mapping for '{value}'")]
    Lookup { kind: &'static str, value: String },

    /// The entity does not implement the requested operation
    #[error("entity does not support {0}")]
    NotSupported(&'static str),

    /// A required service argument was not provided
    #[error("missing required argument '{0}'")]
    MissingArgument(&'static str),

    /// HVAC mode is not in the entity's advertised list
    #[error("hvac mode '{mode}' is not valid, valid modes are: {valid}")]
    InvalidHvacMode { mode: HvacMode, valid: String },

    /// Fan mode is not in the entity's advertised list
    #[error("fan mode '{mode}' is not valid, valid fan modes are: {valid}")]
    InvalidFanMode { mode: String, valid: String },

    /// Preset mode is not in the entity's advertised list
    #[error("preset mode '{mode}' is not valid, valid preset modes are: {valid}")]
    InvalidPresetMode { mode: String, valid: String },

    /// Service data could not be parsed
    #[error("invalid service data: {0}")]
    InvalidServiceData(String),

    /// The service is not part of the climate domain
    #[error("unknown climate service: {0}")]
    UnknownService(String),

    /// No entity is registered under this id
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    /// The device reported a failure
    #[error(transparent)]
    Device(Box<dyn std::error::Error + Send + Sync>),
}

impl ClimateError {
    /// Wrap a device-level error without altering it
    pub fn device(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        ClimateError::Device(Box::new(error))
    }

    /// A value with no counterpart in an integration's mapping table
    pub fn lookup(kind: &'static str, value: impl Into<String>) -> Self {
        ClimateError::Lookup {
            kind,
            value: value.into(),
        }
    }
}
