use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HardwareRole {
    Actuator,
    Sensor,
}

impl fmt::Display for HardwareRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HardwareRole::Actuator => write!(f, "actuator"),
            HardwareRole::Sensor => write!(f, "sensor"),
        }
    }
}

/// Errors raised while building a tracker. None of them escape a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
pub enum TrackerError {
    #[error("missing {role} `{name}`")]
    MissingHardware {
        role: HardwareRole,
        name: &'static str,
    },
    #[error("no tracking axis configured")]
    NoAxes,
    #[error("more than {capacity} tracking axes")]
    TooManyAxes { capacity: usize },
    #[error("more than {capacity} linked actuators on one axis")]
    TooManySecondaries { capacity: usize },
    #[error("invalid configuration value for `{0}`")]
    InvalidConfig(&'static str),
}
