use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use uom::si::{
    angle::degree,
    angular_velocity::revolution_per_minute,
    f32::{Angle, AngularVelocity, Time},
    time::second,
};

use crate::error::TrackerError;

pub const DEFAULT_SAMPLE_INTERVAL_SECS: f32 = 1.0;
pub const DEFAULT_SPEED_RPM: f32 = 0.3;
pub const DEFAULT_HOMING_SPEED_RPM: f32 = 0.3;
pub const DEFAULT_HOMING_TOLERANCE_DEG: f32 = 1.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(default)]
pub struct TrackerConfig {
    #[builder(default = DEFAULT_SAMPLE_INTERVAL_SECS)]
    pub sample_interval_secs: f32,
    #[builder(default = DEFAULT_SPEED_RPM)]
    pub speed_rpm: f32,
    #[builder(default = DEFAULT_HOMING_SPEED_RPM)]
    pub homing_speed_rpm: f32,
    #[builder(default = DEFAULT_HOMING_TOLERANCE_DEG)]
    pub homing_tolerance_deg: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            sample_interval_secs: DEFAULT_SAMPLE_INTERVAL_SECS,
            speed_rpm: DEFAULT_SPEED_RPM,
            homing_speed_rpm: DEFAULT_HOMING_SPEED_RPM,
            homing_tolerance_deg: DEFAULT_HOMING_TOLERANCE_DEG,
        }
    }
}

impl TrackerConfig {
    pub fn sample_interval(&self) -> Time {
        Time::new::<second>(self.sample_interval_secs)
    }

    pub fn speed(&self) -> AngularVelocity {
        AngularVelocity::new::<revolution_per_minute>(self.speed_rpm)
    }

    pub fn homing_speed(&self) -> AngularVelocity {
        AngularVelocity::new::<revolution_per_minute>(self.homing_speed_rpm)
    }

    pub fn homing_tolerance(&self) -> Angle {
        Angle::new::<degree>(self.homing_tolerance_deg)
    }

    pub fn validate(&self) -> Result<(), TrackerError> {
        let positive = |value: f32| value.is_finite() && value > 0.0;

        if !positive(self.sample_interval_secs) {
            return Err(TrackerError::InvalidConfig("sample_interval_secs"));
        }
        if !positive(self.speed_rpm) {
            return Err(TrackerError::InvalidConfig("speed_rpm"));
        }
        if !positive(self.homing_speed_rpm) {
            return Err(TrackerError::InvalidConfig("homing_speed_rpm"));
        }
        if !(self.homing_tolerance_deg.is_finite() && self.homing_tolerance_deg >= 0.0) {
            return Err(TrackerError::InvalidConfig("homing_tolerance_deg"));
        }
        Ok(())
    }
}
