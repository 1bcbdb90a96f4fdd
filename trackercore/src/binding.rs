use heapless::Vec;
use log::{error, info};
use uom::si::f32::AngularVelocity;

use crate::axis::Axis;
use crate::error::{HardwareRole, TrackerError};
use crate::hardware::{Actuator, PowerSensor};

pub trait HardwareRegistry {
    type Actuator: Actuator;
    type Sensor: PowerSensor;
    type Group: Iterator<Item = Self::Actuator>;

    fn actuator(&mut self, name: &str) -> Option<Self::Actuator>;

    fn sensor(&mut self, name: &str) -> Option<Self::Sensor>;

    /// Members of `group` in registry order. Unknown groups are empty.
    fn group(&mut self, name: &str) -> Self::Group;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisBinding {
    pub primary: &'static str,
    pub sensor: &'static str,
    pub secondaries: Option<&'static str>,
}

impl AxisBinding {
    pub const fn new(primary: &'static str, sensor: &'static str) -> Self {
        Self {
            primary,
            sensor,
            secondaries: None,
        }
    }

    pub const fn with_secondaries(self, group: &'static str) -> Self {
        Self {
            secondaries: Some(group),
            ..self
        }
    }

    fn resolve<R, const N: usize>(
        &self,
        registry: &mut R,
        speed: AngularVelocity,
    ) -> Result<Axis<R::Actuator, R::Sensor, N>, TrackerError>
    where
        R: HardwareRegistry,
    {
        let primary = registry
            .actuator(self.primary)
            .ok_or(TrackerError::MissingHardware {
                role: HardwareRole::Actuator,
                name: self.primary,
            })?;
        let sensor = registry
            .sensor(self.sensor)
            .ok_or(TrackerError::MissingHardware {
                role: HardwareRole::Sensor,
                name: self.sensor,
            })?;

        let axis = Axis::new(primary, sensor, speed);
        let axis = match self.secondaries {
            Some(group) => axis.with_secondaries(registry.group(group))?,
            None => axis,
        };
        info!(
            "axis `{}` bound to `{}` with {} linked actuators",
            self.primary,
            self.sensor,
            axis.secondaries().len()
        );
        Ok(axis)
    }
}

pub fn resolve_axes<R, const N: usize, const M: usize>(
    registry: &mut R,
    bindings: &[AxisBinding],
    speed: AngularVelocity,
) -> Result<Vec<Axis<R::Actuator, R::Sensor, N>, M>, TrackerError>
where
    R: HardwareRegistry,
{
    if bindings.is_empty() {
        return Err(TrackerError::NoAxes);
    }

    let mut axes = Vec::new();
    for binding in bindings {
        let axis = binding.resolve(registry, speed).map_err(|e| {
            error!("failed to bind axis `{}`: {}", binding.primary, e);
            e
        })?;
        if axes.push(axis).is_err() {
            return Err(TrackerError::TooManyAxes { capacity: M });
        }
    }
    Ok(axes)
}
