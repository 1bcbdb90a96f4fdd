use core::fmt::Debug;

use uom::si::f32::{Angle, AngularVelocity, Power};

pub trait Actuator {
    type Error: Debug;

    /// Current angle as reported by the hardware. May lie outside [-pi, pi].
    fn angle(&self) -> Angle;

    fn set_target_velocity(&mut self, velocity: AngularVelocity) -> Result<(), Self::Error>;
}

pub trait PowerSensor {
    fn output(&self) -> Power;
}
