#[allow(unused_imports)]
use micromath::F32Ext;
use uom::si::{
    angle::{degree, radian},
    f32::{Angle, AngularVelocity},
};

#[derive(Clone, Debug, PartialEq)]
pub struct HomingController {
    tolerance: Angle,
    speed: AngularVelocity,
}

impl HomingController {
    pub fn new(tolerance: Angle, speed: AngularVelocity) -> Self {
        Self { tolerance, speed }
    }

    pub fn command(&self, angle: Angle) -> AngularVelocity {
        home(angle, self.tolerance, self.speed)
    }
}

/// Velocity that rotates `angle` toward zero along the shorter way, or zero
/// once it is strictly inside `tolerance`.
pub fn home(angle: Angle, tolerance: Angle, speed: AngularVelocity) -> AngularVelocity {
    let angle_deg = normalize_angle(angle).get::<degree>();
    let tolerance_deg = tolerance.get::<degree>();

    if angle_deg.abs() < tolerance_deg {
        AngularVelocity::default()
    } else if angle_deg > 0.0 {
        -speed
    } else if angle_deg < 0.0 {
        speed
    } else {
        AngularVelocity::default()
    }
}

// normalize angle to [-pi, pi].
fn normalize_angle(angle: Angle) -> Angle {
    use core::f32::consts::{PI, TAU};

    let raw_angle = angle.value.rem_euclid(TAU);

    Angle::new::<radian>(if raw_angle > PI {
        raw_angle - TAU
    } else {
        raw_angle
    })
}
