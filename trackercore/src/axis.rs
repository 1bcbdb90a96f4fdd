use core::fmt;

use heapless::Vec;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use uom::si::f32::{AngularVelocity, Power};

use crate::error::TrackerError;
use crate::hardware::{Actuator, PowerSensor};
use crate::homing::HomingController;

/// Sign applied to the axis speed. Never zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Direction::Forward => 1.0,
            Direction::Reverse => -1.0,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "+1"),
            Direction::Reverse => write!(f, "-1"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Reading {
    Valid(Power),
    Degenerate,
}

impl Reading {
    /// Negative outputs clamp to zero, non-finite ones are degenerate.
    pub fn new(output: Power) -> Self {
        if !output.value.is_finite() {
            warn!("non-finite sensor reading {:?}", output.value);
            Reading::Degenerate
        } else if output.value < 0.0 {
            warn!("negative sensor reading {:?} clamped to zero", output.value);
            Reading::Valid(Power::default())
        } else {
            Reading::Valid(output)
        }
    }

    pub fn level(&self) -> Power {
        match self {
            Reading::Valid(output) => *output,
            Reading::Degenerate => Power::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HillClimber {
    speed: AngularVelocity,
    direction: Direction,
    last_output: Power,
}

impl HillClimber {
    pub fn new(speed: AngularVelocity) -> Self {
        Self {
            speed,
            direction: Direction::Forward,
            last_output: Power::default(),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn last_output(&self) -> Power {
        self.last_output
    }

    pub fn velocity(&self) -> AngularVelocity {
        self.speed * self.direction.sign()
    }

    // no deadband: keeps oscillating around a maximum
    pub fn sample(&mut self, reading: Reading) -> AngularVelocity {
        if let Reading::Valid(output) = reading {
            if output < self.last_output {
                self.direction = self.direction.reversed();
                debug!(
                    "output dropped from {:?} W to {:?} W, direction now {}",
                    self.last_output.value, output.value, self.direction
                );
            }
            self.last_output = output;
        }
        self.velocity()
    }
}

#[derive(Debug)]
pub struct Axis<A, S, const N: usize> {
    primary: A,
    secondaries: Vec<A, N>,
    sensor: S,
    climber: HillClimber,
}

impl<A, S, const N: usize> Axis<A, S, N>
where
    A: Actuator,
    S: PowerSensor,
{
    pub fn new(primary: A, sensor: S, speed: AngularVelocity) -> Self {
        Self {
            primary,
            secondaries: Vec::new(),
            sensor,
            climber: HillClimber::new(speed),
        }
    }

    pub fn link(&mut self, actuator: A) -> Result<(), A> {
        self.secondaries.push(actuator)
    }

    pub fn with_secondaries<I>(mut self, actuators: I) -> Result<Self, TrackerError>
    where
        I: IntoIterator<Item = A>,
    {
        for actuator in actuators {
            if self.link(actuator).is_err() {
                return Err(TrackerError::TooManySecondaries { capacity: N });
            }
        }
        Ok(self)
    }

    pub fn primary(&self) -> &A {
        &self.primary
    }

    pub fn secondaries(&self) -> &[A] {
        &self.secondaries
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn direction(&self) -> Direction {
        self.climber.direction()
    }

    pub fn last_output(&self) -> Power {
        self.climber.last_output()
    }

    pub fn read(&self) -> Reading {
        Reading::new(self.sensor.output())
    }

    pub(crate) fn sample(&mut self, reading: Reading) {
        let velocity = self.climber.sample(reading);
        self.apply(velocity);
    }

    pub(crate) fn apply(&mut self, velocity: AngularVelocity) {
        command(&mut self.primary, velocity);
        for actuator in self.secondaries.iter_mut() {
            command(actuator, velocity);
        }
    }

    pub(crate) fn home(&mut self, homing: &HomingController) {
        let velocity = homing.command(self.primary.angle());
        command(&mut self.primary, velocity);
        for actuator in self.secondaries.iter_mut() {
            let velocity = homing.command(actuator.angle());
            command(actuator, velocity);
        }
    }
}

fn command<A: Actuator>(actuator: &mut A, velocity: AngularVelocity) {
    if let Err(e) = actuator.set_target_velocity(velocity) {
        warn!("actuator rejected {:?} rad/s: {:?}", velocity.value, e);
    }
}
