#![cfg_attr(not(test), no_std)]

pub mod axis;
pub mod binding;
pub mod clock;
pub mod config;
pub mod error;
pub mod hardware;
pub mod homing;
pub mod report;
pub mod tracker;

#[cfg(test)]
mod mock;

pub use axis::{Axis, Direction, HillClimber, Reading};
pub use binding::{resolve_axes, AxisBinding, HardwareRegistry};
pub use clock::SampleClock;
pub use config::TrackerConfig;
pub use error::{HardwareRole, TrackerError};
pub use hardware::{Actuator, PowerSensor};
pub use homing::{home, HomingController};
pub use report::{Mode, TickReport};
pub use tracker::SolarTracker;
