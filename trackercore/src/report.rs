use core::fmt;

use heapless::Vec;
use serde::{Deserialize, Serialize};
use uom::si::{f32::Power, power::kilowatt};

use crate::axis::Direction;
use crate::error::TrackerError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Inert,
    Homing,
    Tracking { sampled: bool },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TickReport<const M: usize> {
    pub mode: Mode,
    // sum of one reading per axis; axes sharing a sensor count it once each
    pub total_output: Power,
    pub outputs: Vec<Power, M>,
    pub directions: Vec<Direction, M>,
    pub fault: Option<TrackerError>,
}

impl<const M: usize> TickReport<M> {
    pub(crate) fn inert(fault: TrackerError) -> Self {
        Self {
            mode: Mode::Inert,
            total_output: Power::default(),
            outputs: Vec::new(),
            directions: Vec::new(),
            fault: Some(fault),
        }
    }
}

impl<const M: usize> fmt::Display for TickReport<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            Mode::Inert => {
                write!(f, "Tracker inert")?;
                if let Some(fault) = &self.fault {
                    write!(f, ": {}", fault)?;
                }
                return writeln!(f);
            }
            Mode::Homing => writeln!(f, "Mode: homing")?,
            Mode::Tracking { sampled: true } => writeln!(f, "Mode: tracking (sampled)")?,
            Mode::Tracking { sampled: false } => writeln!(f, "Mode: tracking")?,
        }
        for (i, (output, direction)) in self.outputs.iter().zip(self.directions.iter()).enumerate() {
            writeln!(
                f,
                "Axis {}: output {:.2} kW, direction {}",
                i,
                output.get::<kilowatt>(),
                direction
            )?;
        }
        Ok(())
    }
}
