use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::vec::Vec;

use uom::si::{
    angle::degree,
    f32::{Angle, AngularVelocity, Power},
    power::watt,
};

use crate::hardware::{Actuator, PowerSensor};

#[derive(Debug, Default)]
struct RotorState {
    angle: Angle,
    commands: Vec<AngularVelocity>,
    reject: bool,
}

#[derive(Debug, Clone)]
pub struct MockRotor(Rc<RefCell<RotorState>>);

impl MockRotor {
    pub fn new(angle_deg: f32) -> Self {
        Self(Rc::new(RefCell::new(RotorState {
            angle: Angle::new::<degree>(angle_deg),
            ..Default::default()
        })))
    }

    pub fn rejecting(angle_deg: f32) -> Self {
        let rotor = Self::new(angle_deg);
        rotor.0.borrow_mut().reject = true;
        rotor
    }

    pub fn set_angle(&self, angle_deg: f32) {
        self.0.borrow_mut().angle = Angle::new::<degree>(angle_deg);
    }

    pub fn last_command(&self) -> Option<AngularVelocity> {
        self.0.borrow().commands.last().copied()
    }

    pub fn command_count(&self) -> usize {
        self.0.borrow().commands.len()
    }
}

impl Actuator for MockRotor {
    type Error = &'static str;

    fn angle(&self) -> Angle {
        self.0.borrow().angle
    }

    fn set_target_velocity(&mut self, velocity: AngularVelocity) -> Result<(), Self::Error> {
        let mut state = self.0.borrow_mut();
        if state.reject {
            return Err("rejected");
        }
        state.commands.push(velocity);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct MockSensor(Rc<Cell<f32>>);

impl MockSensor {
    pub fn new(watts: f32) -> Self {
        Self(Rc::new(Cell::new(watts)))
    }

    pub fn set(&self, watts: f32) {
        self.0.set(watts);
    }
}

impl PowerSensor for MockSensor {
    fn output(&self) -> Power {
        Power::new::<watt>(self.0.get())
    }
}
