#![no_std]

use core::cell::Cell;

use heapless::Vec;
#[allow(unused_imports)]
use micromath::F32Ext;
use trackercore::{Actuator, HardwareRegistry, PowerSensor};
use typed_builder::TypedBuilder;
use uom::si::f32::{Angle, AngularVelocity, Power, Time};

const MAX_JOINTS: usize = 16;
const MAX_PANELS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JointId(usize);

#[derive(Debug)]
struct Joint {
    name: &'static str,
    group: Option<&'static str>,
    angle: Cell<Angle>,
    velocity: Cell<AngularVelocity>,
    commands: Cell<u32>,
    rejecting: Cell<bool>,
}

#[derive(Debug)]
struct Panel {
    name: &'static str,
    azimuth: JointId,
    elevation: JointId,
}

// State lives in cells so rotor and panel handles can borrow the simulator
// while it is stepped.
#[derive(Debug, TypedBuilder)]
pub struct Simulator {
    #[builder(setter(transform = |angle: Angle| Cell::new(angle)))]
    sun_azimuth: Cell<Angle>,
    #[builder(setter(transform = |angle: Angle| Cell::new(angle)))]
    sun_elevation: Cell<Angle>,
    peak_power: Power,
    #[builder(default = Cell::new(true), setter(skip))]
    daylight: Cell<bool>,
    #[builder(default, setter(skip))]
    joints: Vec<Joint, MAX_JOINTS>,
    #[builder(default, setter(skip))]
    panels: Vec<Panel, MAX_PANELS>,
}

impl Simulator {
    pub fn add_joint(&mut self, name: &'static str, angle: Angle) -> JointId {
        self.push_joint(name, None, angle)
    }

    pub fn add_linked_joint(
        &mut self,
        name: &'static str,
        group: &'static str,
        angle: Angle,
    ) -> JointId {
        self.push_joint(name, Some(group), angle)
    }

    fn push_joint(
        &mut self,
        name: &'static str,
        group: Option<&'static str>,
        angle: Angle,
    ) -> JointId {
        let id = JointId(self.joints.len());
        self.joints
            .push(Joint {
                name,
                group,
                angle: Cell::new(angle),
                velocity: Cell::new(AngularVelocity::default()),
                commands: Cell::new(0),
                rejecting: Cell::new(false),
            })
            .unwrap();
        id
    }

    pub fn add_panel(&mut self, name: &'static str, azimuth: JointId, elevation: JointId) {
        self.panels
            .push(Panel {
                name,
                azimuth,
                elevation,
            })
            .unwrap();
    }

    pub fn set_daylight(&self, daylight: bool) {
        self.daylight.set(daylight);
    }

    pub fn set_sun(&self, azimuth: Angle, elevation: Angle) {
        self.sun_azimuth.set(azimuth);
        self.sun_elevation.set(elevation);
    }

    pub fn reject_commands(&self, id: JointId, rejecting: bool) {
        self.joints[id.0].rejecting.set(rejecting);
    }

    pub fn angle(&self, id: JointId) -> Angle {
        self.joints[id.0].angle.get()
    }

    pub fn velocity(&self, id: JointId) -> AngularVelocity {
        self.joints[id.0].velocity.get()
    }

    pub fn command_count(&self, id: JointId) -> u32 {
        self.joints[id.0].commands.get()
    }

    pub fn step(&self, dt: Time) {
        for joint in self.joints.iter() {
            let next = joint.angle.get() + Angle::from(joint.velocity.get() * dt);
            joint.angle.set(next);
        }
    }

    pub fn rotor(&self, id: JointId) -> SimRotor<'_> {
        SimRotor {
            joint: &self.joints[id.0],
        }
    }

    pub fn panel_output(&self, name: &str) -> Option<Power> {
        self.panels
            .iter()
            .find(|panel| panel.name == name)
            .map(|panel| self.output(panel))
    }

    pub fn registry(&self) -> SimRegistry<'_> {
        SimRegistry { sim: self }
    }

    fn output(&self, panel: &Panel) -> Power {
        if !self.daylight.get() {
            return Power::default();
        }
        let azimuth = self.angle(panel.azimuth).value;
        let elevation = self.angle(panel.elevation).value;
        let sun_azimuth = self.sun_azimuth.get().value;
        let sun_elevation = self.sun_elevation.get().value;

        let incidence = elevation.cos() * sun_elevation.cos() * (azimuth - sun_azimuth).cos()
            + elevation.sin() * sun_elevation.sin();
        if incidence > 0.0 {
            self.peak_power * incidence
        } else {
            Power::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandRejected(pub &'static str);

#[derive(Clone, Copy, Debug)]
pub struct SimRotor<'a> {
    joint: &'a Joint,
}

impl<'a> Actuator for SimRotor<'a> {
    type Error = CommandRejected;

    fn angle(&self) -> Angle {
        self.joint.angle.get()
    }

    fn set_target_velocity(&mut self, velocity: AngularVelocity) -> Result<(), Self::Error> {
        if self.joint.rejecting.get() {
            return Err(CommandRejected(self.joint.name));
        }
        self.joint.velocity.set(velocity);
        self.joint.commands.set(self.joint.commands.get() + 1);
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SimPanel<'a> {
    sim: &'a Simulator,
    panel: &'a Panel,
}

impl<'a> PowerSensor for SimPanel<'a> {
    fn output(&self) -> Power {
        self.sim.output(self.panel)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SimRegistry<'a> {
    sim: &'a Simulator,
}

impl<'a> HardwareRegistry for SimRegistry<'a> {
    type Actuator = SimRotor<'a>;
    type Sensor = SimPanel<'a>;
    type Group = GroupMembers<'a>;

    fn actuator(&mut self, name: &str) -> Option<SimRotor<'a>> {
        let sim = self.sim;
        sim.joints
            .iter()
            .find(|joint| joint.name == name)
            .map(|joint| SimRotor { joint })
    }

    fn sensor(&mut self, name: &str) -> Option<SimPanel<'a>> {
        let sim = self.sim;
        sim.panels
            .iter()
            .find(|panel| panel.name == name)
            .map(|panel| SimPanel { sim, panel })
    }

    fn group(&mut self, name: &str) -> GroupMembers<'a> {
        let sim = self.sim;
        let group = sim
            .joints
            .iter()
            .find_map(|joint| joint.group.filter(|group| *group == name));
        GroupMembers {
            joints: sim.joints.iter(),
            group,
        }
    }
}

pub struct GroupMembers<'a> {
    joints: core::slice::Iter<'a, Joint>,
    group: Option<&'static str>,
}

impl<'a> Iterator for GroupMembers<'a> {
    type Item = SimRotor<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let group = self.group?;
        self.joints
            .by_ref()
            .find(|joint| joint.group == Some(group))
            .map(|joint| SimRotor { joint })
    }
}
