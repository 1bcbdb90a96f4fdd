use heapless::Vec;
use log::{debug, error, info};
use uom::si::f32::{AngularVelocity, Power, Time};

use crate::axis::{Axis, Reading};
use crate::binding::{resolve_axes, AxisBinding, HardwareRegistry};
use crate::clock::SampleClock;
use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::hardware::{Actuator, PowerSensor};
use crate::homing::HomingController;
use crate::report::{Mode, TickReport};

#[derive(Debug)]
enum State<A, S, const N: usize, const M: usize> {
    Active {
        axes: Vec<Axis<A, S, N>, M>,
        clock: SampleClock,
        homing: HomingController,
        last_mode: Option<Mode>,
    },
    Inert(TrackerError),
}

/// Hill-climbing tracker over up to `M` axes, each with up to `N` linked
/// actuators. The mode is recomputed from the sensors on every tick.
#[derive(Debug)]
pub struct SolarTracker<A, S, const N: usize, const M: usize> {
    state: State<A, S, N, M>,
}

impl<A, S, const N: usize, const M: usize> SolarTracker<A, S, N, M>
where
    A: Actuator,
    S: PowerSensor,
{
    pub fn new(config: &TrackerConfig, axes: Vec<Axis<A, S, N>, M>) -> Result<Self, TrackerError> {
        config.validate()?;
        if axes.is_empty() {
            return Err(TrackerError::NoAxes);
        }
        info!("tracker ready with {} axes", axes.len());
        Ok(Self {
            state: State::Active {
                axes,
                clock: SampleClock::new(config.sample_interval()),
                homing: HomingController::new(config.homing_tolerance(), config.homing_speed()),
                last_mode: None,
            },
        })
    }

    pub fn inert(fault: TrackerError) -> Self {
        error!("tracker inert: {}", fault);
        Self {
            state: State::Inert(fault),
        }
    }

    /// Any failure yields an inert tracker instead of an error.
    pub fn resolve<R>(config: &TrackerConfig, registry: &mut R, bindings: &[AxisBinding]) -> Self
    where
        R: HardwareRegistry<Actuator = A, Sensor = S>,
    {
        let built = config
            .validate()
            .and_then(|_| resolve_axes(registry, bindings, config.speed()))
            .and_then(|axes| Self::new(config, axes));
        match built {
            Ok(tracker) => tracker,
            Err(e) => Self::inert(e),
        }
    }

    pub fn is_inert(&self) -> bool {
        matches!(self.state, State::Inert(_))
    }

    pub fn fault(&self) -> Option<&TrackerError> {
        match &self.state {
            State::Inert(fault) => Some(fault),
            State::Active { .. } => None,
        }
    }

    pub fn axes(&self) -> &[Axis<A, S, N>] {
        match &self.state {
            State::Active { axes, .. } => axes,
            State::Inert(_) => &[],
        }
    }

    pub fn tick(&mut self, elapsed: Time) -> TickReport<M> {
        let (axes, clock, homing, last_mode) = match &mut self.state {
            State::Active {
                axes,
                clock,
                homing,
                last_mode,
            } => (axes, clock, homing, last_mode),
            State::Inert(fault) => return TickReport::inert(fault.clone()),
        };

        let mut readings = Vec::<Reading, M>::new();
        for axis in axes.iter() {
            // same capacity as `axes`
            let _ = readings.push(axis.read());
        }
        let total_output = readings
            .iter()
            .fold(Power::default(), |sum, reading| sum + reading.level());

        let mode = if total_output.value <= 0.0 {
            for axis in axes.iter_mut() {
                axis.home(homing);
            }
            Mode::Homing
        } else if clock.advance(elapsed) {
            for (axis, reading) in axes.iter_mut().zip(readings.iter()) {
                axis.sample(*reading);
            }
            Mode::Tracking { sampled: true }
        } else {
            Mode::Tracking { sampled: false }
        };

        let changed = match (*last_mode, mode) {
            (Some(Mode::Homing), Mode::Homing) => false,
            (Some(Mode::Tracking { .. }), Mode::Tracking { .. }) => false,
            _ => true,
        };
        if changed {
            debug!("entering {:?} at {:?} W", mode, total_output.value);
        }
        *last_mode = Some(mode);

        TickReport {
            mode,
            total_output,
            outputs: readings.iter().map(|reading| reading.level()).collect(),
            directions: axes.iter().map(|axis| axis.direction()).collect(),
            fault: None,
        }
    }

    pub fn halt(&mut self) {
        if let State::Active { axes, .. } = &mut self.state {
            info!("halting all actuators");
            for axis in axes.iter_mut() {
                axis.apply(AngularVelocity::default());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::Direction;
    use crate::mock::{MockRotor, MockSensor};
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use uom::si::{angular_velocity::revolution_per_minute, time::second};

    type Tracker = SolarTracker<MockRotor, MockSensor, 2, 2>;

    struct Rig {
        tracker: Tracker,
        rotors: std::vec::Vec<MockRotor>,
        sensors: [MockSensor; 2],
    }

    // two axes, the second one with two linked actuators
    fn rig(azimuth_deg: f32, elevation_deg: f32) -> Rig {
        let config = TrackerConfig::default();
        let rotors = vec![
            MockRotor::new(azimuth_deg),
            MockRotor::new(elevation_deg),
            MockRotor::new(elevation_deg),
            MockRotor::new(elevation_deg),
        ];
        let sensors = [MockSensor::new(0.0), MockSensor::new(0.0)];

        let mut axes = Vec::new();
        axes.push(Axis::new(rotors[0].clone(), sensors[0].clone(), config.speed()))
            .unwrap();
        axes.push(
            Axis::new(rotors[1].clone(), sensors[1].clone(), config.speed())
                .with_secondaries([rotors[2].clone(), rotors[3].clone()])
                .unwrap(),
        )
        .unwrap();

        Rig {
            tracker: Tracker::new(&config, axes).unwrap(),
            rotors,
            sensors,
        }
    }

    fn seconds(value: f32) -> Time {
        Time::new::<second>(value)
    }

    fn rpm(rotor: &MockRotor) -> Option<f32> {
        rotor
            .last_command()
            .map(|v| v.get::<revolution_per_minute>())
    }

    #[test]
    fn test_zero_total_selects_homing() {
        let mut rig = rig(40.0, -20.0);
        let report = rig.tracker.tick(seconds(0.25));

        assert_eq!(report.mode, Mode::Homing);
        assert_relative_eq!(rpm(&rig.rotors[0]).unwrap(), -0.3, epsilon = 1e-6);
        for rotor in &rig.rotors[1..] {
            assert_relative_eq!(rpm(rotor).unwrap(), 0.3, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_total_output_selects_tracking() {
        let mut rig = rig(40.0, -20.0);
        rig.sensors[1].set(3.0);

        let report = rig.tracker.tick(seconds(0.25));
        assert_eq!(report.mode, Mode::Tracking { sampled: false });
        assert_relative_eq!(report.total_output.value, 3.0);
        for rotor in &rig.rotors {
            assert_eq!(rotor.command_count(), 0);
        }
    }

    #[test]
    fn test_sampling_fans_out() {
        let mut rig = rig(0.0, 0.0);
        rig.sensors[0].set(2.0);
        rig.sensors[1].set(2.0);

        let modes = (0..4)
            .map(|_| rig.tracker.tick(seconds(0.25)).mode)
            .collect::<std::vec::Vec<_>>();
        assert_eq!(
            modes,
            vec![
                Mode::Tracking { sampled: false },
                Mode::Tracking { sampled: false },
                Mode::Tracking { sampled: false },
                Mode::Tracking { sampled: true },
            ]
        );

        rig.sensors[1].set(1.0);
        for _ in 0..4 {
            rig.tracker.tick(seconds(0.25));
        }
        let axes = rig.tracker.axes();
        assert_eq!(axes[0].direction(), Direction::Forward);
        assert_eq!(axes[1].direction(), Direction::Reverse);

        assert_relative_eq!(rpm(&rig.rotors[0]).unwrap(), 0.3, epsilon = 1e-6);
        let elevation = rig.rotors[1].last_command();
        assert_relative_eq!(rpm(&rig.rotors[1]).unwrap(), -0.3, epsilon = 1e-6);
        for rotor in &rig.rotors[2..] {
            assert_eq!(rotor.last_command(), elevation);
            assert_eq!(rotor.command_count(), 2);
        }
    }

    #[test]
    fn test_state_held_between_samples() {
        let mut rig = rig(0.0, 0.0);
        rig.sensors[0].set(5.0);
        rig.sensors[1].set(5.0);
        rig.tracker.tick(seconds(1.0));

        let test_cases = vec![(1.0, 0.25), (9.0, 0.25), (0.5, 0.25)];
        for (output, dt) in test_cases {
            rig.sensors[0].set(output);
            rig.sensors[1].set(output);
            let report = rig.tracker.tick(seconds(dt));
            assert_eq!(report.mode, Mode::Tracking { sampled: false });
            for axis in rig.tracker.axes() {
                assert_eq!(axis.direction(), Direction::Forward);
                assert_relative_eq!(axis.last_output().value, 5.0);
            }
        }

        let report = rig.tracker.tick(seconds(0.25));
        assert_eq!(report.mode, Mode::Tracking { sampled: true });
        for axis in rig.tracker.axes() {
            assert_eq!(axis.direction(), Direction::Reverse);
            assert_relative_eq!(axis.last_output().value, 0.5);
        }
    }

    #[test]
    fn test_homing_ignores_direction_state() {
        let mut rig = rig(0.0, 0.0);
        rig.sensors[0].set(5.0);
        rig.tracker.tick(seconds(1.0));
        rig.sensors[0].set(4.0);
        rig.tracker.tick(seconds(1.0));
        assert_eq!(rig.tracker.axes()[0].direction(), Direction::Reverse);

        rig.sensors[0].set(0.0);
        let test_cases = vec![(30.0, -0.3), (-10.0, 0.3), (0.5, 0.0)];
        for (angle, expected) in test_cases {
            rig.rotors[0].set_angle(angle);
            let report = rig.tracker.tick(seconds(1.0));
            assert_eq!(report.mode, Mode::Homing);
            assert_relative_eq!(rpm(&rig.rotors[0]).unwrap(), expected, epsilon = 1e-6);
            assert_eq!(rig.tracker.axes()[0].direction(), Direction::Reverse);
            assert_relative_eq!(rig.tracker.axes()[0].last_output().value, 4.0);
        }
    }

    #[test]
    fn test_homing_does_not_advance_clock() {
        let mut rig = rig(0.0, 0.0);
        rig.tracker.tick(seconds(5.0));

        rig.sensors[0].set(1.0);
        let report = rig.tracker.tick(seconds(0.5));
        assert_eq!(report.mode, Mode::Tracking { sampled: false });
    }

    #[test]
    fn test_degenerate_readings() {
        let mut rig = rig(10.0, 10.0);
        rig.sensors[0].set(f32::NAN);
        rig.sensors[1].set(-4.0);

        let report = rig.tracker.tick(seconds(1.0));
        assert_eq!(report.mode, Mode::Homing);

        rig.sensors[1].set(2.0);
        let report = rig.tracker.tick(seconds(1.0));
        assert_eq!(report.mode, Mode::Tracking { sampled: true });
        assert_eq!(rig.tracker.axes()[0].direction(), Direction::Forward);
        assert_relative_eq!(rig.tracker.axes()[0].last_output().value, 0.0);
    }

    #[test]
    fn test_halt() {
        let mut rig = rig(10.0, 10.0);
        rig.tracker.halt();
        for rotor in &rig.rotors {
            assert_eq!(rotor.last_command(), Some(AngularVelocity::default()));
        }
    }

    #[test]
    fn test_inert() {
        let mut tracker = Tracker::inert(TrackerError::NoAxes);
        let report = tracker.tick(seconds(1.0));
        assert_eq!(report.mode, Mode::Inert);
        assert_eq!(report.fault, Some(TrackerError::NoAxes));
        assert!(tracker.is_inert());
        assert!(tracker.axes().is_empty());
        tracker.halt();
    }

    #[test]
    fn test_new_rejects_invalid_input() {
        let config = TrackerConfig::default();
        assert_eq!(
            Tracker::new(&config, Vec::new()).err(),
            Some(TrackerError::NoAxes)
        );

        let config = TrackerConfig {
            sample_interval_secs: -1.0,
            ..Default::default()
        };
        assert_eq!(
            Tracker::new(&config, Vec::new()).err(),
            Some(TrackerError::InvalidConfig("sample_interval_secs"))
        );
    }

    proptest! {
        #[test]
        fn test_mode_selection(
            outputs in proptest::collection::vec(
                (
                    prop_oneof![Just(0.0f32), 0.001f32..100.0],
                    prop_oneof![Just(0.0f32), 0.001f32..100.0],
                ),
                1..50,
            ),
        ) {
            let mut rig = rig(5.0, -5.0);
            for (a, b) in outputs {
                rig.sensors[0].set(a);
                rig.sensors[1].set(b);
                let mode = rig.tracker.tick(seconds(0.25)).mode;
                if a + b == 0.0 {
                    prop_assert_eq!(mode, Mode::Homing);
                } else {
                    prop_assert!(
                        matches!(mode, Mode::Tracking { .. }),
                        "expected tracking, got {:?}",
                        mode
                    );
                }
            }
        }

        #[test]
        fn test_secondaries_track_primary(
            outputs in proptest::collection::vec(0.001f32..100.0, 1..50),
        ) {
            let mut rig = rig(0.0, 0.0);
            for output in outputs {
                rig.sensors[1].set(output);
                rig.tracker.tick(seconds(1.0));
                let primary = rig.rotors[1].last_command();
                prop_assert!(primary.is_some());
                for rotor in &rig.rotors[2..] {
                    prop_assert_eq!(rotor.last_command(), primary);
                }
            }
        }
    }
}
