use log::warn;
use uom::si::f32::Time;

#[derive(Debug, Clone, PartialEq)]
pub struct SampleClock {
    interval: Time,
    elapsed: Time,
}

impl SampleClock {
    pub fn new(interval: Time) -> Self {
        Self {
            interval,
            elapsed: Time::default(),
        }
    }

    pub fn interval(&self) -> Time {
        self.interval
    }

    pub fn elapsed(&self) -> Time {
        self.elapsed
    }

    pub fn reset(&mut self) {
        self.elapsed = Time::default();
    }

    pub fn advance(&mut self, dt: Time) -> bool {
        if dt.value.is_finite() && dt.value >= 0.0 {
            self.elapsed += dt;
        } else {
            warn!("ignoring elapsed time {:?} s", dt.value);
        }

        if self.elapsed >= self.interval {
            self.reset();
            true
        } else {
            false
        }
    }
}
