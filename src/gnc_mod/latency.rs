use nalgebra::Vector2;
use tracing::debug;

/// Samples closer than this to the pending value are not a new command.
pub const CHANGE_EPSILON: f64 = 1e-6;

/// Tolerance on the latency comparison so accumulated tick clocks still promote on time.
pub const TIME_EPSILON: f64 = 1e-9;

/// A control quantity that can be delayed by an actuator.
pub trait ActuatorValue: Copy + std::fmt::Debug {
    fn distance(&self, other: &Self) -> f64;
}

impl ActuatorValue for f64 {
    fn distance(&self, other: &Self) -> f64 {
        (self - other).abs()
    }
}

impl ActuatorValue for Vector2<f64> {
    fn distance(&self, other: &Self) -> f64 {
        (self - other).norm()
    }
}

// ---------------------------------------------------------------------------
// Actuator channel: pending -> active after latency
// ---------------------------------------------------------------------------

/// One latency-gated actuator (throttle or gimbal).
///
/// The latest raw sample is held as pending along with the time it was first
/// seen. It becomes active once it has been pending for at least `latency`
/// seconds. A newer, different sample restarts the wait.
#[derive(Debug, Clone, PartialEq)]
pub struct ActuatorChannel<T> {
    name: &'static str,
    latency: f64,
    pending: T,
    pending_since: f64,
    active: T,
}

impl<T: ActuatorValue> ActuatorChannel<T> {
    pub fn new(name: &'static str, latency: f64, initial: T) -> Self {
        Self {
            name,
            latency,
            pending: initial,
            pending_since: 0.0,
            active: initial,
        }
    }

    /// Feed the latest raw sample at simulation time `now`.
    /// Returns true when the pending value was promoted to active.
    pub fn sample(&mut self, value: T, now: f64) -> bool {
        if value.distance(&self.pending) > CHANGE_EPSILON {
            self.pending = value;
            self.pending_since = now;
        }

        let ready = now - self.pending_since + TIME_EPSILON >= self.latency;
        if ready && self.active.distance(&self.pending) > 0.0 {
            debug!(
                channel = self.name,
                from = ?self.active,
                to = ?self.pending,
                age = now - self.pending_since,
                "actuator command took effect"
            );
            self.active = self.pending;
            return true;
        }
        false
    }

    pub fn active(&self) -> T {
        self.active
    }

    pub fn pending(&self) -> T {
        self.pending
    }

    pub fn pending_since(&self) -> f64 {
        self.pending_since
    }

    pub fn latency(&self) -> f64 {
        self.latency
    }

    /// Drop any pending command and set both values to `value`.
    pub fn reset(&mut self, value: T) {
        self.pending = value;
        self.active = value;
        self.pending_since = 0.0;
    }
}
