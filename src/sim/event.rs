use serde::Serialize;

use super::runner::FlightSample;

// ---------------------------------------------------------------------------
// Flight events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    Apogee,
    Altitude { threshold: f64, ascending: bool },
    MotorCutoff,
    Fault,
}

/// A discrete event that occurred during a run.
#[derive(Debug, Clone, Serialize)]
pub struct FlightEvent {
    pub time: f64,
    #[serde(flatten)]
    pub kind: EventKind,
    pub altitude: f64,
}

impl FlightEvent {
    pub fn at(sample: &FlightSample, kind: EventKind) -> Self {
        Self { time: sample.time, kind, altitude: sample.position.y }
    }
}

/// Passive detector over consecutive samples.
pub trait EventDetector {
    fn check(&mut self, prev: &FlightSample, current: &FlightSample) -> Option<EventKind>;
}

/// Vertical velocity turning from positive to non-positive.
#[derive(Debug, Default)]
pub struct ApogeeDetector {
    fired: bool,
}

impl EventDetector for ApogeeDetector {
    fn check(&mut self, prev: &FlightSample, current: &FlightSample) -> Option<EventKind> {
        if !self.fired && prev.velocity.y > 0.0 && current.velocity.y <= 0.0 {
            self.fired = true;
            Some(EventKind::Apogee)
        } else {
            None
        }
    }
}

/// Altitude crossing a threshold in one direction. Fires once.
#[derive(Debug)]
pub struct AltitudeDetector {
    pub altitude: f64,
    pub ascending: bool,
    fired: bool,
}

impl AltitudeDetector {
    pub fn new(altitude: f64, ascending: bool) -> Self {
        Self { altitude, ascending, fired: false }
    }
}

impl EventDetector for AltitudeDetector {
    fn check(&mut self, prev: &FlightSample, current: &FlightSample) -> Option<EventKind> {
        if self.fired {
            return None;
        }
        let (a, b) = (prev.position.y, current.position.y);
        let crossed = if self.ascending {
            a < self.altitude && b >= self.altitude
        } else {
            a > self.altitude && b <= self.altitude
        };
        if crossed {
            self.fired = true;
            Some(EventKind::Altitude { threshold: self.altitude, ascending: self.ascending })
        } else {
            None
        }
    }
}

/// Active throttle dropping to zero after having been on.
#[derive(Debug, Default)]
pub struct MotorCutoffDetector;

impl EventDetector for MotorCutoffDetector {
    fn check(&mut self, prev: &FlightSample, current: &FlightSample) -> Option<EventKind> {
        (prev.throttle > 0.0 && current.throttle <= 0.0).then_some(EventKind::MotorCutoff)
    }
}

/// Apogee and motor cutoff.
pub fn default_detectors() -> Vec<Box<dyn EventDetector>> {
    vec![Box::new(ApogeeDetector::default()), Box::new(MotorCutoffDetector)]
}
