use crate::dynamics::state::FlightState;
use crate::vehicle::BodyParameters;

use super::input::ControlSample;

/// Trait for anything that publishes control samples once per tick.
///
/// In an interactive host this is the input-mapping layer; here it lets scripted and
/// closed-loop pilots drive the simulation runner.
pub trait Pilot {
    /// Compute the control sample for the coming tick.
    fn control(&mut self, state: &FlightState, body: &BodyParameters, dt: f64) -> ControlSample;

    /// Reset internal state (e.g., PID integrators).
    fn reset(&mut self) {}

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}

/// Holds one control sample forever.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPilot(pub ControlSample);

impl Pilot for FixedPilot {
    fn control(&mut self, _state: &FlightState, _body: &BodyParameters, _dt: f64) -> ControlSample {
        self.0
    }

    fn name(&self) -> &str {
        "Fixed"
    }
}
