use serde::{Deserialize, Serialize};

use crate::dynamics::state::FlightState;
use crate::vehicle::BodyParameters;

use super::controller::Pilot;
use super::input::ControlSample;

// ---------------------------------------------------------------------------
// Scripted pilot: timed control segments
// ---------------------------------------------------------------------------

/// Control held from `start` until the next segment begins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptSegment {
    pub start: f64, // s
    pub control: ControlSample,
}

/// Plays back a fixed control program keyed on simulation time.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPilot {
    segments: Vec<ScriptSegment>,
}

impl ScriptedPilot {
    pub fn new(mut segments: Vec<ScriptSegment>) -> Self {
        segments.sort_by(|a, b| a.start.total_cmp(&b.start));
        Self { segments }
    }

    /// Control active at time `t`; neutral before the first segment.
    pub fn control_at(&self, t: f64) -> ControlSample {
        self.segments
            .iter()
            .take_while(|s| s.start <= t)
            .last()
            .map_or_else(ControlSample::neutral, |s| s.control.clamped())
    }

    pub fn segments(&self) -> &[ScriptSegment] {
        &self.segments
    }
}

impl Pilot for ScriptedPilot {
    fn control(&mut self, state: &FlightState, _body: &BodyParameters, _dt: f64) -> ControlSample {
        self.control_at(state.time)
    }

    fn name(&self) -> &str {
        "Scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, throttle: f64, gx: f64) -> ScriptSegment {
        ScriptSegment { start, control: ControlSample::new(throttle, gx, 0.0, 0.0) }
    }

    #[test]
    fn picks_latest_started_segment() {
        let pilot = ScriptedPilot::new(vec![seg(2.0, 0.5, 0.3), seg(0.0, 1.0, 0.0), seg(5.0, 0.0, 0.0)]);
        assert_eq!(pilot.control_at(0.0).throttle, 1.0);
        assert_eq!(pilot.control_at(1.99).throttle, 1.0);
        assert_eq!(pilot.control_at(2.0).gimbal.x, 0.3);
        assert_eq!(pilot.control_at(10.0).throttle, 0.0);
    }

    #[test]
    fn neutral_before_first_segment() {
        let pilot = ScriptedPilot::new(vec![seg(1.0, 1.0, 0.0)]);
        assert_eq!(pilot.control_at(0.5), ControlSample::neutral());
    }
}
