pub mod controller;
pub mod guidance;
pub mod input;
pub mod latency;
pub mod pid;
pub mod tvc;

pub use controller::{FixedPilot, Pilot};
pub use guidance::{ScriptSegment, ScriptedPilot};
pub use input::{ControlSample, GuidanceInput, RollConfig};
pub use latency::{ActuatorChannel, ActuatorValue};
pub use pid::{Pid, PidGains};
pub use tvc::TvcPilot;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Deserializable choice of pilot for a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PilotConfig {
    Fixed { control: ControlSample },
    Script { segments: Vec<ScriptSegment> },
    Track {
        target: Vector3<f64>,
        throttle: f64,
        #[serde(default)]
        gains: PidGains,
    },
}

impl Default for PilotConfig {
    fn default() -> Self {
        PilotConfig::Fixed { control: ControlSample::new(1.0, 0.0, 0.0, 0.0) }
    }
}

impl PilotConfig {
    pub fn build(&self) -> Box<dyn Pilot> {
        match self {
            PilotConfig::Fixed { control } => Box::new(FixedPilot(control.clamped())),
            PilotConfig::Script { segments } => Box::new(ScriptedPilot::new(segments.clone())),
            PilotConfig::Track { target, throttle, gains } => {
                Box::new(TvcPilot::new(*target, *throttle, *gains))
            }
        }
    }
}
