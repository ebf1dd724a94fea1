use std::fs;
use std::path::Path;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::dynamics::state::InitialConditions;
use crate::error::Result;
use crate::gnc::{ControlSample, PidGains, Pilot, PilotConfig, ScriptSegment};
use crate::physics::environment::{EnvironmentConfig, WindConfig};
use crate::vehicle::{presets, BodyConfig, BodyParameters};

use super::integrator::FlightIntegrator;
use super::runner::RunConfig;

/// Built-in scenario names accepted by [`ScenarioConfig::preset`].
pub const PRESETS: &[&str] = &["vertical", "missile", "glide"];

// ---------------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------------

/// Everything needed to run one projectile: body, world, launch pose, tick
/// settings and pilot program. Every field has a default, so a JSON file only
/// needs the parts it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub name: String,
    pub body: BodyConfig,
    pub environment: EnvironmentConfig,
    pub initial: InitialConditions,
    pub run: RunConfig,
    pub pilot: PilotConfig,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            body: presets::test_rocket(),
            environment: EnvironmentConfig::default(),
            initial: InitialConditions::default(),
            run: RunConfig::default(),
            pilot: PilotConfig::default(),
        }
    }
}

impl ScenarioConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the body and assemble an integrator in its environment.
    pub fn build_integrator(&self) -> Result<FlightIntegrator> {
        let body = BodyParameters::new(&self.body)?;
        Ok(FlightIntegrator::new(body, self.initial.clone()).with_environment(self.environment.build()))
    }

    pub fn build_pilot(&self) -> Box<dyn Pilot> {
        self.pilot.build()
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "vertical" => Some(vertical()),
            "missile" => Some(missile()),
            "glide" => Some(glide()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

/// Test rocket straight up: two-second burn, then coast to the ground.
fn vertical() -> ScenarioConfig {
    ScenarioConfig {
        name: "Vertical shot".into(),
        body: presets::test_rocket(),
        run: RunConfig { dt: 0.01, duration: 60.0, floor: Some(0.0) },
        pilot: PilotConfig::Script {
            segments: vec![
                ScriptSegment { start: 0.0, control: ControlSample::new(1.0, 0.0, 0.0, 0.0) },
                ScriptSegment { start: 2.0, control: ControlSample::neutral() },
            ],
        },
        ..ScenarioConfig::default()
    }
}

/// Guided missile off a low rail, held on a shallow climb toward +Z.
fn missile() -> ScenarioConfig {
    ScenarioConfig {
        name: "Guided missile".into(),
        body: presets::guided_missile(),
        initial: InitialConditions::launch(Vector3::new(0.0, 1.5, 0.0), 25.0, 0.0),
        run: RunConfig { dt: 0.01, duration: 20.0, floor: Some(0.0) },
        pilot: PilotConfig::Track {
            target: Vector3::new(0.0, 0.1, 1.0),
            throttle: 0.8,
            gains: PidGains::default(),
        },
        ..ScenarioConfig::default()
    }
}

/// Unpowered dart thrown into a crosswind that strengthens with height.
fn glide() -> ScenarioConfig {
    let mut initial = InitialConditions::launch(Vector3::new(0.0, 2.0, 0.0), 35.0, 0.0);
    initial.velocity = initial.orientation() * Vector3::new(0.0, 60.0, 0.0);
    ScenarioConfig {
        name: "Glide dart".into(),
        body: presets::glide_dart(),
        environment: EnvironmentConfig {
            wind: WindConfig::Shear {
                base: Vector3::new(2.0, 0.0, 0.0),
                gradient: Vector3::new(0.1, 0.0, 0.0),
            },
            ..EnvironmentConfig::default()
        },
        initial,
        run: RunConfig { dt: 0.005, duration: 30.0, floor: Some(0.0) },
        pilot: PilotConfig::Fixed { control: ControlSample::neutral() },
    }
}
