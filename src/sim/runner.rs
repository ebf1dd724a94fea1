use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{FlightError, Result};
use crate::gnc::{ControlSample, Pilot};

use super::event::{default_detectors, EventDetector, EventKind, FlightEvent};
use super::integrator::FlightIntegrator;
use super::scenario::ScenarioConfig;

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// Upper bound on ticks per run.
pub const MAX_STEPS: usize = 100_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub dt: f64,       // s per tick
    pub duration: f64, // s
    /// Stop once the projectile drops below this height after having been above it.
    pub floor: Option<f64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { dt: 0.01, duration: 30.0, floor: Some(0.0) }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(FlightError::InvalidParameter(format!("run.dt must be positive, got {}", self.dt)));
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(FlightError::InvalidParameter(format!(
                "run.duration must be non-negative, got {}",
                self.duration
            )));
        }
        let steps = self.duration / self.dt;
        if !steps.is_finite() || steps > MAX_STEPS as f64 {
            return Err(FlightError::InvalidParameter(format!(
                "run of {} s at dt {} s exceeds {MAX_STEPS} ticks",
                self.duration, self.dt
            )));
        }
        Ok(())
    }

    pub fn steps(&self) -> usize {
        (self.duration / self.dt).round() as usize
    }
}

// ---------------------------------------------------------------------------
// Samples
// ---------------------------------------------------------------------------

/// Snapshot of one projectile after a tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlightSample {
    pub time: f64,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub angular_velocity: Vector3<f64>,
    pub nose: Vector3<f64>,
    pub throttle: f64,        // active
    pub gimbal: Vector2<f64>, // active
    pub speed: f64,
    pub elevation: f64, // rad
    pub alpha: f64,     // rad
}

impl FlightSample {
    pub fn capture(sim: &FlightIntegrator) -> Self {
        let s = sim.state();
        Self {
            time: s.time,
            position: s.position,
            velocity: s.velocity,
            angular_velocity: s.angular_velocity,
            nose: s.nose(),
            throttle: s.active_thrust_input(),
            gimbal: s.active_gimbal_input(),
            speed: s.speed(),
            elevation: s.elevation(),
            alpha: s.alpha(),
        }
    }

    pub fn altitude(&self) -> f64 {
        self.position.y
    }

    /// Horizontal distance from the world origin.
    pub fn ground_range(&self) -> f64 {
        Vector2::new(self.position.x, self.position.z).norm()
    }
}

/// Result of one run.
#[derive(Debug, Clone, Default)]
pub struct Flight {
    pub name: String,
    pub samples: Vec<FlightSample>,
    pub commands: Vec<ControlSample>,
    pub events: Vec<FlightEvent>,
    pub faulted_at: Option<f64>,
}

impl Flight {
    pub fn apogee(&self) -> Option<&FlightSample> {
        self.samples.iter().max_by(|a, b| a.position.y.total_cmp(&b.position.y))
    }

    pub fn max_speed(&self) -> f64 {
        self.samples.iter().map(|s| s.speed).fold(0.0, f64::max)
    }

    pub fn last(&self) -> Option<&FlightSample> {
        self.samples.last()
    }

    pub fn duration(&self) -> f64 {
        self.last().map_or(0.0, |s| s.time)
    }

    pub fn events_of(&self, kind: &EventKind) -> impl Iterator<Item = &FlightEvent> + '_ {
        let kind = kind.clone();
        self.events.iter().filter(move |e| e.kind == kind)
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Drive `sim` with `pilot` at fixed ticks until the duration ends, the
/// projectile falls through the floor, or it faults.
///
/// A fault ends the run early and is recorded in the returned [`Flight`];
/// only an invalid `config` is an error.
pub fn simulate_with(
    sim: &mut FlightIntegrator,
    pilot: &mut dyn Pilot,
    config: &RunConfig,
    mut detectors: Vec<Box<dyn EventDetector>>,
) -> Result<Flight> {
    config.validate()?;

    let cap = (config.steps() + 1).min(200_000);
    let mut flight = Flight {
        name: sim.body().name().to_string(),
        samples: Vec::with_capacity(cap),
        commands: Vec::with_capacity(cap),
        ..Flight::default()
    };

    let mut prev = FlightSample::capture(sim);
    let mut airborne = config.floor.is_some_and(|floor| prev.position.y > floor);
    flight.samples.push(prev.clone());
    flight.commands.push(sim.guidance().sample());

    for _ in 0..config.steps() {
        let cmd = pilot.control(sim.state(), sim.body(), config.dt);
        sim.set_control(cmd);

        if let Err(err) = sim.step(config.dt) {
            warn!(pilot = pilot.name(), error = %err, "run stopped");
            flight.faulted_at = Some(sim.time());
            flight.events.push(FlightEvent::at(&prev, EventKind::Fault));
            break;
        }

        let sample = FlightSample::capture(sim);
        for det in detectors.iter_mut() {
            if let Some(kind) = det.check(&prev, &sample) {
                flight.events.push(FlightEvent::at(&sample, kind));
            }
        }
        flight.samples.push(sample.clone());
        flight.commands.push(cmd);

        if let Some(floor) = config.floor {
            if airborne && sample.position.y < floor {
                break;
            }
            airborne |= sample.position.y > floor;
        }
        prev = sample;
    }

    let apogee = flight.apogee().map_or(0.0, |s| s.position.y);
    info!(
        body = %flight.name,
        pilot = pilot.name(),
        duration = flight.duration(),
        apogee,
        max_speed = flight.max_speed(),
        events = flight.events.len(),
        faulted = flight.faulted_at.is_some(),
        "run finished"
    );
    Ok(flight)
}

/// Build and run a scenario with the default event detectors.
pub fn simulate(scenario: &ScenarioConfig) -> Result<Flight> {
    let mut sim = scenario.build_integrator()?;
    let mut pilot = scenario.build_pilot();
    let mut flight = simulate_with(&mut sim, pilot.as_mut(), &scenario.run, default_detectors())?;
    if !scenario.name.is_empty() {
        flight.name = scenario.name.clone();
    }
    Ok(flight)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::state::InitialConditions;
    use crate::gnc::{FixedPilot, ScriptSegment, ScriptedPilot};
    use crate::physics::Environment;
    use crate::vehicle::{presets, BodyParameters};

    fn rocket() -> FlightIntegrator {
        let body = BodyParameters::new(&presets::test_rocket()).unwrap();
        FlightIntegrator::new(body, InitialConditions::default()).with_environment(Environment::default())
    }

    fn burn_then_coast(burn: f64) -> ScriptedPilot {
        ScriptedPilot::new(vec![
            ScriptSegment { start: 0.0, control: ControlSample::new(1.0, 0.0, 0.0, 0.0) },
            ScriptSegment { start: burn, control: ControlSample::neutral() },
        ])
    }

    #[test]
    fn vertical_shot_reaches_apogee_and_lands() {
        let mut sim = rocket();
        let mut pilot = burn_then_coast(0.5);
        let config = RunConfig { dt: 0.01, duration: 120.0, floor: Some(0.0) };
        let flight = simulate_with(&mut sim, &mut pilot, &config, default_detectors()).unwrap();

        let apogee = flight.apogee().unwrap();
        assert!(apogee.position.y > 50.0, "apogee {:.1} m", apogee.position.y);
        assert_eq!(flight.events_of(&EventKind::Apogee).count(), 1);
        assert_eq!(flight.events_of(&EventKind::MotorCutoff).count(), 1);
        assert!(flight.last().unwrap().position.y < 0.0, "run stops at the floor");
        assert!(flight.duration() < 120.0);
        assert!(flight.faulted_at.is_none());
    }

    #[test]
    fn cutoff_arrives_after_thrust_latency() {
        let mut sim = rocket();
        let mut pilot = burn_then_coast(0.5);
        let config = RunConfig { dt: 0.01, duration: 2.0, floor: None };
        let flight = simulate_with(&mut sim, &mut pilot, &config, default_detectors()).unwrap();
        let cutoff = flight.events_of(&EventKind::MotorCutoff).next().unwrap();
        let latency = sim.body().propulsion().thrust_latency;
        assert!(cutoff.time >= 0.5 + latency - 1e-9, "cutoff at {}", cutoff.time);
        assert!(cutoff.time <= 0.5 + latency + 0.05);
    }

    #[test]
    fn samples_and_commands_line_up() {
        let mut sim = rocket();
        let mut pilot = FixedPilot(ControlSample::new(0.5, 0.0, 0.0, 0.0));
        let config = RunConfig { dt: 0.02, duration: 1.0, floor: None };
        let flight = simulate_with(&mut sim, &mut pilot, &config, Vec::new()).unwrap();
        assert_eq!(flight.samples.len(), 51);
        assert_eq!(flight.commands.len(), flight.samples.len());
        assert!((flight.duration() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn fault_ends_run_without_error() {
        let body = BodyParameters::new(&presets::test_rocket()).unwrap();
        let env = Environment::default().with_wind(|p: &Vector3<f64>| {
            if p.y > 5.0 { Vector3::new(f64::INFINITY, 0.0, 0.0) } else { Vector3::zeros() }
        });
        let mut sim = FlightIntegrator::new(body, InitialConditions::default()).with_environment(env);
        let mut pilot = FixedPilot(ControlSample::new(1.0, 0.0, 0.0, 0.0));
        let flight = simulate_with(&mut sim, &mut pilot, &RunConfig::default(), Vec::new()).unwrap();
        assert!(flight.faulted_at.is_some());
        assert_eq!(flight.events.last().map(|e| &e.kind), Some(&EventKind::Fault));
        assert!(flight.samples.iter().all(|s| s.position.iter().all(|c| c.is_finite())));
    }

    #[test]
    fn rejects_bad_tick_length() {
        let mut sim = rocket();
        let mut pilot = FixedPilot::default();
        let config = RunConfig { dt: -0.01, ..RunConfig::default() };
        assert!(simulate_with(&mut sim, &mut pilot, &config, Vec::new()).is_err());
    }

    #[test]
    fn rejects_runs_with_too_many_ticks() {
        let huge = RunConfig { dt: 1e-300, duration: 1e300, floor: None };
        assert!(matches!(huge.validate(), Err(FlightError::InvalidParameter(_))));

        let mut sim = rocket();
        let mut pilot = FixedPilot::default();
        assert!(simulate_with(&mut sim, &mut pilot, &huge, Vec::new()).is_err());

        let long = RunConfig { dt: 1e-6, duration: 1e3, floor: None };
        assert!(long.validate().is_err());
        assert!(RunConfig { dt: 1e-3, duration: 1e3, floor: None }.validate().is_ok());
    }
}
