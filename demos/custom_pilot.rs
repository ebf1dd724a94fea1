use nalgebra::Vector3;

use guided_flight::dynamics::state::{FlightState, InitialConditions};
use guided_flight::gnc::{ControlSample, Pilot};
use guided_flight::sim::{self, event, FlightIntegrator, RunConfig};
use guided_flight::vehicle::{presets, BodyParameters};
use guided_flight::Environment;

/// Bang-bang pilot: full burn with a hard gimbal kick during a fixed window,
/// then a slow barrel roll while coasting.
struct KickPilot {
    kick_start: f64,
    kick_end: f64,
    burn_end: f64,
}

impl Pilot for KickPilot {
    fn control(&mut self, state: &FlightState, _body: &BodyParameters, _dt: f64) -> ControlSample {
        let t = state.time;
        let gx = if t > self.kick_start && t < self.kick_end { 0.6 } else { 0.0 };
        if t < self.burn_end {
            ControlSample::new(1.0, gx, 0.0, 0.0)
        } else {
            ControlSample::new(0.0, 0.0, 0.0, 0.3)
        }
    }

    fn name(&self) -> &str {
        "Kick"
    }
}

fn main() -> anyhow::Result<()> {
    let body = BodyParameters::new(&presets::test_rocket())?;
    let initial = InitialConditions::launch(Vector3::zeros(), 85.0, 0.0);
    let mut integrator = FlightIntegrator::new(body, initial).with_environment(Environment::default());

    let mut pilot = KickPilot { kick_start: 0.3, kick_end: 0.5, burn_end: 1.5 };
    let config = RunConfig { dt: 0.005, duration: 60.0, floor: Some(0.0) };

    println!("Simulating with {} pilot...", pilot.name());
    let mut detectors = event::default_detectors();
    detectors.push(Box::new(event::AltitudeDetector::new(100.0, false)));
    let flight = sim::simulate_with(&mut integrator, &mut pilot, &config, detectors)?;

    let apogee = flight.apogee().map_or(0.0, |s| s.position.y);
    let Some(last) = flight.last() else {
        return Ok(());
    };

    println!("Apogee: {:.1} m", apogee);
    println!("Impact point: x={:.1} m z={:.1} m", last.position.x, last.position.z);
    println!("Flight time: {:.2} s", last.time);
    for e in &flight.events {
        println!("  {:>6.2}s  {:?}", e.time, e.kind);
    }
    Ok(())
}
