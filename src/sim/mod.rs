pub mod event;
pub mod integrator;
pub mod runner;
pub mod scenario;

pub use event::{AltitudeDetector, ApogeeDetector, EventDetector, EventKind, FlightEvent, MotorCutoffDetector};
pub use integrator::FlightIntegrator;
pub use runner::{simulate, simulate_with, Flight, FlightSample, RunConfig};
pub use scenario::{ScenarioConfig, PRESETS};
