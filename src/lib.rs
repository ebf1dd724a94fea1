pub mod error;
pub mod physics;
pub mod dynamics;
pub mod vehicle;
mod gnc_mod;
pub mod sim;
pub mod io;

// The gnc module: expose gnc_mod as `gnc` publicly
pub mod gnc {
    pub use crate::gnc_mod::*;
}

pub use error::{FlightError, Result};
pub use physics::Environment;
pub use sim::{simulate, FlightIntegrator, ScenarioConfig};
pub use vehicle::{BodyConfig, BodyParameters};
