pub mod forces;
pub mod frames;
pub mod moments;
pub mod state;

pub use forces::{ForceBreakdown, ForceModel};
pub use moments::MomentModel;
pub use state::{FlightState, InitialConditions};
