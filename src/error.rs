use thiserror::Error;

/// Errors raised by the flight core.
///
/// Configuration errors are fatal for the projectile they describe: the
/// integrator is never constructed. Numerical faults (NaN/Inf in a force or
/// moment) put an existing integrator into a faulted state.
#[derive(Error, Debug)]
pub enum FlightError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Non-positive {axis} inertia ({value} kg*m^2): body geometry cannot be simulated")]
    NonPositiveInertia { axis: &'static str, value: f64 },

    #[error("Non-finite {quantity} at t={time:.4}s")]
    NonFinite { quantity: &'static str, time: f64 },

    #[error("Projectile faulted at t={time:.4}s and can no longer be integrated")]
    Faulted { time: f64 },

    #[error("Scenario config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FlightError>;
