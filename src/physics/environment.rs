use std::fmt;
use std::sync::Arc;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Wind field
// ---------------------------------------------------------------------------

/// A wind-velocity field sampled by world position (Y-up, m/s).
///
/// Implementations must be pure: the same position always yields the same
/// velocity within a tick.
pub trait WindField: Send + Sync {
    fn sample(&self, position: &Vector3<f64>) -> Vector3<f64>;
}

impl<F> WindField for F
where
    F: Fn(&Vector3<f64>) -> Vector3<f64> + Send + Sync,
{
    fn sample(&self, position: &Vector3<f64>) -> Vector3<f64> {
        self(position)
    }
}

/// No wind anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalmAir;

impl WindField for CalmAir {
    fn sample(&self, _position: &Vector3<f64>) -> Vector3<f64> {
        Vector3::zeros()
    }
}

/// The same wind velocity everywhere.
#[derive(Debug, Clone, Copy)]
pub struct UniformWind(pub Vector3<f64>);

impl WindField for UniformWind {
    fn sample(&self, _position: &Vector3<f64>) -> Vector3<f64> {
        self.0
    }
}

/// Wind growing linearly with height above y = 0.
#[derive(Debug, Clone, Copy)]
pub struct ShearWind {
    pub base: Vector3<f64>,     // m/s at ground level
    pub gradient: Vector3<f64>, // m/s per metre of height
}

impl WindField for ShearWind {
    fn sample(&self, position: &Vector3<f64>) -> Vector3<f64> {
        self.base + self.gradient * position.y.max(0.0)
    }
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

pub const STANDARD_GRAVITY: f64 = 9.81;
pub const SEA_LEVEL_DENSITY: f64 = 1.225; // kg/m^3
pub const SEA_LEVEL_VISCOSITY: f64 = 1.81e-5; // Pa*s

/// Gravity, air properties and wind for one scenario.
#[derive(Clone)]
pub struct Environment {
    pub gravity: f64,       // m/s^2, acts along -Y
    pub air_density: f64,   // kg/m^3
    pub air_viscosity: f64, // Pa*s (dynamic)
    wind: Arc<dyn WindField>,
}

impl Environment {
    pub fn new(gravity: f64, air_density: f64, air_viscosity: f64) -> Self {
        Self {
            gravity,
            air_density,
            air_viscosity,
            wind: Arc::new(CalmAir),
        }
    }

    /// Vacuum with the given gravity: no buoyancy, no drag.
    pub fn vacuum(gravity: f64) -> Self {
        Self::new(gravity, 0.0, 0.0)
    }

    pub fn with_wind(mut self, wind: impl WindField + 'static) -> Self {
        self.wind = Arc::new(wind);
        self
    }

    pub fn wind(&self, position: &Vector3<f64>) -> Vector3<f64> {
        self.wind.sample(position)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(STANDARD_GRAVITY, SEA_LEVEL_DENSITY, SEA_LEVEL_VISCOSITY)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("gravity", &self.gravity)
            .field("air_density", &self.air_density)
            .field("air_viscosity", &self.air_viscosity)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Deserializable configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WindConfig {
    #[default]
    Calm,
    Uniform { velocity: Vector3<f64> },
    Shear { base: Vector3<f64>, gradient: Vector3<f64> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub gravity: f64,
    pub air_density: f64,
    pub air_viscosity: f64,
    pub wind: WindConfig,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            gravity: STANDARD_GRAVITY,
            air_density: SEA_LEVEL_DENSITY,
            air_viscosity: SEA_LEVEL_VISCOSITY,
            wind: WindConfig::Calm,
        }
    }
}

impl EnvironmentConfig {
    pub fn build(&self) -> Environment {
        let env = Environment::new(self.gravity, self.air_density, self.air_viscosity);
        match self.wind {
            WindConfig::Calm => env,
            WindConfig::Uniform { velocity } => env.with_wind(UniformWind(velocity)),
            WindConfig::Shear { base, gradient } => env.with_wind(ShearWind { base, gradient }),
        }
    }
}
