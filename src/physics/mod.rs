pub mod aerodynamics;
pub mod environment;
pub mod gravity;

pub use environment::{CalmAir, Environment, EnvironmentConfig, ShearWind, UniformWind, WindConfig, WindField};
