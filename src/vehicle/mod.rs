pub mod body;
pub mod presets;

pub use body::{BodyBuilder, BodyConfig, BodyParameters, Geometry, MassProperties};
