use nalgebra::Vector3;

/// Weight in world frame (Y-up).
pub fn gravity_force(mass: f64, gravity: f64) -> Vector3<f64> {
    Vector3::new(0.0, -mass * gravity, 0.0)
}

/// Archimedes lift of the displaced air, world frame.
pub fn buoyancy_force(air_density: f64, gravity: f64, volume: f64) -> Vector3<f64> {
    Vector3::new(0.0, air_density * gravity * volume, 0.0)
}
