use super::body::{BodyBuilder, BodyConfig};
use crate::gnc::RollConfig;

// ---------------------------------------------------------------------------
// Preset projectiles
// ---------------------------------------------------------------------------

/// Small test rocket: 2 kg, 10 cm calibre, 500 N motor.
pub fn test_rocket() -> BodyConfig {
    BodyBuilder::new("Test Rocket")
        .radius(0.05)
        .cylinder_height(0.3)
        .cone_height(0.2)
        .mass(2.0)
        .max_thrust(500.0)
        .into_config()
}

/// Player-guided anti-tank missile: slow actuators, strong weather-vaning.
pub fn guided_missile() -> BodyConfig {
    BodyBuilder::new("Guided Missile")
        .radius(0.07)
        .cylinder_height(0.9)
        .cone_height(0.25)
        .mass(11.5)
        .max_thrust(900.0)
        .max_gimbal_angle(8.0_f64.to_radians())
        .thrust_latency(0.25)
        .gimbal_latency(0.08)
        .idle_thrust_fraction(0.01)
        .form_drag(0.35)
        .alignment_coefficient(1.2)
        .rotational_damping(0.05)
        .angular_velocity_limit(3.0)
        .roll(RollConfig { max_speed: 2.0, acceleration: 6.0, damping: 3.0 })
        .into_config()
}

/// Unpowered finned dart; drag and alignment only.
pub fn glide_dart() -> BodyConfig {
    BodyBuilder::new("Glide Dart")
        .radius(0.03)
        .cylinder_height(0.5)
        .cone_height(0.1)
        .mass(0.8)
        .max_thrust(0.0)
        .alignment_coefficient(2.0)
        .into_config()
}
