use nalgebra::{Rotation3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::dynamics::frames;
use crate::gnc::ActuatorChannel;

// ---------------------------------------------------------------------------
// Initial conditions
// ---------------------------------------------------------------------------

/// Launch pose and rates, as provided by scenario setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialConditions {
    pub position: Vector3<f64>,         // m, world
    pub velocity: Vector3<f64>,         // m/s, world
    pub angular_velocity: Vector3<f64>, // rad/s, body
    /// Y-X-Z Euler angles in degrees; zero = nose straight up.
    pub attitude_deg: Vector3<f64>,
}

impl Default for InitialConditions {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            attitude_deg: Vector3::zeros(),
        }
    }
}

impl InitialConditions {
    /// Nose `elevation_deg` above the horizon, heading `azimuth_deg` from +Z toward +X.
    pub fn launch(position: Vector3<f64>, elevation_deg: f64, azimuth_deg: f64) -> Self {
        Self {
            position,
            attitude_deg: Vector3::new(90.0 - elevation_deg, azimuth_deg, 0.0),
            ..Self::default()
        }
    }

    pub fn orientation(&self) -> Rotation3<f64> {
        frames::rotation_from_euler(&self.attitude_deg.map(f64::to_radians))
    }
}

// ---------------------------------------------------------------------------
// Flight state
// ---------------------------------------------------------------------------

/// Mutable state of one projectile. Owned by its integrator.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightState {
    pub time: f64,                      // s
    pub position: Vector3<f64>,         // m, world (center of mass)
    pub velocity: Vector3<f64>,         // m/s, world
    pub angular_velocity: Vector3<f64>, // rad/s, body [pitch, roll, yaw]
    pub orientation: Rotation3<f64>,    // body→world
    pub thrust: ActuatorChannel<f64>,
    pub gimbal: ActuatorChannel<Vector2<f64>>,
}

impl FlightState {
    pub fn new(initial: &InitialConditions, thrust_latency: f64, gimbal_latency: f64) -> Self {
        Self {
            time: 0.0,
            position: initial.position,
            velocity: initial.velocity,
            angular_velocity: initial.angular_velocity,
            orientation: initial.orientation(),
            thrust: ActuatorChannel::new("throttle", thrust_latency, 0.0),
            gimbal: ActuatorChannel::new("gimbal", gimbal_latency, Vector2::zeros()),
        }
    }

    /// Currently effective throttle, [0, 1].
    pub fn active_thrust_input(&self) -> f64 {
        self.thrust.active()
    }

    /// Currently effective gimbal deflection, magnitude ≤ 1.
    pub fn active_gimbal_input(&self) -> Vector2<f64> {
        self.gimbal.active()
    }

    /// Nose (body +Y) direction in world frame.
    pub fn nose(&self) -> Vector3<f64> {
        frames::nose_direction(&self.orientation)
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    /// Nose elevation above the horizon (rad). Positive = nose up.
    pub fn elevation(&self) -> f64 {
        frames::elevation(&self.orientation)
    }

    /// Angle between the nose and the ground-relative velocity (rad).
    pub fn alpha(&self) -> f64 {
        let speed = self.speed();
        if speed < 1e-3 {
            return 0.0;
        }
        (self.velocity.dot(&self.nose()) / speed).clamp(-1.0, 1.0).acos()
    }

    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|v| v.is_finite())
            && self.velocity.iter().all(|v| v.is_finite())
            && self.angular_velocity.iter().all(|v| v.is_finite())
            && self.orientation.matrix().iter().all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_launch_points_up() {
        let s = FlightState::new(&InitialConditions::default(), 0.1, 0.1);
        assert_relative_eq!(s.nose(), Vector3::y(), epsilon = 1e-12);
        assert_relative_eq!(s.elevation(), std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
        assert_eq!(s.active_thrust_input(), 0.0);
        assert_eq!(s.active_gimbal_input(), Vector2::zeros());
    }

    #[test]
    fn launch_helper_sets_elevation() {
        let ic = InitialConditions::launch(Vector3::new(0.0, 2.0, 0.0), 45.0, 90.0);
        let s = FlightState::new(&ic, 0.0, 0.0);
        let h = 0.5_f64.sqrt();
        assert_relative_eq!(s.nose(), Vector3::new(h, h, 0.0), epsilon = 1e-12);
        assert_eq!(s.position.y, 2.0);
    }

    #[test]
    fn alpha_zero_when_flying_along_nose() {
        let mut s = FlightState::new(&InitialConditions::default(), 0.0, 0.0);
        s.velocity = Vector3::new(0.0, 40.0, 0.0);
        assert!(s.alpha().abs() < 1e-9);
        s.velocity = Vector3::new(40.0, 0.0, 0.0);
        assert_relative_eq!(s.alpha(), std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
    }
}
