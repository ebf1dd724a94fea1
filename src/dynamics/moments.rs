use nalgebra::{Vector2, Vector3};

use crate::physics::aerodynamics;
use crate::vehicle::BodyParameters;

/// Below this thrust (N) the idle control moment replaces the thrust moment.
pub const IDLE_THRUST_THRESHOLD: f64 = 1e-3;

/// Body-frame moments about the center of mass.
pub struct MomentModel<'a> {
    body: &'a BodyParameters,
}

impl<'a> MomentModel<'a> {
    pub fn new(body: &'a BodyParameters) -> Self {
        Self { body }
    }

    /// `r × F` with r from the center of mass to the nozzle.
    pub fn thrust_moment(&self, thrust_local: &Vector3<f64>) -> Vector3<f64> {
        self.body.nozzle_arm().cross(thrust_local)
    }

    /// Reaction-jet style authority available with the motor idle: a lateral
    /// push at the nozzle of `idle_thrust_fraction × max_thrust`, along the
    /// gimbal direction.
    pub fn idle_moment(&self, gimbal: &Vector2<f64>) -> Vector3<f64> {
        let p = self.body.propulsion();
        let g = if gimbal.norm() > 1.0 { gimbal.normalize() } else { *gimbal };
        let push = p.idle_thrust_fraction * p.max_thrust;
        let force = Vector3::new(push * g.x, 0.0, push * g.y);
        self.body.nozzle_arm().cross(&force)
    }

    pub fn damping_moment(&self, omega: &Vector3<f64>) -> Vector3<f64> {
        aerodynamics::damping_moment(omega, self.body.aero().rotational_damping)
    }

    /// Thrust moment when the motor is producing thrust, idle moment otherwise.
    pub fn control_moment(&self, thrust_local: &Vector3<f64>, gimbal: &Vector2<f64>) -> Vector3<f64> {
        if thrust_local.norm() < IDLE_THRUST_THRESHOLD {
            self.idle_moment(gimbal)
        } else {
            self.thrust_moment(thrust_local)
        }
    }

    pub fn total(
        &self,
        thrust_local: &Vector3<f64>,
        gimbal: &Vector2<f64>,
        omega: &Vector3<f64>,
    ) -> Vector3<f64> {
        self.control_moment(thrust_local, gimbal) + self.damping_moment(omega)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::forces::gimballed_thrust;
    use crate::vehicle::BodyBuilder;
    use approx::assert_relative_eq;

    fn body() -> BodyParameters {
        BodyBuilder::new("t").idle_thrust_fraction(0.02).build().unwrap()
    }

    #[test]
    fn axial_thrust_makes_no_moment() {
        let b = body();
        let m = MomentModel::new(&b).thrust_moment(&Vector3::new(0.0, 500.0, 0.0));
        assert!(m.norm() < 1e-12);
    }

    #[test]
    fn gimbal_x_yaws_nose_toward_minus_x() {
        let b = body();
        let f = gimballed_thrust(500.0, 0.2, 1.0, &Vector2::new(1.0, 0.0));
        let m = MomentModel::new(&b).thrust_moment(&f);
        assert!(m.z > 0.0, "positive yaw moment rotates +Y toward -X");
        assert_relative_eq!(m.z, b.mass_properties().com_offset * f.x, epsilon = 1e-12);
        assert!(m.x.abs() < 1e-12);
    }

    #[test]
    fn gimbal_y_pitches() {
        let b = body();
        let f = gimballed_thrust(500.0, 0.2, 1.0, &Vector2::new(0.0, 1.0));
        let m = MomentModel::new(&b).thrust_moment(&f);
        assert!(m.x < 0.0);
        assert!(m.z.abs() < 1e-12);
    }

    #[test]
    fn idle_moment_only_without_thrust() {
        let b = body();
        let model = MomentModel::new(&b);
        let gimbal = Vector2::new(1.0, 0.0);

        let idle = model.control_moment(&Vector3::zeros(), &gimbal);
        let expected = b.mass_properties().com_offset * 0.02 * 500.0;
        assert_relative_eq!(idle.z, expected, epsilon = 1e-12);

        let powered = model.control_moment(&Vector3::new(0.0, 100.0, 0.0), &gimbal);
        assert!(powered.norm() < 1e-12, "axial thrust ignores idle authority");
    }

    #[test]
    fn idle_moment_zero_for_centered_gimbal() {
        let b = body();
        assert_eq!(MomentModel::new(&b).idle_moment(&Vector2::zeros()), Vector3::zeros());
    }

    #[test]
    fn total_includes_damping() {
        let b = BodyBuilder::new("t").rotational_damping(0.5).build().unwrap();
        let model = MomentModel::new(&b);
        let w = Vector3::new(2.0, 0.0, 0.0);
        let m = model.total(&Vector3::zeros(), &Vector2::zeros(), &w);
        assert_relative_eq!(m, Vector3::new(-2.0, 0.0, 0.0), epsilon = 1e-12);
    }
}
