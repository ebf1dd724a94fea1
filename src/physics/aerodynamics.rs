use nalgebra::Vector3;

use crate::vehicle::body::{Aerodynamics, Geometry};

/// Relative airspeeds below this (m/s) produce no aerodynamic force.
pub const MIN_AIRSPEED: f64 = 1e-3;

/// Projected area for flow at angle θ to the nose axis: blends the circular
/// cross-section (cos θ) with the side silhouette (sin θ).
pub fn projected_area(geometry: &Geometry, cos_theta: f64) -> f64 {
    let c = cos_theta.abs().min(1.0);
    let s = (1.0 - c * c).max(0.0).sqrt();
    geometry.frontal_area() * c + geometry.side_area() * s
}

/// Form drag plus a viscous correction that dominates at low Reynolds number.
pub fn drag_coefficient(
    aero: &Aerodynamics,
    air_density: f64,
    air_viscosity: f64,
    airspeed: f64,
    diameter: f64,
) -> f64 {
    let denom = air_density * airspeed * diameter;
    let viscous = if denom > 0.0 {
        aero.viscous_drag_factor * air_viscosity / denom
    } else {
        0.0
    };
    aero.form_drag + viscous
}

/// Quadratic drag opposing the air-relative velocity (world frame).
///
/// `cap` bounds the returned magnitude; zero or negative disables the bound.
pub fn drag_force(
    v_rel: &Vector3<f64>,
    nose: &Vector3<f64>,
    geometry: &Geometry,
    aero: &Aerodynamics,
    air_density: f64,
    air_viscosity: f64,
    cap: f64,
) -> Vector3<f64> {
    let speed = v_rel.norm();
    if speed < MIN_AIRSPEED || air_density <= 0.0 {
        return Vector3::zeros();
    }

    let cos_theta = nose.dot(v_rel) / speed;
    let area = projected_area(geometry, cos_theta);
    let cd = drag_coefficient(aero, air_density, air_viscosity, speed, 2.0 * geometry.radius);

    let drag = -0.5 * air_density * cd * area * speed * v_rel;
    let magnitude = drag.norm();
    if cap > 0.0 && magnitude > cap {
        drag * (cap / magnitude)
    } else {
        drag
    }
}

/// Side-slip force: opposes the part of the air-relative velocity that is
/// perpendicular to the nose, so the flight path weather-vanes onto the body axis.
pub fn alignment_force(
    v_rel: &Vector3<f64>,
    nose: &Vector3<f64>,
    air_density: f64,
    coefficient: f64,
    side_area: f64,
) -> Vector3<f64> {
    if coefficient <= 0.0 || air_density <= 0.0 {
        return Vector3::zeros();
    }
    let v_perp = v_rel - nose * nose.dot(v_rel);
    let slip = v_perp.norm();
    if slip < MIN_AIRSPEED {
        return Vector3::zeros();
    }
    -coefficient * 0.5 * air_density * side_area * slip * v_perp
}

/// Quadratic rotational damping: `-c·|ω|·ω` (body frame).
pub fn damping_moment(omega: &Vector3<f64>, coefficient: f64) -> Vector3<f64> {
    -coefficient * omega.norm() * omega
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn geometry() -> Geometry {
        Geometry { radius: 0.05, cylinder_height: 0.3, cone_height: 0.2 }
    }

    fn aero() -> Aerodynamics {
        Aerodynamics {
            form_drag: 0.3,
            viscous_drag_factor: 24.0,
            alignment_coefficient: 0.5,
            drag_cap_ratio: 1.0,
            rotational_damping: 0.01,
        }
    }

    #[test]
    fn head_on_area_is_circular() {
        let g = geometry();
        assert_relative_eq!(projected_area(&g, 1.0), g.frontal_area(), epsilon = 1e-15);
        assert_relative_eq!(projected_area(&g, -1.0), g.frontal_area(), epsilon = 1e-15);
        assert_relative_eq!(projected_area(&g, 0.0), g.side_area(), epsilon = 1e-15);
    }

    #[test]
    fn viscous_term_fades_with_speed() {
        let a = aero();
        let slow = drag_coefficient(&a, 1.225, 1.81e-5, 0.1, 0.1);
        let fast = drag_coefficient(&a, 1.225, 1.81e-5, 300.0, 0.1);
        assert!(slow > fast);
        assert_relative_eq!(fast, 0.3, epsilon = 1e-4);
    }

    #[test]
    fn no_drag_at_rest() {
        let f = drag_force(&Vector3::zeros(), &Vector3::y(), &geometry(), &aero(), 1.225, 1.81e-5, 0.0);
        assert_eq!(f, Vector3::zeros());
    }

    #[test]
    fn drag_is_capped() {
        let v = Vector3::new(0.0, 0.0, 5_000.0);
        let f = drag_force(&v, &Vector3::y(), &geometry(), &aero(), 1.225, 1.81e-5, 250.0);
        assert_relative_eq!(f.norm(), 250.0, epsilon = 1e-9);
        assert!(f.z < 0.0);
    }

    #[test]
    fn sideways_flow_drags_harder_than_head_on() {
        let v = Vector3::new(0.0, 50.0, 0.0);
        let head_on = drag_force(&v, &Vector3::y(), &geometry(), &aero(), 1.225, 1.81e-5, 0.0);
        let broadside = drag_force(&v, &Vector3::x(), &geometry(), &aero(), 1.225, 1.81e-5, 0.0);
        assert!(broadside.norm() > head_on.norm());
    }

    #[test]
    fn alignment_zero_without_side_slip() {
        let f = alignment_force(&Vector3::new(0.0, 80.0, 0.0), &Vector3::y(), 1.225, 0.5, 0.04);
        assert_eq!(f, Vector3::zeros());
    }

    #[test]
    fn alignment_opposes_side_slip_only() {
        let v = Vector3::new(10.0, 80.0, 0.0);
        let f = alignment_force(&v, &Vector3::y(), 1.225, 0.5, 0.04);
        assert!(f.x < 0.0);
        assert_relative_eq!(f.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(f.x, -0.5 * 0.5 * 1.225 * 0.04 * 10.0 * 10.0, epsilon = 1e-12);
    }

    #[test]
    fn damping_opposes_rotation() {
        let w = Vector3::new(1.0, -2.0, 0.5);
        let m = damping_moment(&w, 0.1);
        assert!(m.dot(&w) < 0.0);
        assert_relative_eq!(m.norm(), 0.1 * w.norm_squared(), epsilon = 1e-12);
    }

    proptest! {
        #[test]
        fn drag_opposes_relative_motion(
            vx in -300.0f64..300.0,
            vy in -300.0f64..300.0,
            vz in -300.0f64..300.0,
            nx in -1.0f64..1.0,
            ny in -1.0f64..1.0,
            nz in -1.0f64..1.0,
        ) {
            let v = Vector3::new(vx, vy, vz);
            let n = Vector3::new(nx, ny, nz);
            prop_assume!(v.norm() > 0.01 && n.norm() > 0.1);
            let nose = n.normalize();
            let f = drag_force(&v, &nose, &geometry(), &aero(), 1.225, 1.81e-5, 500.0);
            prop_assert!(f.dot(&v) < 0.0);
        }
    }
}
