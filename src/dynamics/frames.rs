//! Body/world frame helpers.
//!
//! World frame is Y-up. Body frame: +Y nose, X pitch axis, Z yaw axis.
//! Orientations are body→world rotations whose columns are the body axes
//! expressed in world coordinates.

use std::f64::consts::FRAC_PI_2;

use nalgebra::{Matrix3, Rotation3, Unit, Vector3};

/// Rotation increments smaller than this (rad) are skipped.
pub const MIN_ROTATION_ANGLE: f64 = 1e-12;

/// Build an orientation from Euler angles applied in Y-X-Z order
/// (`R = Ry(y) * Rx(x) * Rz(z)`), radians.
///
/// Initialization and debug display only; the integrator never goes
/// through Euler angles.
pub fn rotation_from_euler(angles: &Vector3<f64>) -> Rotation3<f64> {
    let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), angles.y);
    let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), angles.x);
    let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), angles.z);
    ry * rx * rz
}

/// Inverse of [`rotation_from_euler`]. At the X = ±90° singularity the Z
/// angle is reported as zero.
pub fn euler_from_rotation(r: &Rotation3<f64>) -> Vector3<f64> {
    let m = r.matrix();
    let sx = (-m[(1, 2)]).clamp(-1.0, 1.0);
    if sx.abs() < 1.0 - 1e-9 {
        Vector3::new(
            sx.asin(),
            m[(0, 2)].atan2(m[(2, 2)]),
            m[(1, 0)].atan2(m[(1, 1)]),
        )
    } else {
        Vector3::new(FRAC_PI_2.copysign(sx), (-m[(2, 0)]).atan2(m[(0, 0)]), 0.0)
    }
}

/// Orientation whose nose points `elevation` above the horizon, heading
/// `azimuth` measured from +Z toward +X (radians).
pub fn launch_orientation(elevation: f64, azimuth: f64) -> Rotation3<f64> {
    rotation_from_euler(&Vector3::new(FRAC_PI_2 - elevation, azimuth, 0.0))
}

/// Unit nose direction in world frame.
pub fn nose_direction(r: &Rotation3<f64>) -> Vector3<f64> {
    r * Vector3::y()
}

pub fn body_to_world(r: &Rotation3<f64>, v: &Vector3<f64>) -> Vector3<f64> {
    r * v
}

pub fn world_to_body(r: &Rotation3<f64>, v: &Vector3<f64>) -> Vector3<f64> {
    r.inverse_transform_vector(v)
}

/// Elevation of the nose above the horizontal plane (rad). Positive = nose up.
pub fn elevation(r: &Rotation3<f64>) -> f64 {
    nose_direction(r).y.clamp(-1.0, 1.0).asin()
}

/// Gram-Schmidt on the columns of `m`, keeping the nose (Y) axis direction.
pub fn orthonormalize(m: &Matrix3<f64>) -> Rotation3<f64> {
    let y = m.column(1).normalize();
    let x_col = m.column(0).into_owned();
    let x = match (x_col - y * y.dot(&x_col)).try_normalize(1e-12) {
        Some(x) => x,
        // X collapsed onto the nose: rebuild it from Z.
        None => y.cross(&m.column(2).into_owned()).normalize(),
    };
    let z = x.cross(&y);
    Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[x, y, z]))
}

/// Rotation by `|ω|·dt` about `ω` (world frame), or `None` when negligible.
pub fn incremental_rotation(omega_world: &Vector3<f64>, dt: f64) -> Option<Rotation3<f64>> {
    let rate = omega_world.norm();
    let angle = rate * dt;
    if angle <= MIN_ROTATION_ANGLE {
        return None;
    }
    let axis = Unit::new_unchecked(omega_world / rate);
    Some(Rotation3::from_axis_angle(&axis, angle))
}

/// Advance an orientation by a body-frame angular velocity over `dt`,
/// then re-orthonormalize.
pub fn integrate_orientation(r: &Rotation3<f64>, omega_body: &Vector3<f64>, dt: f64) -> Rotation3<f64> {
    let omega_world = body_to_world(r, omega_body);
    let rotated = match incremental_rotation(&omega_world, dt) {
        Some(delta) => delta * r,
        None => *r,
    };
    orthonormalize(rotated.matrix())
}

/// Largest deviation of `RᵀR` from identity.
pub fn orthonormality_error(r: &Rotation3<f64>) -> f64 {
    let m = r.matrix();
    (m.transpose() * m - Matrix3::identity()).abs().max()
}
