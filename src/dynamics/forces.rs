use nalgebra::{Vector2, Vector3};

use crate::dynamics::state::FlightState;
use crate::physics::aerodynamics;
use crate::physics::environment::Environment;
use crate::physics::gravity;
use crate::vehicle::BodyParameters;

// ---------------------------------------------------------------------------
// Force breakdown
// ---------------------------------------------------------------------------

/// Every force term for one tick. World frame except `thrust_local`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceBreakdown {
    pub gravity: Vector3<f64>,
    pub buoyancy: Vector3<f64>,
    pub thrust_local: Vector3<f64>,
    pub thrust: Vector3<f64>,
    pub drag: Vector3<f64>,
    pub alignment: Vector3<f64>,
    pub total: Vector3<f64>,
}

impl Default for ForceBreakdown {
    fn default() -> Self {
        Self {
            gravity: Vector3::zeros(),
            buoyancy: Vector3::zeros(),
            thrust_local: Vector3::zeros(),
            thrust: Vector3::zeros(),
            drag: Vector3::zeros(),
            alignment: Vector3::zeros(),
            total: Vector3::zeros(),
        }
    }
}

// ---------------------------------------------------------------------------
// Thrust vectoring
// ---------------------------------------------------------------------------

/// Thrust in body frame for a throttle and normalized gimbal deflection.
///
/// The deflection angle is `max_gimbal_angle × min(|gimbal|, 1)` and its
/// azimuth `atan2(gimbal.y, gimbal.x)`: gimbal X tilts thrust toward body +X,
/// gimbal Y toward body +Z. The nose-axis (+Y) component shrinks with
/// `cos(deflection)`.
pub fn gimballed_thrust(
    max_thrust: f64,
    max_gimbal_angle: f64,
    throttle: f64,
    gimbal: &Vector2<f64>,
) -> Vector3<f64> {
    let magnitude = max_thrust * throttle.clamp(0.0, 1.0);
    if magnitude <= 0.0 {
        return Vector3::zeros();
    }
    let deflection = max_gimbal_angle * gimbal.norm().min(1.0);
    let azimuth = gimbal.y.atan2(gimbal.x);
    let lateral = magnitude * deflection.sin();
    Vector3::new(
        lateral * azimuth.cos(),
        magnitude * deflection.cos(),
        lateral * azimuth.sin(),
    )
}

// ---------------------------------------------------------------------------
// Force model
// ---------------------------------------------------------------------------

/// Computes translational forces for one projectile.
///
/// Without an environment the gravity, buoyancy, drag and alignment terms are
/// zero; thrust still applies.
pub struct ForceModel<'a> {
    body: &'a BodyParameters,
    env: Option<&'a Environment>,
}

impl<'a> ForceModel<'a> {
    pub fn new(body: &'a BodyParameters, env: Option<&'a Environment>) -> Self {
        Self { body, env }
    }

    pub fn gravity(&self) -> Vector3<f64> {
        self.env
            .map_or_else(Vector3::zeros, |env| gravity::gravity_force(self.body.mass(), env.gravity))
    }

    pub fn buoyancy(&self) -> Vector3<f64> {
        self.env.map_or_else(Vector3::zeros, |env| {
            gravity::buoyancy_force(env.air_density, env.gravity, self.body.mass_properties().volume)
        })
    }

    /// Thrust from the *active* (latency-gated) inputs, body frame.
    pub fn thrust_local(&self, state: &FlightState) -> Vector3<f64> {
        let p = self.body.propulsion();
        gimballed_thrust(
            p.max_thrust,
            p.max_gimbal_angle,
            state.active_thrust_input(),
            &state.active_gimbal_input(),
        )
    }

    pub fn thrust_world(&self, state: &FlightState) -> Vector3<f64> {
        state.orientation * self.thrust_local(state)
    }

    /// Velocity relative to the local air mass.
    pub fn air_relative_velocity(&self, state: &FlightState) -> Vector3<f64> {
        match self.env {
            Some(env) => state.velocity - env.wind(&state.position),
            None => state.velocity,
        }
    }

    pub fn drag(&self, state: &FlightState) -> Vector3<f64> {
        let Some(env) = self.env else {
            return Vector3::zeros();
        };
        let cap = self.body.aero().drag_cap_ratio * self.body.propulsion().max_thrust;
        aerodynamics::drag_force(
            &self.air_relative_velocity(state),
            &state.nose(),
            self.body.geometry(),
            self.body.aero(),
            env.air_density,
            env.air_viscosity,
            cap,
        )
    }

    pub fn alignment(&self, state: &FlightState) -> Vector3<f64> {
        let Some(env) = self.env else {
            return Vector3::zeros();
        };
        aerodynamics::alignment_force(
            &self.air_relative_velocity(state),
            &state.nose(),
            env.air_density,
            self.body.aero().alignment_coefficient,
            self.body.geometry().side_area(),
        )
    }

    pub fn compute(&self, state: &FlightState) -> ForceBreakdown {
        let gravity = self.gravity();
        let buoyancy = self.buoyancy();
        let thrust_local = self.thrust_local(state);
        let thrust = state.orientation * thrust_local;
        let drag = self.drag(state);
        let alignment = self.alignment(state);
        ForceBreakdown {
            gravity,
            buoyancy,
            thrust_local,
            thrust,
            drag,
            alignment,
            total: gravity + buoyancy + thrust + drag + alignment,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
