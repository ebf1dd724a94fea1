use nalgebra::{Rotation3, Vector3};
use tracing::{error, warn};

use crate::dynamics::forces::{ForceBreakdown, ForceModel};
use crate::dynamics::frames;
use crate::dynamics::moments::MomentModel;
use crate::dynamics::state::{FlightState, InitialConditions};
use crate::error::{FlightError, Result};
use crate::gnc::{ControlSample, GuidanceInput};
use crate::physics::environment::Environment;
use crate::vehicle::BodyParameters;

/// Angular-velocity sub-steps per tick.
pub const SUBSTEPS: usize = 10;

// ---------------------------------------------------------------------------
// Flight integrator
// ---------------------------------------------------------------------------

/// Advances one projectile by fixed ticks.
///
/// Per tick: latency-gate the controls, semi-implicit Euler for translation,
/// sub-stepped Euler rigid-body equations for pitch/yaw, guidance-driven roll,
/// then an incremental rotation of the orientation basis with Gram-Schmidt
/// re-orthonormalization.
///
/// A non-finite force, moment or state faults the instance: every later
/// [`step`](Self::step) returns [`FlightError::Faulted`] until [`reset`](Self::reset).
#[derive(Debug, Clone)]
pub struct FlightIntegrator {
    body: BodyParameters,
    env: Option<Environment>,
    guidance: GuidanceInput,
    initial: InitialConditions,
    state: FlightState,
    last_forces: ForceBreakdown,
    last_moment: Vector3<f64>,
    fault: Option<f64>,
    warned_no_env: bool,
}

impl FlightIntegrator {
    pub fn new(body: BodyParameters, initial: InitialConditions) -> Self {
        let state = initial_state(&body, &initial);
        Self {
            guidance: GuidanceInput::new(*body.roll()),
            body,
            env: None,
            initial,
            state,
            last_forces: ForceBreakdown::default(),
            last_moment: Vector3::zeros(),
            fault: None,
            warned_no_env: false,
        }
    }

    pub fn with_environment(mut self, env: Environment) -> Self {
        self.env = Some(env);
        self
    }

    pub fn set_environment(&mut self, env: Option<Environment>) {
        self.env = env;
        self.warned_no_env = false;
    }

    // --- Control input ------------------------------------------------------

    /// Publish the latest control vector. Values are clamped; throttle and
    /// gimbal take effect after their actuator latency.
    pub fn set_control_input(&mut self, throttle: f64, gimbal_x: f64, gimbal_y: f64, roll: f64) {
        self.guidance.set_control(throttle, gimbal_x, gimbal_y, roll);
    }

    pub fn set_control(&mut self, sample: ControlSample) {
        self.guidance.set_sample(sample);
    }

    // --- Stepping -----------------------------------------------------------

    /// Advance by `dt` on the integrator's own clock.
    pub fn step(&mut self, dt: f64) -> Result<()> {
        self.step_at(self.state.time, dt)
    }

    /// Advance by `dt`, with `now` the host's simulation time at the start of the tick.
    pub fn step_at(&mut self, now: f64, dt: f64) -> Result<()> {
        if let Some(time) = self.fault {
            return Err(FlightError::Faulted { time });
        }
        if !dt.is_finite() || dt <= 0.0 {
            return Err(FlightError::InvalidParameter(format!("tick length must be positive, got {dt}")));
        }
        if self.env.is_none() && !self.warned_no_env {
            warn!(body = self.body.name(), "stepping without an environment: gravity, buoyancy and drag are zero");
            self.warned_no_env = true;
        }

        // The tick works on copies and commits only once everything is finite.
        let mut next = self.state.clone();
        let mut guidance = self.guidance.clone();

        // 1. Actuator latency
        let sample = guidance.sample();
        next.thrust.sample(sample.throttle, now);
        next.gimbal.sample(sample.gimbal, now);

        // 2. Translation
        let forces = ForceModel::new(&self.body, self.env.as_ref()).compute(&next);
        self.check_finite(&forces.total, "force", now)?;

        let accel = forces.total / self.body.mass();
        next.velocity += accel * dt;
        next.position += next.velocity * dt;

        // 3. Pitch/yaw: Euler's equations, sub-stepped
        let moments = MomentModel::new(&self.body);
        let inertia = self.body.inertia();
        let gimbal = next.gimbal.active();
        let h = dt / SUBSTEPS as f64;
        let mut omega = next.angular_velocity;
        let mut moment = Vector3::zeros();
        for _ in 0..SUBSTEPS {
            moment = moments.total(&forces.thrust_local, &gimbal, &omega);
            omega += euler_rates(&inertia, &moment, &omega) * h;
        }
        self.check_finite(&moment, "moment", now)?;
        self.check_finite(&omega, "angular velocity", now)?;

        let limit = self.body.angular_velocity_limit();
        omega = omega.map(|w| w.clamp(-limit, limit));

        // 4. Roll comes from the guidance channel
        omega.y = guidance.update_roll(dt).clamp(-limit, limit);

        // 5. Orientation
        next.orientation = frames::integrate_orientation(&next.orientation, &omega, dt);
        next.angular_velocity = omega;
        next.time = now + dt;

        if !next.is_finite() {
            return Err(self.fault_at(now, "state"));
        }

        self.state = next;
        self.guidance = guidance;
        self.last_forces = forces;
        self.last_moment = moment;
        Ok(())
    }

    /// Restore the initial conditions and clear controls and faults.
    pub fn reset(&mut self) {
        self.state = initial_state(&self.body, &self.initial);
        self.guidance.reset();
        self.last_forces = ForceBreakdown::default();
        self.last_moment = Vector3::zeros();
        self.fault = None;
    }

    fn check_finite(&mut self, v: &Vector3<f64>, quantity: &'static str, now: f64) -> Result<()> {
        if v.iter().all(|c| c.is_finite()) {
            Ok(())
        } else {
            Err(self.fault_at(now, quantity))
        }
    }

    fn fault_at(&mut self, now: f64, quantity: &'static str) -> FlightError {
        error!(body = self.body.name(), quantity, time = now, "non-finite value, projectile faulted");
        self.fault = Some(now);
        FlightError::NonFinite { quantity, time: now }
    }

    // --- Accessors ----------------------------------------------------------

    pub fn position(&self) -> Vector3<f64> {
        self.state.position
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.state.velocity
    }

    /// Body-frame angular velocity [pitch, roll, yaw].
    pub fn angular_velocity(&self) -> Vector3<f64> {
        self.state.angular_velocity
    }

    pub fn orientation(&self) -> Rotation3<f64> {
        self.state.orientation
    }

    pub fn nose_direction(&self) -> Vector3<f64> {
        self.state.nose()
    }

    pub fn time(&self) -> f64 {
        self.state.time
    }

    pub fn state(&self) -> &FlightState {
        &self.state
    }

    pub fn body(&self) -> &BodyParameters {
        &self.body
    }

    pub fn environment(&self) -> Option<&Environment> {
        self.env.as_ref()
    }

    pub fn guidance(&self) -> &GuidanceInput {
        &self.guidance
    }

    /// Forces from the most recent successful tick.
    pub fn last_forces(&self) -> &ForceBreakdown {
        &self.last_forces
    }

    /// Total moment at the final sub-step of the most recent tick.
    pub fn last_moment(&self) -> Vector3<f64> {
        self.last_moment
    }

    pub fn is_faulted(&self) -> bool {
        self.fault.is_some()
    }
}

fn initial_state(body: &BodyParameters, initial: &InitialConditions) -> FlightState {
    let p = body.propulsion();
    FlightState::new(initial, p.thrust_latency, p.gimbal_latency)
}

/// Euler's rigid-body equations for principal inertia `i`, body frame.
pub fn euler_rates(i: &Vector3<f64>, m: &Vector3<f64>, w: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(
        (m.x - (i.z - i.y) * w.y * w.z) / i.x,
        (m.y - (i.x - i.z) * w.z * w.x) / i.y,
        (m.z - (i.y - i.x) * w.x * w.y) / i.z,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::frames::orthonormality_error;
    use crate::gnc::RollConfig;
    use crate::vehicle::BodyBuilder;
    use approx::assert_relative_eq;

    fn scenario_body() -> BodyParameters {
        BodyBuilder::new("scenario")
            .mass(2.0)
            .radius(0.05)
            .cylinder_height(0.3)
            .cone_height(0.2)
            .max_thrust(500.0)
            .no_aero()
            .instant_actuators()
            .build()
            .unwrap()
    }

    fn vacuum_integrator(body: BodyParameters, initial: InitialConditions) -> FlightIntegrator {
        FlightIntegrator::new(body, initial).with_environment(Environment::vacuum(9.81))
    }

    #[test]
    fn first_tick_acceleration_matches_thrust_minus_gravity() {
        let env = Environment::new(9.81, 1.225, 1.81e-5);
        let mut sim = FlightIntegrator::new(scenario_body(), InitialConditions::default()).with_environment(env);
        sim.set_control_input(1.0, 0.0, 0.0, 0.0);
        sim.step(0.01).unwrap();
        let accel = sim.velocity().y / 0.01;
        // Buoyancy of ~0.035 N is the only other term.
        assert_relative_eq!(accel, 500.0 / 2.0 - 9.81, epsilon = 0.05);
        assert!(sim.velocity().x.abs() < 1e-12);
        assert!(sim.velocity().z.abs() < 1e-12);
    }

    #[test]
    fn hundred_ticks_of_straight_climb() {
        let mut sim = vacuum_integrator(scenario_body(), InitialConditions::default());
        sim.set_control_input(1.0, 0.0, 0.0, 0.0);
        for _ in 0..100 {
            sim.step(0.01).unwrap();
        }
        let a = 500.0 / 2.0 - 9.81;
        assert_relative_eq!(sim.velocity().y, a * 1.0, epsilon = 1e-9);
        // Semi-implicit Euler: p = a·dt²·N(N+1)/2
        assert_relative_eq!(sim.position().y, a * 0.0001 * 5050.0, epsilon = 1e-9);
        assert_relative_eq!(sim.nose_direction(), Vector3::y(), epsilon = 1e-12);
        assert_relative_eq!(sim.time(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn free_fall_converges_as_dt_shrinks() {
        let t_end = 2.0;
        let p0 = 100.0;
        let exact = p0 - 0.5 * 9.81 * t_end * t_end;
        let mut errors = Vec::new();
        for dt in [0.02, 0.01, 0.001] {
            let ic = InitialConditions { position: Vector3::new(0.0, p0, 0.0), ..Default::default() };
            let mut sim = vacuum_integrator(scenario_body(), ic);
            let steps = (t_end / dt).round() as usize;
            for _ in 0..steps {
                sim.step(dt).unwrap();
            }
            let err = (sim.position().y - exact).abs();
            // First-order scheme: error is ½·g·t·dt
            assert_relative_eq!(err, 0.5 * 9.81 * t_end * dt, epsilon = 1e-6);
            errors.push(err);
        }
        assert!(errors[0] > errors[1] && errors[1] > errors[2]);
    }

    #[test]
    fn throttle_waits_for_latency() {
        let body = BodyBuilder::new("lag").thrust_latency(0.25).gimbal_latency(0.5).build().unwrap();
        let mut sim = vacuum_integrator(body, InitialConditions::default());

        sim.step_at(0.0, 0.125).unwrap();
        sim.set_control_input(0.8, 0.5, 0.0, 0.0);
        sim.step_at(1.0, 0.125).unwrap();
        assert_eq!(sim.state().active_thrust_input(), 0.0);
        assert_eq!(sim.state().thrust.pending(), 0.8);
        sim.step_at(1.125, 0.125).unwrap();
        assert_eq!(sim.state().active_thrust_input(), 0.0);
        sim.step_at(1.25, 0.125).unwrap();
        assert_eq!(sim.state().active_thrust_input(), 0.8);
        assert_eq!(sim.state().active_gimbal_input().x, 0.0, "gimbal latency is longer");
        sim.step_at(1.5, 0.125).unwrap();
        assert_eq!(sim.state().active_gimbal_input().x, 0.5);
    }

    #[test]
    fn orientation_stays_orthonormal_while_tumbling() {
        let body = BodyBuilder::new("tumble").instant_actuators().angular_velocity_limit(20.0).build().unwrap();
        let ic = InitialConditions {
            angular_velocity: Vector3::new(3.0, 0.0, -2.0),
            ..Default::default()
        };
        let mut sim = vacuum_integrator(body, ic);
        sim.set_control_input(0.6, 0.7, -0.4, 1.0);
        for _ in 0..5_000 {
            sim.step(0.01).unwrap();
            assert!(orthonormality_error(&sim.orientation()) < 1e-9);
        }
        assert_relative_eq!(sim.orientation().matrix().determinant(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(sim.nose_direction().norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn angular_velocity_never_exceeds_limit() {
        let limit = 2.0;
        let body = BodyBuilder::new("clamp")
            .instant_actuators()
            .angular_velocity_limit(limit)
            .rotational_damping(0.0)
            .roll(RollConfig { max_speed: 5.0, acceleration: 50.0, damping: 1.0 })
            .build()
            .unwrap();
        let mut sim = vacuum_integrator(body, InitialConditions::default());
        sim.set_control_input(1.0, 1.0, 0.0, 1.0);
        for _ in 0..500 {
            sim.step(0.01).unwrap();
            let w = sim.angular_velocity();
            assert!(w.iter().all(|c| c.abs() <= limit), "exceeded limit: {w:?}");
        }
        assert_eq!(sim.angular_velocity().y, limit, "roll target 5 rad/s is clamped too");
    }

    #[test]
    fn roll_is_independent_of_pitch_and_yaw() {
        let roll = RollConfig { max_speed: 3.0, acceleration: 12.0, damping: 5.0 };
        let body = BodyBuilder::new("roll").instant_actuators().roll(roll).build().unwrap();
        let mut sim = FlightIntegrator::new(body, InitialConditions::default()).with_environment(Environment::default());
        sim.set_control_input(0.0, 0.0, 0.0, 0.5);
        for _ in 0..200 {
            sim.step(0.01).unwrap();
            let w = sim.angular_velocity();
            assert_eq!(w.x, 0.0);
            assert_eq!(w.z, 0.0);
        }
        assert_relative_eq!(sim.angular_velocity().y, 0.5 * 3.0, epsilon = 1e-12);
        // Rolling about the nose leaves the nose where it was.
        assert_relative_eq!(sim.nose_direction(), Vector3::y(), epsilon = 1e-9);
    }

    #[test]
    fn gimbal_turns_the_nose() {
        let body = BodyBuilder::new("turn").instant_actuators().build().unwrap();
        let mut sim = vacuum_integrator(body, InitialConditions::default());
        sim.set_control_input(1.0, 1.0, 0.0, 0.0);
        for _ in 0..20 {
            sim.step(0.01).unwrap();
        }
        assert!(sim.angular_velocity().z > 0.0);
        assert!(sim.nose_direction().x < 0.0, "positive gimbal x swings the nose to -X");
    }

    #[test]
    fn idle_authority_rotates_without_throttle() {
        let body = BodyBuilder::new("idle").instant_actuators().idle_thrust_fraction(0.05).build().unwrap();
        let mut sim = vacuum_integrator(body, InitialConditions::default());
        sim.set_control_input(0.0, 0.0, 1.0, 0.0);
        for _ in 0..10 {
            sim.step(0.01).unwrap();
        }
        assert!(sim.angular_velocity().x < 0.0);
        assert_eq!(sim.last_forces().thrust_local, Vector3::zeros());
    }

    #[test]
    fn missing_environment_still_integrates_thrust() {
        let mut sim = FlightIntegrator::new(scenario_body(), InitialConditions::default());
        sim.step(0.01).unwrap();
        assert_eq!(sim.position(), Vector3::zeros(), "no gravity without an environment");
        sim.set_control_input(1.0, 0.0, 0.0, 0.0);
        sim.step(0.01).unwrap();
        assert_relative_eq!(sim.velocity().y, 2.5, epsilon = 1e-12);
    }

    #[test]
    fn nan_wind_faults_the_projectile() {
        let body = BodyBuilder::new("nan").build().unwrap();
        let env = Environment::default().with_wind(|_: &Vector3<f64>| Vector3::new(f64::NAN, 0.0, 0.0));
        let ic = InitialConditions { velocity: Vector3::new(0.0, 30.0, 0.0), ..Default::default() };
        let mut sim = FlightIntegrator::new(body, ic).with_environment(env);
        let err = sim.step(0.01).unwrap_err();
        assert!(matches!(err, FlightError::NonFinite { quantity: "force", .. }));
        assert!(sim.is_faulted());
        assert!(matches!(sim.step(0.01), Err(FlightError::Faulted { .. })));
        assert_eq!(sim.position(), Vector3::zeros(), "state untouched by the faulted tick");
    }

    #[test]
    fn overflowing_state_faults_without_committing() {
        let ic = InitialConditions { velocity: Vector3::new(0.0, 1e308, 0.0), ..Default::default() };
        let mut sim = FlightIntegrator::new(scenario_body(), ic);
        sim.set_control_input(1.0, 0.5, 0.0, 1.0);
        let before = sim.state().clone();

        let err = sim.step(10.0).unwrap_err();
        assert!(matches!(err, FlightError::NonFinite { quantity: "state", .. }));
        assert_eq!(sim.state(), &before, "actuators and kinematics keep their pre-tick values");
        assert_eq!(sim.guidance().roll_rate(), 0.0);
        assert_eq!(sim.state().active_thrust_input(), 0.0);
    }

    #[test]
    fn set_environment_switches_gravity_and_rearms_warning() {
        let mut sim = FlightIntegrator::new(scenario_body(), InitialConditions::default());
        sim.step(0.01).unwrap();
        assert!(sim.warned_no_env);
        assert_eq!(sim.velocity(), Vector3::zeros());

        sim.set_environment(Some(Environment::vacuum(9.81)));
        assert!(!sim.warned_no_env);
        sim.step(0.01).unwrap();
        assert_relative_eq!(sim.velocity().y, -0.0981, epsilon = 1e-12);
        assert!(sim.environment().is_some());

        sim.set_environment(None);
        let v = sim.velocity();
        sim.step(0.01).unwrap();
        assert!(sim.warned_no_env);
        assert_eq!(sim.velocity(), v);
    }

    #[test]
    fn reset_restores_initial_state() {
        let ic = InitialConditions::launch(Vector3::new(0.0, 1.5, 0.0), 60.0, 0.0);
        let mut sim = vacuum_integrator(scenario_body(), ic.clone());
        let start = sim.state().clone();
        sim.set_control_input(1.0, 0.3, 0.2, 0.5);
        for _ in 0..50 {
            sim.step(0.01).unwrap();
        }
        assert_ne!(sim.position(), start.position);
        sim.reset();
        assert_eq!(sim.state(), &start);
        assert_eq!(sim.guidance().throttle(), 0.0);
        assert!(!sim.is_faulted());
    }

    #[test]
    fn rejects_non_positive_dt() {
        let mut sim = vacuum_integrator(scenario_body(), InitialConditions::default());
        assert!(matches!(sim.step(0.0), Err(FlightError::InvalidParameter(_))));
        assert!(!sim.is_faulted());
    }

    #[test]
    fn integrator_can_move_between_threads() {
        fn assert_send<T: Send>() {}
        assert_send::<FlightIntegrator>();
    }

    #[test]
    fn torque_free_symmetric_body_keeps_spin() {
        // I_pitch = I_yaw: ω_y = 0 gives no gyroscopic coupling between x and z.
        let i = Vector3::new(2.0, 0.5, 2.0);
        let w = Vector3::new(1.0, 0.0, 3.0);
        let rates = euler_rates(&i, &Vector3::zeros(), &w);
        assert_relative_eq!(rates, Vector3::zeros(), epsilon = 1e-15);
    }

    #[test]
    fn gyroscopic_coupling_follows_inertia_difference() {
        let i = Vector3::new(2.0, 0.5, 2.0);
        let w = Vector3::new(0.0, 4.0, 1.0);
        let rates = euler_rates(&i, &Vector3::zeros(), &w);
        assert_relative_eq!(rates.x, -(2.0 - 0.5) / 2.0 * 4.0 * 1.0, epsilon = 1e-12);
    }
}
