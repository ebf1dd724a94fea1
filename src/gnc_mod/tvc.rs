use nalgebra::{Vector2, Vector3};

use crate::dynamics::state::FlightState;
use crate::vehicle::BodyParameters;

use super::controller::Pilot;
use super::input::ControlSample;
use super::pid::{Pid, PidGains};

// ---------------------------------------------------------------------------
// TVC pilot: steer the nose toward a world direction via gimbal commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TvcPilot {
    pub target: Vector3<f64>,
    pub throttle: f64,
    pub pitch_pid: Pid,
    pub yaw_pid: Pid,
    /// Seconds between guidance updates. `None` uses twice the body's gimbal
    /// latency so every command settles before the next one replaces it.
    pub update_period: Option<f64>,
    held: Option<(f64, ControlSample)>,
}

impl TvcPilot {
    pub fn new(target: Vector3<f64>, throttle: f64, gains: PidGains) -> Self {
        Self {
            target,
            throttle,
            pitch_pid: Pid::new(gains),
            yaw_pid: Pid::new(gains),
            update_period: None,
            held: None,
        }
    }

    pub fn with_update_period(mut self, period: f64) -> Self {
        self.update_period = Some(period);
        self
    }

    /// Steer toward a world point rather than a fixed direction.
    pub fn aim_at(&mut self, from: &Vector3<f64>, point: &Vector3<f64>) {
        let d = point - from;
        if d.norm() > 1e-9 {
            self.target = d;
        }
    }

    pub fn update(&mut self, state: &FlightState, dt: f64) -> ControlSample {
        let err = nose_error(state, &self.target);
        // Deflecting the nozzle toward +x swings the nose toward -x.
        let gx = -self.yaw_pid.update(err.x, dt);
        let gy = -self.pitch_pid.update(err.y, dt);
        ControlSample::new(self.throttle, gx, gy, 0.0)
    }

    pub fn reset(&mut self) {
        self.pitch_pid.reset();
        self.yaw_pid.reset();
        self.held = None;
    }
}

/// Angular error between nose and `target`, split onto the body X/Z plane (rad).
///
/// x: lateral error along body X, y: lateral error along body Z.
pub fn nose_error(state: &FlightState, target: &Vector3<f64>) -> Vector2<f64> {
    let norm = target.norm();
    if norm < 1e-12 {
        return Vector2::zeros();
    }
    let t_body = state.orientation.inverse_transform_vector(&(target / norm));
    let angle = t_body.y.clamp(-1.0, 1.0).acos();
    let lateral = Vector2::new(t_body.x, t_body.z);
    match lateral.try_normalize(1e-12) {
        Some(dir) => dir * angle,
        // Target dead astern: pick a turn direction.
        None if t_body.y < 0.0 => Vector2::new(angle, 0.0),
        None => Vector2::zeros(),
    }
}

impl Pilot for TvcPilot {
    fn control(&mut self, state: &FlightState, body: &BodyParameters, dt: f64) -> ControlSample {
        let period = self
            .update_period
            .unwrap_or(2.0 * body.propulsion().gimbal_latency);
        match self.held {
            Some((since, cmd)) if state.time - since + 1e-9 < period => cmd,
            held => {
                let elapsed = held.map_or(dt, |(since, _)| (state.time - since).max(dt));
                let cmd = self.update(state, elapsed);
                self.held = Some((state.time, cmd));
                cmd
            }
        }
    }

    fn reset(&mut self) {
        TvcPilot::reset(self);
    }

    fn name(&self) -> &str {
        "TvcPilot"
    }
}
