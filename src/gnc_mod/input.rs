use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::error::{FlightError, Result};

/// Roll input below this magnitude counts as released.
pub const ROLL_DEADZONE: f64 = 1e-3;

/// Roll rates below this snap to zero while decaying.
pub const ROLL_SNAP_RATE: f64 = 1e-3;

// ---------------------------------------------------------------------------
// Control sample
// ---------------------------------------------------------------------------

/// One normalized control vector, clamped on construction.
///
/// `gimbal` components are clamped to [-1, 1] and the vector is then limited
/// to unit magnitude.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlSample {
    pub throttle: f64,
    pub gimbal: Vector2<f64>,
    pub roll: f64,
}

impl ControlSample {
    pub fn new(throttle: f64, gimbal_x: f64, gimbal_y: f64, roll: f64) -> Self {
        let mut gimbal = Vector2::new(clamp_unit(gimbal_x), clamp_unit(gimbal_y));
        let norm = gimbal.norm();
        if norm > 1.0 {
            gimbal /= norm;
        }
        Self {
            throttle: clamp_or_zero(throttle, 0.0, 1.0),
            gimbal,
            roll: clamp_unit(roll),
        }
    }

    pub fn neutral() -> Self {
        Self::default()
    }

    /// Re-apply the clamping rules, e.g. after deserializing raw values.
    pub fn clamped(&self) -> Self {
        Self::new(self.throttle, self.gimbal.x, self.gimbal.y, self.roll)
    }
}

fn clamp_unit(v: f64) -> f64 {
    clamp_or_zero(v, -1.0, 1.0)
}

// NaN input is treated as released.
fn clamp_or_zero(v: f64, lo: f64, hi: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(lo, hi)
    }
}

// ---------------------------------------------------------------------------
// Roll feel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollConfig {
    pub max_speed: f64,    // rad/s at full roll input
    pub acceleration: f64, // rad/s^2 toward the commanded rate
    pub damping: f64,      // 1/s exponential decay when released
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            max_speed: 3.0,
            acceleration: 12.0,
            damping: 5.0,
        }
    }
}

impl RollConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("roll.max_speed", self.max_speed),
            ("roll.acceleration", self.acceleration),
            ("roll.damping", self.damping),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(FlightError::InvalidParameter(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Guidance input
// ---------------------------------------------------------------------------

/// Latest control vector published by the host, plus the smoothed roll rate.
///
/// Throttle and gimbal are raw here; actuator latency is applied by the
/// integrator. Roll bypasses latency and is shaped by [`RollConfig`] instead.
#[derive(Debug, Clone)]
pub struct GuidanceInput {
    sample: ControlSample,
    roll_rate: f64,
    config: RollConfig,
}

impl GuidanceInput {
    pub fn new(config: RollConfig) -> Self {
        Self {
            sample: ControlSample::neutral(),
            roll_rate: 0.0,
            config,
        }
    }

    /// Out-of-range values are clamped, never rejected.
    pub fn set_control(&mut self, throttle: f64, gimbal_x: f64, gimbal_y: f64, roll: f64) {
        self.sample = ControlSample::new(throttle, gimbal_x, gimbal_y, roll);
    }

    pub fn set_sample(&mut self, sample: ControlSample) {
        self.sample = sample.clamped();
    }

    pub fn sample(&self) -> ControlSample {
        self.sample
    }

    pub fn throttle(&self) -> f64 {
        self.sample.throttle
    }

    pub fn gimbal(&self) -> Vector2<f64> {
        self.sample.gimbal
    }

    pub fn roll_input(&self) -> f64 {
        self.sample.roll
    }

    pub fn roll_rate(&self) -> f64 {
        self.roll_rate
    }

    pub fn config(&self) -> &RollConfig {
        &self.config
    }

    /// Advance the roll channel by `dt` and return the new roll rate.
    pub fn update_roll(&mut self, dt: f64) -> f64 {
        let input = self.sample.roll;
        if input.abs() > ROLL_DEADZONE {
            let target = input * self.config.max_speed;
            let max_step = self.config.acceleration * dt;
            self.roll_rate += (target - self.roll_rate).clamp(-max_step, max_step);
        } else {
            self.roll_rate *= (-self.config.damping * dt).exp();
            if self.roll_rate.abs() < ROLL_SNAP_RATE {
                self.roll_rate = 0.0;
            }
        }
        self.roll_rate
    }

    pub fn reset(&mut self) {
        self.sample = ControlSample::neutral();
        self.roll_rate = 0.0;
    }
}

impl Default for GuidanceInput {
    fn default() -> Self {
        Self::new(RollConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn set_control_clamps_silently() {
        let mut g = GuidanceInput::default();
        g.set_control(1.7, -3.0, 0.0, 2.0);
        assert_eq!(g.throttle(), 1.0);
        assert_eq!(g.gimbal(), Vector2::new(-1.0, 0.0));
        assert_eq!(g.roll_input(), 1.0);

        g.set_control(-0.5, 0.2, 0.1, -9.0);
        assert_eq!(g.throttle(), 0.0);
        assert_eq!(g.roll_input(), -1.0);
    }

    #[test]
    fn diagonal_gimbal_limited_to_unit_magnitude() {
        let s = ControlSample::new(0.5, 1.0, 1.0, 0.0);
        assert_relative_eq!(s.gimbal.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(s.gimbal.x, s.gimbal.y, epsilon = 1e-12);
    }

    #[test]
    fn nan_input_reads_as_released() {
        let s = ControlSample::new(f64::NAN, f64::NAN, 0.3, f64::NAN);
        assert_eq!(s.throttle, 0.0);
        assert_eq!(s.gimbal.x, 0.0);
        assert_eq!(s.roll, 0.0);
    }

    #[test]
    fn roll_rate_ramps_at_configured_acceleration() {
        let mut g = GuidanceInput::new(RollConfig { max_speed: 3.0, acceleration: 10.0, damping: 5.0 });
        g.set_control(0.0, 0.0, 0.0, 0.5);
        let r = g.update_roll(0.05);
        assert_relative_eq!(r, 0.5, epsilon = 1e-12);
        for _ in 0..100 {
            g.update_roll(0.05);
        }
        assert_relative_eq!(g.roll_rate(), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn released_roll_decays_then_snaps_to_zero() {
        let mut g = GuidanceInput::default();
        g.set_control(0.0, 0.0, 0.0, 1.0);
        for _ in 0..200 {
            g.update_roll(0.01);
        }
        let before = g.roll_rate();
        g.set_control(0.0, 0.0, 0.0, 0.0);
        let after = g.update_roll(0.01);
        assert_relative_eq!(after, before * (-g.config().damping * 0.01_f64).exp(), epsilon = 1e-12);

        for _ in 0..1000 {
            g.update_roll(0.01);
        }
        assert_eq!(g.roll_rate(), 0.0);
    }
}
