use std::f64::consts::PI;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{FlightError, Result};
use crate::gnc::RollConfig;

// ---------------------------------------------------------------------------
// Raw body configuration (as loaded from a scenario)
// ---------------------------------------------------------------------------

/// Projectile description before any derived quantity is computed.
///
/// Body frame: +Y is the nose (symmetry/roll) axis, X is pitch, Z is yaw.
/// The nozzle sits on the tail plane, y = 0 in geometry coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub name: String,
    pub radius: f64,           // m
    pub cylinder_height: f64,  // m
    pub cone_height: f64,      // m (0 = flat nose)
    pub mass: f64,             // kg
    pub max_thrust: f64,       // N
    pub max_gimbal_angle: f64, // rad
    pub thrust_latency: f64,   // s
    pub gimbal_latency: f64,   // s
    pub idle_thrust_fraction: f64,
    pub form_drag: f64,
    pub viscous_drag_factor: f64,
    pub alignment_coefficient: f64,
    pub drag_cap_ratio: f64, // drag magnitude cap, as a fraction of max_thrust
    pub rotational_damping: f64,
    pub angular_velocity_limit: f64, // rad/s, per component
    pub roll: RollConfig,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            name: "Projectile".into(),
            radius: 0.05,
            cylinder_height: 0.3,
            cone_height: 0.2,
            mass: 2.0,
            max_thrust: 500.0,
            max_gimbal_angle: 15.0_f64.to_radians(),
            thrust_latency: 0.1,
            gimbal_latency: 0.05,
            idle_thrust_fraction: 0.02,
            form_drag: 0.3,
            viscous_drag_factor: 24.0,
            alignment_coefficient: 0.5,
            drag_cap_ratio: 1.0,
            rotational_damping: 0.01,
            angular_velocity_limit: 6.0,
            roll: RollConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Derived parameter groups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub radius: f64,
    pub cylinder_height: f64,
    pub cone_height: f64,
}

impl Geometry {
    pub fn volume(&self) -> f64 {
        PI * self.radius * self.radius * (self.cylinder_height + self.cone_height / 3.0)
    }

    /// Cross-section seen head-on.
    pub fn frontal_area(&self) -> f64 {
        PI * self.radius * self.radius
    }

    /// Silhouette seen side-on.
    pub fn side_area(&self) -> f64 {
        self.radius * (2.0 * self.cylinder_height + self.cone_height)
    }

    pub fn length(&self) -> f64 {
        self.cylinder_height + self.cone_height
    }

    /// Center of mass measured from the tail plane along the nose axis.
    pub fn center_of_mass_offset(&self) -> f64 {
        let (h_cyl, h_cone) = (self.cylinder_height, self.cone_height);
        (6.0 * h_cyl * h_cyl + 4.0 * h_cyl * h_cone + 3.0 * h_cone * h_cone)
            / (12.0 * h_cyl + 4.0 * h_cone)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassProperties {
    pub mass: f64,
    pub volume: f64,
    /// Principal moments in body axes: [pitch (X), roll (Y), yaw (Z)], kg*m^2.
    pub inertia: Vector3<f64>,
    pub com_offset: f64,
}

impl MassProperties {
    /// Split the body into cylinder and cone sub-masses by volume share and
    /// sum their inertias about the combined center of mass.
    pub fn derive(geometry: &Geometry, mass: f64) -> Result<Self> {
        let Geometry { radius: r, cylinder_height: h_cyl, cone_height: h_cone } = *geometry;

        let v_cyl = PI * r * r * h_cyl;
        let v_cone = PI * r * r * h_cone / 3.0;
        let volume = v_cyl + v_cone;
        let m_cyl = mass * v_cyl / volume;
        let m_cone = mass - m_cyl;

        let com = geometry.center_of_mass_offset();
        // Part centroids consistent with the closed-form offset above.
        let d_cyl = 0.5 * h_cyl - com;
        let d_cone = h_cyl + 0.75 * h_cone - com;

        let roll = 0.5 * m_cyl * r * r + 0.3 * m_cone * r * r;
        let cyl_transverse = m_cyl * (3.0 * r * r + h_cyl * h_cyl) / 12.0;
        let cone_transverse = m_cone * (3.0 / 20.0 * r * r + 3.0 / 80.0 * h_cone * h_cone);
        let pitch = cyl_transverse + m_cyl * d_cyl * d_cyl + cone_transverse + m_cone * d_cone * d_cone;

        for (axis, value) in [("pitch", pitch), ("roll", roll)] {
            if value.is_nan() || value <= 0.0 {
                return Err(FlightError::NonPositiveInertia { axis, value });
            }
        }

        Ok(Self {
            mass,
            volume,
            inertia: Vector3::new(pitch, roll, pitch),
            com_offset: com,
        })
    }

    pub fn pitch(&self) -> f64 {
        self.inertia.x
    }

    pub fn roll(&self) -> f64 {
        self.inertia.y
    }

    pub fn yaw(&self) -> f64 {
        self.inertia.z
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Propulsion {
    pub max_thrust: f64,
    pub max_gimbal_angle: f64,
    pub thrust_latency: f64,
    pub gimbal_latency: f64,
    pub idle_thrust_fraction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aerodynamics {
    pub form_drag: f64,
    pub viscous_drag_factor: f64,
    pub alignment_coefficient: f64,
    pub drag_cap_ratio: f64,
    pub rotational_damping: f64,
}

// ---------------------------------------------------------------------------
// BodyParameters
// ---------------------------------------------------------------------------

/// Validated projectile parameters with derived mass properties.
///
/// Immutable once built: the inertia tensor and center-of-mass offset are
/// derived exactly once, in [`BodyParameters::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct BodyParameters {
    name: String,
    geometry: Geometry,
    mass: MassProperties,
    propulsion: Propulsion,
    aero: Aerodynamics,
    angular_velocity_limit: f64,
    roll: RollConfig,
}

impl BodyParameters {
    pub fn new(config: &BodyConfig) -> Result<Self> {
        validate(config)?;

        let geometry = Geometry {
            radius: config.radius,
            cylinder_height: config.cylinder_height,
            cone_height: config.cone_height,
        };
        let mass = MassProperties::derive(&geometry, config.mass)?;

        Ok(Self {
            name: config.name.clone(),
            geometry,
            mass,
            propulsion: Propulsion {
                max_thrust: config.max_thrust,
                max_gimbal_angle: config.max_gimbal_angle,
                thrust_latency: config.thrust_latency,
                gimbal_latency: config.gimbal_latency,
                idle_thrust_fraction: config.idle_thrust_fraction,
            },
            aero: Aerodynamics {
                form_drag: config.form_drag,
                viscous_drag_factor: config.viscous_drag_factor,
                alignment_coefficient: config.alignment_coefficient,
                drag_cap_ratio: config.drag_cap_ratio,
                rotational_damping: config.rotational_damping,
            },
            angular_velocity_limit: config.angular_velocity_limit,
            roll: config.roll,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn mass_properties(&self) -> &MassProperties {
        &self.mass
    }

    pub fn mass(&self) -> f64 {
        self.mass.mass
    }

    pub fn inertia(&self) -> Vector3<f64> {
        self.mass.inertia
    }

    pub fn propulsion(&self) -> &Propulsion {
        &self.propulsion
    }

    pub fn aero(&self) -> &Aerodynamics {
        &self.aero
    }

    pub fn angular_velocity_limit(&self) -> f64 {
        self.angular_velocity_limit
    }

    pub fn roll(&self) -> &RollConfig {
        &self.roll
    }

    /// Vector from the center of mass to the nozzle, body frame.
    pub fn nozzle_arm(&self) -> Vector3<f64> {
        Vector3::new(0.0, -self.mass.com_offset, 0.0)
    }

    /// Thrust-to-weight ratio at full throttle.
    pub fn twr(&self, gravity: f64) -> f64 {
        self.propulsion.max_thrust / (self.mass.mass * gravity)
    }
}

impl TryFrom<&BodyConfig> for BodyParameters {
    type Error = FlightError;

    fn try_from(config: &BodyConfig) -> Result<Self> {
        BodyParameters::new(config)
    }
}

fn validate(c: &BodyConfig) -> Result<()> {
    let positive = [
        ("radius", c.radius),
        ("cylinder_height", c.cylinder_height),
        ("mass", c.mass),
        ("angular_velocity_limit", c.angular_velocity_limit),
    ];
    for (name, value) in positive {
        if !value.is_finite() || value <= 0.0 {
            return Err(FlightError::InvalidParameter(format!(
                "{name} must be positive, got {value}"
            )));
        }
    }

    let non_negative = [
        ("cone_height", c.cone_height),
        ("max_thrust", c.max_thrust),
        ("thrust_latency", c.thrust_latency),
        ("gimbal_latency", c.gimbal_latency),
        ("idle_thrust_fraction", c.idle_thrust_fraction),
        ("form_drag", c.form_drag),
        ("viscous_drag_factor", c.viscous_drag_factor),
        ("alignment_coefficient", c.alignment_coefficient),
        ("drag_cap_ratio", c.drag_cap_ratio),
        ("rotational_damping", c.rotational_damping),
    ];
    for (name, value) in non_negative {
        if !value.is_finite() || value < 0.0 {
            return Err(FlightError::InvalidParameter(format!(
                "{name} must be non-negative, got {value}"
            )));
        }
    }

    if !(0.0..=std::f64::consts::FRAC_PI_2).contains(&c.max_gimbal_angle) {
        return Err(FlightError::InvalidParameter(format!(
            "max_gimbal_angle must lie in [0, pi/2], got {}",
            c.max_gimbal_angle
        )));
    }

    c.roll.validate()
}

// ---------------------------------------------------------------------------
// Body builder
// ---------------------------------------------------------------------------

pub struct BodyBuilder {
    config: BodyConfig,
}

impl BodyBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            config: BodyConfig { name: name.into(), ..BodyConfig::default() },
        }
    }

    pub fn radius(mut self, v: f64) -> Self { self.config.radius = v; self }
    pub fn cylinder_height(mut self, v: f64) -> Self { self.config.cylinder_height = v; self }
    pub fn cone_height(mut self, v: f64) -> Self { self.config.cone_height = v; self }
    pub fn mass(mut self, v: f64) -> Self { self.config.mass = v; self }
    pub fn max_thrust(mut self, v: f64) -> Self { self.config.max_thrust = v; self }
    pub fn max_gimbal_angle(mut self, v: f64) -> Self { self.config.max_gimbal_angle = v; self }
    pub fn thrust_latency(mut self, v: f64) -> Self { self.config.thrust_latency = v; self }
    pub fn gimbal_latency(mut self, v: f64) -> Self { self.config.gimbal_latency = v; self }
    pub fn idle_thrust_fraction(mut self, v: f64) -> Self { self.config.idle_thrust_fraction = v; self }
    pub fn form_drag(mut self, v: f64) -> Self { self.config.form_drag = v; self }
    pub fn viscous_drag_factor(mut self, v: f64) -> Self { self.config.viscous_drag_factor = v; self }
    pub fn alignment_coefficient(mut self, v: f64) -> Self { self.config.alignment_coefficient = v; self }
    pub fn drag_cap_ratio(mut self, v: f64) -> Self { self.config.drag_cap_ratio = v; self }
    pub fn rotational_damping(mut self, v: f64) -> Self { self.config.rotational_damping = v; self }
    pub fn angular_velocity_limit(mut self, v: f64) -> Self { self.config.angular_velocity_limit = v; self }
    pub fn roll(mut self, v: RollConfig) -> Self { self.config.roll = v; self }

    /// Zero out every aerodynamic term.
    pub fn no_aero(mut self) -> Self {
        self.config.form_drag = 0.0;
        self.config.viscous_drag_factor = 0.0;
        self.config.alignment_coefficient = 0.0;
        self.config.rotational_damping = 0.0;
        self
    }

    /// Controls take effect on the tick they are sampled.
    pub fn instant_actuators(mut self) -> Self {
        self.config.thrust_latency = 0.0;
        self.config.gimbal_latency = 0.0;
        self
    }

    pub fn config(&self) -> &BodyConfig {
        &self.config
    }

    pub fn into_config(self) -> BodyConfig {
        self.config
    }

    pub fn build(self) -> Result<BodyParameters> {
        BodyParameters::new(&self.config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
