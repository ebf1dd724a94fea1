use std::io::{self, Write};
use std::path::Path;

use crate::sim::runner::FlightSample;

/// Write trajectory samples as CSV.
///
/// Columns: time, pos_x, pos_y, pos_z, vel_x, vel_y, vel_z,
///          omega_pitch, omega_roll, omega_yaw, nose_x, nose_y, nose_z,
///          throttle, gimbal_x, gimbal_y, speed, elevation_deg, alpha_deg
pub fn write_trajectory<W: Write>(writer: &mut W, samples: &[FlightSample]) -> io::Result<()> {
    writeln!(
        writer,
        "time,pos_x,pos_y,pos_z,vel_x,vel_y,vel_z,\
         omega_pitch,omega_roll,omega_yaw,nose_x,nose_y,nose_z,\
         throttle,gimbal_x,gimbal_y,speed,elevation_deg,alpha_deg"
    )?;

    for s in samples {
        writeln!(
            writer,
            "{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},\
             {:.6},{:.6},{:.6},{:.6},{:.6},{:.6},\
             {:.3},{:.3},{:.3},{:.4},{:.2},{:.2}",
            s.time,
            s.position.x, s.position.y, s.position.z,
            s.velocity.x, s.velocity.y, s.velocity.z,
            s.angular_velocity.x, s.angular_velocity.y, s.angular_velocity.z,
            s.nose.x, s.nose.y, s.nose.z,
            s.throttle,
            s.gimbal.x, s.gimbal.y,
            s.speed,
            s.elevation.to_degrees(),
            s.alpha.to_degrees(),
        )?;
    }

    Ok(())
}

pub fn write_trajectory_file(path: impl AsRef<Path>, samples: &[FlightSample]) -> io::Result<()> {
    let mut file = io::BufWriter::new(std::fs::File::create(path)?);
    write_trajectory(&mut file, samples)?;
    file.flush()
}
