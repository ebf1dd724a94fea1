use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::physics::environment::STANDARD_GRAVITY;
use crate::sim::event::FlightEvent;
use crate::sim::runner::Flight;

/// Summary statistics computed from a finished run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FlightSummary {
    pub name: String,
    pub apogee_m: f64,
    pub apogee_time: f64,
    pub max_speed: f64,
    pub max_accel: f64,
    pub max_accel_g: f64,
    pub flight_time: f64,
    pub impact_speed: f64,
    pub ground_range_m: f64,
    pub faulted_at: Option<f64>,
    pub events: Vec<FlightEvent>,
}

impl FlightSummary {
    pub fn from_flight(flight: &Flight) -> Self {
        let Some(last) = flight.last() else {
            return Self { name: flight.name.clone(), ..Self::default() };
        };
        let apogee = flight.apogee().unwrap_or(last);

        let max_accel = flight
            .samples
            .windows(2)
            .map(|w| {
                let dt = w[1].time - w[0].time;
                if dt > 0.0 {
                    (w[1].velocity - w[0].velocity).norm() / dt
                } else {
                    0.0
                }
            })
            .fold(0.0_f64, f64::max);

        FlightSummary {
            name: flight.name.clone(),
            apogee_m: apogee.position.y,
            apogee_time: apogee.time,
            max_speed: flight.max_speed(),
            max_accel,
            max_accel_g: max_accel / STANDARD_GRAVITY,
            flight_time: last.time,
            impact_speed: last.speed,
            ground_range_m: last.ground_range(),
            faulted_at: flight.faulted_at,
            events: flight.events.clone(),
        }
    }
}

/// Write a flight summary as pretty-printed JSON.
pub fn write_summary<W: Write>(writer: &mut W, summary: &FlightSummary) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, summary)?;
    writeln!(writer)?;
    Ok(())
}

pub fn write_summary_file(path: impl AsRef<Path>, summary: &FlightSummary) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, summary)
}
