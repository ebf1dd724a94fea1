use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use guided_flight::io::{self, FlightSummary};
use guided_flight::sim::{self, EventKind, Flight, ScenarioConfig, PRESETS};
use guided_flight::BodyParameters;

#[derive(Parser, Debug)]
#[command(name = "guided-flight")]
#[command(about = "Guided-projectile 6DOF flight simulator")]
#[command(version)]
struct Args {
    /// Scenario JSON file
    #[arg(short, long, conflicts_with = "preset")]
    scenario: Option<PathBuf>,

    /// Built-in scenario: vertical, missile or glide
    #[arg(short, long, default_value = "vertical")]
    preset: String,

    /// Override the tick length (s)
    #[arg(long)]
    dt: Option<f64>,

    /// Override the run duration (s)
    #[arg(long)]
    duration: Option<f64>,

    /// Write the trajectory as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the flight summary as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Print the resolved scenario as JSON and exit
    #[arg(long)]
    dump_scenario: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut scenario = match &args.scenario {
        Some(path) => ScenarioConfig::from_path(path)
            .with_context(|| format!("loading scenario {}", path.display()))?,
        None => match ScenarioConfig::preset(&args.preset) {
            Some(s) => s,
            None => bail!("unknown preset {:?}, expected one of {}", args.preset, PRESETS.join(", ")),
        },
    };
    if let Some(dt) = args.dt {
        scenario.run.dt = dt;
    }
    if let Some(duration) = args.duration {
        scenario.run.duration = duration;
    }

    if args.dump_scenario {
        println!("{}", scenario.to_json_string()?);
        return Ok(());
    }

    let body = BodyParameters::new(&scenario.body).context("invalid body parameters")?;
    let flight = sim::simulate(&scenario).context("simulation failed")?;
    let summary = FlightSummary::from_flight(&flight);

    print_report(&scenario, &body, &flight, &summary);

    if let Some(path) = &args.csv {
        io::write_trajectory_file(path, &flight.samples)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("  Trajectory written to {}", path.display());
    }
    if let Some(path) = &args.json {
        io::write_summary_file(path, &summary).with_context(|| format!("writing {}", path.display()))?;
        println!("  Summary written to {}", path.display());
    }

    Ok(())
}

fn print_report(scenario: &ScenarioConfig, body: &BodyParameters, flight: &Flight, summary: &FlightSummary) {
    let g = scenario.environment.gravity;
    let props = body.mass_properties();
    let prop = body.propulsion();

    println!();
    println!("====================================================================");
    println!("  GUIDED FLIGHT: {}", flight.name);
    println!("====================================================================");
    println!();
    println!("  Body: {}", body.name());
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Mass:          {:>8.2} kg    Length:       {:>8.3} m",
        props.mass,
        body.geometry().length()
    );
    println!(
        "  Max thrust:    {:>8.0} N     TWR:          {:>8.2}",
        prop.max_thrust,
        body.twr(g)
    );
    println!(
        "  Gimbal:        {:>8.1} deg   CoM from tail:{:>8.3} m",
        prop.max_gimbal_angle.to_degrees(),
        props.com_offset
    );
    println!(
        "  Inertia:       {:.4} / {:.4} / {:.4} kg m^2 (pitch/roll/yaw)",
        props.pitch(),
        props.roll(),
        props.yaw()
    );
    println!(
        "  Latency:       {:>8.3} s (thrust)  {:.3} s (gimbal)",
        prop.thrust_latency, prop.gimbal_latency
    );
    println!();

    println!("  Flight Events");
    println!("  ──────────────────────────────────────────────────────────────────");
    for event in &flight.events {
        let label = match &event.kind {
            EventKind::Apogee => "APOGEE".to_string(),
            EventKind::MotorCutoff => "CUTOFF".to_string(),
            EventKind::Fault => "FAULT".to_string(),
            EventKind::Altitude { threshold, ascending } => {
                format!("ALT {:.0}{}", threshold, if *ascending { "↑" } else { "↓" })
            }
        };
        println!("  {:<9} t={:>6.2}s   alt={:>8.1}m", label, event.time, event.altitude);
    }
    if let Some(last) = flight.last() {
        println!(
            "  END       t={:>6.2}s   alt={:>8.1}m   vel={:>7.1}m/s",
            last.time, last.position.y, last.speed
        );
    }
    println!();

    println!("  Performance Summary");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!("  Max altitude:  {:>8.1} m   at t={:.2} s", summary.apogee_m, summary.apogee_time);
    println!("  Max speed:     {:>8.1} m/s", summary.max_speed);
    println!("  Max accel:     {:>8.1} m/s^2 ({:.1} g)", summary.max_accel, summary.max_accel_g);
    println!("  Ground range:  {:>8.1} m", summary.ground_range_m);
    println!("  Flight time:   {:>8.2} s", summary.flight_time);
    if let Some(t) = summary.faulted_at {
        println!("  FAULTED at t={t:.3} s");
    }
    println!();

    println!("  Trajectory");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>7}  {:>9}  {:>9}  {:>9}  {:>7}  {:>7}  {:>5}",
        "t (s)", "alt (m)", "range (m)", "vel (m/s)", "elev", "alpha", "thr"
    );
    println!("  {}", "─".repeat(66));

    let interval = (flight.samples.len() / 30).max(1);
    for (i, s) in flight.samples.iter().enumerate() {
        if i % interval != 0 && i != flight.samples.len() - 1 {
            continue;
        }
        println!(
            "  {:>7.2}  {:>9.1}  {:>9.1}  {:>9.1}  {:>7.1}  {:>7.1}  {:>5.2}",
            s.time,
            s.position.y,
            s.ground_range(),
            s.speed,
            s.elevation.to_degrees(),
            s.alpha.to_degrees(),
            s.throttle
        );
    }

    println!();
    println!("  Simulation: {} samples, dt={} s", flight.samples.len(), scenario.run.dt);
    println!("====================================================================");
    println!();
}
