use guided_flight::io::{self, FlightSummary};
use guided_flight::sim::{self, ScenarioConfig};

fn main() -> anyhow::Result<()> {
    let scenario = ScenarioConfig::preset("missile").ok_or_else(|| anyhow::anyhow!("missing preset"))?;

    println!("Simulating {} ...", scenario.name);
    let flight = sim::simulate(&scenario)?;

    let summary = FlightSummary::from_flight(&flight);
    println!("Apogee: {:.1} m", summary.apogee_m);
    println!("Max speed: {:.1} m/s", summary.max_speed);
    println!("Ground range: {:.1} m", summary.ground_range_m);
    println!("Flight time: {:.1} s", summary.flight_time);

    std::fs::write("missile_scenario.json", scenario.to_json_string()?)?;
    io::write_trajectory_file("missile_trajectory.csv", &flight.samples)?;
    io::write_summary_file("missile_summary.json", &summary)?;

    println!("Exported: missile_scenario.json, missile_trajectory.csv, missile_summary.json");
    Ok(())
}
