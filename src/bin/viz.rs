use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints};

use guided_flight::sim::{self, Flight, FlightSample, ScenarioConfig, PRESETS};

fn main() -> eframe::Result {
    let flights: Vec<Flight> = PRESETS
        .iter()
        .filter_map(|name| ScenarioConfig::preset(name))
        .filter_map(|scenario| match sim::simulate(&scenario) {
            Ok(flight) => Some(flight),
            Err(err) => {
                eprintln!("{}: {err}", scenario.name);
                None
            }
        })
        .collect();

    let app = FlightViz { flights, selected: 0 };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("Guided Flight", options, Box::new(|_| Ok(Box::new(app))))
}

struct FlightViz {
    flights: Vec<Flight>,
    selected: usize,
}

fn time_series(samples: &[&FlightSample], f: impl Fn(&FlightSample) -> f64) -> Vec<[f64; 2]> {
    samples.iter().map(|s| [s.time, f(s)]).collect()
}

impl eframe::App for FlightViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let Some(flight) = self.flights.get(self.selected) else {
            egui::CentralPanel::default().show(ctx, |ui| ui.label("No flights to show"));
            return;
        };
        let step = (flight.samples.len() / 2000).max(1);
        let sampled: Vec<&FlightSample> = flight.samples.iter().step_by(step).collect();

        let mut selected = self.selected;
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for (i, f) in self.flights.iter().enumerate() {
                    ui.selectable_value(&mut selected, i, f.name.as_str());
                }
            });
            let apogee = flight.apogee().map_or(0.0, |s| s.position.y);
            ui.label(format!(
                "Apogee: {:.1} m  |  Max speed: {:.1} m/s  |  Events: {}  |  Flight: {:.1} s{}",
                apogee,
                flight.max_speed(),
                flight.events.len(),
                flight.duration(),
                if flight.faulted_at.is_some() { "  |  FAULTED" } else { "" },
            ));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let half_w = available.x / 2.0 - 8.0;
            let half_h = available.y / 2.0 - 8.0;

            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label("Altitude (m)");
                    let points = time_series(&sampled, |s| s.position.y);
                    Plot::new("altitude")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Altitude", points));
                        });
                });

                ui.vertical(|ui| {
                    ui.label("Speed (m/s)");
                    let points = time_series(&sampled, |s| s.speed);
                    Plot::new("speed")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Speed", points));
                        });
                });
            });

            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label("Nose elevation / angle of attack (deg)");
                    let elevation = time_series(&sampled, |s| s.elevation.to_degrees());
                    let alpha = time_series(&sampled, |s| s.alpha.to_degrees());
                    Plot::new("attitude")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Elevation", elevation));
                            plot_ui.line(Line::new("Alpha", alpha));
                        });
                });

                ui.vertical(|ui| {
                    ui.label("Ground track (m)");
                    let points: PlotPoints = sampled.iter().map(|s| [s.position.x, s.position.z]).collect();
                    Plot::new("ground_track")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("X (m)")
                        .y_axis_label("Z (m)")
                        .data_aspect(1.0)
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Track", points));
                        });
                });
            });
        });
        self.selected = selected;
    }
}
