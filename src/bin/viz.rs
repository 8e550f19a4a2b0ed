use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};
use nalgebra::Vector3;

use pid_twiddle::sim::{self, CostModel, LanePlant, SessionLimits, SessionReport, TrialDriver};
use pid_twiddle::{Pid, Twiddle, TwiddleConfig};

fn main() -> eframe::Result {
    let config = TwiddleConfig {
        initial_gain: Vector3::new(0.2, 0.0, 3.0),
        initial_delta: Vector3::new(0.05, 0.001, 0.5),
        tolerance: 0.005,
        steps_per_trial: 200,
    };
    let cost = CostModel { speed_weight: 0.0, ..CostModel::default() };
    let mut driver = TrialDriver::new(Pid::default(), cost).with_tuner(Twiddle::new(&config));
    let mut plant = LanePlant::default();
    let limits = SessionLimits { max_trials: 600, samples: 0 };
    let report = sim::run_session(&mut driver, &mut plant, &limits);

    let app = TuneViz { report };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("Twiddle Gain Tuning", options, Box::new(|_| Ok(Box::new(app))))
}

struct TuneViz {
    report: SessionReport,
}

impl eframe::App for TuneViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let history = &self.report.history;

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading(format!("Plant: {}", self.report.plant));
            let g = self.report.best_gain;
            ui.label(format!(
                "Outcome: {}  |  Trials: {}  |  Best cost: {:.3}  |  kp {:.4}  ki {:.5}  kd {:.4}",
                self.report.outcome.as_str(),
                self.report.trials,
                self.report.best_cost,
                g[0],
                g[1],
                g[2],
            ));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let half_w = available.x / 2.0 - 8.0;
            let full_h = available.y - 24.0;

            ui.horizontal(|ui| {
                // Trial cost vs best cost
                ui.vertical(|ui| {
                    ui.label("Cost per trial");
                    let cost: PlotPoints =
                        history.iter().map(|r| [r.trial as f64, r.cost]).collect();
                    let best: PlotPoints =
                        history.iter().map(|r| [r.trial as f64, r.best_cost]).collect();
                    Plot::new("cost")
                        .width(half_w)
                        .height(full_h)
                        .x_axis_label("Trial")
                        .legend(Legend::default())
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Trial cost", cost));
                            plot_ui.line(Line::new("Best cost", best));
                        });
                });

                // Gains vs trial
                ui.vertical(|ui| {
                    ui.label("Gains");
                    Plot::new("gains")
                        .width(half_w)
                        .height(full_h)
                        .x_axis_label("Trial")
                        .legend(Legend::default())
                        .show(ui, |plot_ui| {
                            for (i, name) in ["kp", "ki", "kd"].into_iter().enumerate() {
                                let points: PlotPoints =
                                    history.iter().map(|r| [r.trial as f64, r.gain[i]]).collect();
                                plot_ui.line(Line::new(name, points));
                            }
                        });
                });
            });
        });
    }
}
