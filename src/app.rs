/// Main application state and eframe::App implementation
///
/// Owns the session state and the command history, and is the single
/// command-issuing context: every state-changing user action validates its
/// preconditions here, constructs one command, and hands it to the history.
/// The engine itself never re-validates.

use eframe::egui;

use crate::config::Config;
use crate::data::reader;
use crate::data::spectrum::BaselineStage;
use crate::engine::baseline;
use crate::engine::command::{
    Command, CorrectBaseline, CropSpectrum, DragControlPoint, EstimateBaseline, LoadSpectrum,
    SessionState, SmoothSpectrum,
};
use crate::engine::history::CommandHistory;
use crate::engine::peaks::{self, PeakFilter};
use crate::engine::transforms;
use crate::gui::plot_view::{self, PlotAction, PlotViewState};
use crate::gui::toolbar::{self, ToolbarAction};
use crate::gui::log_panel;

/// Free-text peak filter fields; empty means unfiltered.
#[derive(Debug, Default)]
struct PeakFilterInput {
    width: String,
    height: String,
    prominence: String,
    rel_height: String,
}

impl PeakFilterInput {
    fn to_filter(&self) -> PeakFilter {
        PeakFilter {
            width: parse_optional(&self.width),
            height: parse_optional(&self.height),
            prominence: parse_optional(&self.prominence),
            rel_height: parse_optional(&self.rel_height),
        }
    }
}

fn parse_optional(field: &str) -> Option<f64> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        None
    } else {
        trimmed.parse().ok()
    }
}

/// The main application
pub struct RamanApp {
    state: SessionState,
    history: CommandHistory,
    config: Config,

    plot_view: PlotViewState,
    peak_input: PeakFilterInput,

    status_message: String,
    show_about: bool,
}

impl RamanApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let config = Config::load_or_default(&Config::default_path());
        Self {
            state: SessionState::default(),
            history: CommandHistory::new(),
            config,
            plot_view: PlotViewState::default(),
            peak_input: PeakFilterInput::default(),
            status_message: "Ready — open a spectrum file to begin".to_string(),
            show_about: false,
        }
    }

    // =====================================================================
    //  Actions
    // =====================================================================

    fn open_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Spectrum files", &["txt", "csv"])
            .pick_file()
        else {
            return;
        };

        match reader::read_spectrum(&path) {
            Ok(spectrum) => {
                self.plot_view.leave_crop_mode();
                self.history.execute(
                    Command::Load(LoadSpectrum::new(&self.state, spectrum, path.clone())),
                    &mut self.state,
                );
                self.status_message = format!("Loaded {}", path.display());
            }
            Err(e) => {
                log::error!("Failed to read {}: {}", path.display(), e);
                self.status_message = format!("Could not read {}: {}", path.display(), e);
            }
        }
    }

    fn export_data(&mut self) {
        let Some(spectrum) = self.state.spectrum.clone() else {
            self.status_message = "Nothing to export — no spectrum loaded".to_string();
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Text", &["txt"])
            .set_file_name("spectrum.txt")
            .save_file()
        else {
            return;
        };
        match reader::write_two_column(&path, &spectrum) {
            Ok(()) => self.status_message = format!("Exported {}", path.display()),
            Err(e) => {
                log::error!("Export failed: {}", e);
                self.status_message = format!("Export failed: {}", e);
            }
        }
    }

    fn export_log(&mut self, json: bool) {
        let (ext, name) = if json {
            ("json", "session-log.json")
        } else {
            ("txt", "session-log.txt")
        };
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Log", &[ext])
            .set_file_name(name)
            .save_file()
        else {
            return;
        };
        let result = if json {
            self.state.log.save_json(&path)
        } else {
            self.state.log.save_text(&path)
        };
        match result {
            Ok(()) => self.status_message = format!("Log saved to {}", path.display()),
            Err(e) => {
                log::error!("Log export failed: {}", e);
                self.status_message = format!("Log export failed: {}", e);
            }
        }
    }

    /// One button, two operations: estimate when no baseline is pending,
    /// apply the correction when one is.
    fn baseline_action(&mut self) {
        let Some(spectrum) = &self.state.spectrum else {
            self.status_message = "Load a spectrum first".to_string();
            return;
        };

        // The stored estimate must still line up with the current grid;
        // grid-changing edits reset the stage, this re-checks before the
        // subtraction runs.
        let aligned = self
            .state
            .baseline
            .continuous
            .as_ref()
            .is_some_and(|b| b.len() == spectrum.len());
        if self.state.stage == BaselineStage::Estimated && aligned {
            self.history.execute(
                Command::CorrectBaseline(CorrectBaseline::new(&self.state)),
                &mut self.state,
            );
            self.status_message = "Baseline corrected".to_string();
        } else {
            let estimate = baseline::baseline_als(&spectrum.y, &self.config.als);
            debug_assert_eq!(estimate.len(), spectrum.len());
            self.history.execute(
                Command::EstimateBaseline(EstimateBaseline::new(&self.state, estimate)),
                &mut self.state,
            );
            self.status_message = "Baseline estimated".to_string();
        }
    }

    /// Sample the continuous baseline into draggable control points.
    /// Not undoable on its own; the individual drags are.
    fn discretize_action(&mut self) {
        let (Some(spectrum), Some(continuous)) =
            (&self.state.spectrum, &self.state.baseline.continuous)
        else {
            self.status_message = "Estimate a baseline before discretizing".to_string();
            return;
        };
        if spectrum.len() < 2 {
            return;
        }

        let points = transforms::discretize_baseline(
            &spectrum.x,
            continuous,
            self.config.discretize_step,
        );
        self.state.scene.plot_control_points(&points);
        self.state.baseline.control_points = Some(points);
        self.state.log.add("Baseline discretized for editing");
        self.status_message = "Drag the control points to reshape the baseline".to_string();
    }

    fn apply_crop(&mut self) {
        let Some((lo, hi)) = self.plot_view.crop_region else {
            self.status_message = "Drag across the plot to select a crop range".to_string();
            return;
        };
        if self.state.spectrum.is_none() {
            return;
        }
        self.history.execute(
            Command::Crop(CropSpectrum::new(&self.state, lo, hi)),
            &mut self.state,
        );
        self.plot_view.leave_crop_mode();
        self.status_message = "Cropped".to_string();
    }

    fn smooth_action(&mut self) {
        if self.state.spectrum.is_none() {
            self.status_message = "Load a spectrum first".to_string();
            return;
        }
        self.history.execute(
            Command::Smooth(SmoothSpectrum::new(&self.state)),
            &mut self.state,
        );
        self.status_message = "Smoothing applied".to_string();
    }

    /// Toggle the peak overlay. Visibility is read off the scene itself, so
    /// a command that redraws (and thereby clears the markers) also resets
    /// the toggle.
    fn find_peaks_action(&mut self) {
        if !self.state.scene.peaks.is_empty() {
            self.state.scene.peaks.clear();
            self.state.scene.show_peak_labels = false;
            return;
        }
        let Some(spectrum) = &self.state.spectrum else {
            self.status_message = "Load a spectrum first".to_string();
            return;
        };

        let (vx, vy) = spectrum.valid_samples();
        let found = peaks::find_peaks(&vx, &vy, &self.peak_input.to_filter());
        self.status_message = format!("{} peaks matched", found.len());
        self.state.scene.peaks = found;
    }

    /// Live update while a control point is being dragged: one O(n)
    /// re-interpolation per pointer move, no command yet.
    fn live_drag_update(&mut self, index: usize, x: f64, y: f64) {
        let Some(points) = self.state.baseline.control_points.as_mut() else {
            return;
        };
        if index >= points.len() {
            return;
        }
        points.x[index] = x;
        points.y[index] = y;

        if let Some(spectrum) = &self.state.spectrum {
            let continuous = transforms::interpolate_control_points(points, &spectrum.x);
            let grid = spectrum.x.clone();
            self.state.scene.plot_baseline(&grid, &continuous);
            self.state.baseline.continuous = Some(continuous);
        }
        if let Some(points) = &self.state.baseline.control_points {
            self.state.scene.plot_control_points(points);
        }
    }

    fn handle_plot_action(&mut self, action: PlotAction) {
        match action {
            PlotAction::None => {}
            PlotAction::DragMoved { index, x, y } => self.live_drag_update(index, x, y),
            PlotAction::DragFinished { index, start, end } => {
                let in_range = self
                    .state
                    .baseline
                    .control_points
                    .as_ref()
                    .is_some_and(|p| index < p.len());
                if in_range {
                    self.history.execute(
                        Command::DragPoint(DragControlPoint::new(index, start, end)),
                        &mut self.state,
                    );
                }
            }
        }
    }

    fn handle_toolbar(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::None => {}
            ToolbarAction::OpenFile => self.open_file(),
            ToolbarAction::ExportData => self.export_data(),
            ToolbarAction::ExportLogText => self.export_log(false),
            ToolbarAction::ExportLogJson => self.export_log(true),
            ToolbarAction::Undo => {
                if self.history.undo(&mut self.state) {
                    self.status_message = "Undone".to_string();
                }
            }
            ToolbarAction::Redo => {
                if self.history.redo(&mut self.state) {
                    self.status_message = "Redone".to_string();
                }
            }
            ToolbarAction::ShowAbout => self.show_about = true,
        }
    }

    // =====================================================================
    //  Panels
    // =====================================================================

    fn show_side_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("controls")
            .default_width(210.0)
            .show(ctx, |ui| {
                ui.add_space(4.0);
                ui.heading("Processing");
                ui.separator();

                let has_spectrum = self.state.spectrum.is_some();

                let baseline_label = if self.state.stage == BaselineStage::Estimated {
                    "Apply baseline correction"
                } else {
                    "Estimate baseline"
                };
                if ui
                    .add_enabled(has_spectrum, egui::Button::new(baseline_label))
                    .clicked()
                {
                    self.baseline_action();
                }

                let can_discretize = self.state.baseline.is_estimated();
                if ui
                    .add_enabled(can_discretize, egui::Button::new("Discretize baseline"))
                    .clicked()
                {
                    self.discretize_action();
                }

                ui.separator();

                let crop_label = if self.plot_view.crop_mode {
                    "Apply crop"
                } else {
                    "Crop"
                };
                if ui
                    .add_enabled(has_spectrum, egui::Button::new(crop_label))
                    .clicked()
                {
                    if self.plot_view.crop_mode {
                        self.apply_crop();
                    } else {
                        self.plot_view.crop_mode = true;
                        self.status_message =
                            "Drag across the plot to select the range to crop".to_string();
                    }
                }
                if self.plot_view.crop_mode && ui.button("Cancel crop").clicked() {
                    self.plot_view.leave_crop_mode();
                }

                if ui
                    .add_enabled(has_spectrum, egui::Button::new("Smooth"))
                    .clicked()
                {
                    self.smooth_action();
                }

                ui.separator();
                ui.heading("Peaks");
                egui::Grid::new("peak_filters").num_columns(2).show(ui, |ui| {
                    ui.label("Min width");
                    ui.text_edit_singleline(&mut self.peak_input.width);
                    ui.end_row();
                    ui.label("Min height");
                    ui.text_edit_singleline(&mut self.peak_input.height);
                    ui.end_row();
                    ui.label("Min prominence");
                    ui.text_edit_singleline(&mut self.peak_input.prominence);
                    ui.end_row();
                    ui.label("Rel. height");
                    ui.text_edit_singleline(&mut self.peak_input.rel_height);
                    ui.end_row();
                });

                let peaks_visible = !self.state.scene.peaks.is_empty();
                let peaks_label = if peaks_visible {
                    "Hide peaks"
                } else {
                    "Show peaks"
                };
                if ui
                    .add_enabled(has_spectrum, egui::Button::new(peaks_label))
                    .clicked()
                {
                    self.find_peaks_action();
                }
                if peaks_visible {
                    ui.checkbox(&mut self.state.scene.show_peak_labels, "Show labels");
                }

                ui.separator();
                ui.collapsing("Settings", |ui| {
                    let mut changed = false;
                    egui::Grid::new("settings").num_columns(2).show(ui, |ui| {
                        ui.label("Point step");
                        changed |= ui
                            .add(
                                egui::DragValue::new(&mut self.config.discretize_step)
                                    .range(1.0..=1000.0)
                                    .speed(1.0),
                            )
                            .changed();
                        ui.end_row();
                        ui.label("ALS lambda");
                        changed |= ui
                            .add(
                                egui::DragValue::new(&mut self.config.als.lambda)
                                    .range(1e2..=1e9)
                                    .speed(1000.0),
                            )
                            .changed();
                        ui.end_row();
                        ui.label("ALS asymmetry");
                        changed |= ui
                            .add(
                                egui::DragValue::new(&mut self.config.als.asymmetry)
                                    .range(0.001..=0.5)
                                    .speed(0.005),
                            )
                            .changed();
                        ui.end_row();
                    });
                    if changed {
                        if let Err(e) = self.config.save(&Config::default_path()) {
                            log::warn!("Could not save config: {}", e);
                        }
                    }
                });

                ui.separator();
                if let Some(spectrum) = &self.state.spectrum {
                    ui.label(format!(
                        "{} samples ({} valid)",
                        spectrum.len(),
                        spectrum.valid_count()
                    ));
                    ui.label(format!("Stage: {}", self.state.stage));
                }
            });
    }

    fn show_about_window(&mut self, ctx: &egui::Context) {
        if !self.show_about {
            return;
        }
        egui::Window::new("About")
            .collapsible(false)
            .resizable(false)
            .open(&mut self.show_about)
            .show(ctx, |ui| {
                ui.label(format!("Raman Studio v{}", env!("CARGO_PKG_VERSION")));
                ui.label("Spectrum editing with an undoable processing history.");
            });
    }
}

impl eframe::App for RamanApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let toolbar_action =
            toolbar::show_toolbar(ctx, self.history.undo_label(), self.history.redo_label());
        self.handle_toolbar(toolbar_action);

        self.show_side_panel(ctx);

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(&self.status_message);
        });
        log_panel::show_log_panel(ctx, &self.state.log);

        let mut plot_action = PlotAction::None;
        egui::CentralPanel::default().show(ctx, |ui| {
            plot_action = plot_view::show_plot(
                ui,
                &mut self.state.scene,
                &mut self.plot_view,
                &self.config,
            );
        });
        self.handle_plot_action(plot_action);

        self.show_about_window(ctx);
    }
}
