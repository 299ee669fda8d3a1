/// Central spectrum plot — renders the scene and handles pointer
/// interaction: crop-region picking and baseline control-point dragging.

use egui_plot::{Line, Plot, PlotPoints, Points, Text, VLine};

use crate::config::Config;
use crate::engine::scene::PlotScene;

/// Interaction results the app turns into commands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlotAction {
    None,
    /// Pointer moved while holding a control point; apply the live update.
    DragMoved { index: usize, x: f64, y: f64 },
    /// A control-point drag completed.
    DragFinished {
        index: usize,
        start: (f64, f64),
        end: (f64, f64),
    },
}

#[derive(Debug, Clone, Copy)]
struct ActiveDrag {
    index: usize,
    start: (f64, f64),
    current: (f64, f64),
}

#[derive(Debug, Default)]
pub struct PlotViewState {
    /// Incremented to give the plot a fresh ID, which resets the view
    /// (auto-range).
    pub plot_generation: u32,
    /// Crop-region picking mode: dragging selects a wavenumber range.
    pub crop_mode: bool,
    pub crop_region: Option<(f64, f64)>,
    crop_anchor: Option<f64>,
    drag: Option<ActiveDrag>,
}

impl PlotViewState {
    pub fn leave_crop_mode(&mut self) {
        self.crop_mode = false;
        self.crop_region = None;
        self.crop_anchor = None;
    }
}

/// Split a series into NaN-free runs so cropped samples render as gaps.
fn nan_gapped_segments(x: &[f64], y: &[f64]) -> Vec<Vec<[f64; 2]>> {
    let mut segments = Vec::new();
    let mut current: Vec<[f64; 2]> = Vec::new();
    for (&px, &py) in x.iter().zip(y.iter()) {
        if py.is_nan() {
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
        } else {
            current.push([px, py]);
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Show the plot. The scene is mutated only through `take_auto_range`.
pub fn show_plot(
    ui: &mut egui::Ui,
    scene: &mut PlotScene,
    state: &mut PlotViewState,
    config: &Config,
) -> PlotAction {
    if scene.take_auto_range() {
        state.plot_generation = state.plot_generation.wrapping_add(1);
    }

    if scene.spectrum.is_none() {
        ui.centered_and_justified(|ui| {
            ui.heading("No spectrum loaded");
        });
        return PlotAction::None;
    }

    let editing_points = scene.control_points.is_some();
    let pan_allowed = !state.crop_mode && !editing_points;

    let plot = Plot::new(format!("spectrum_{}", state.plot_generation))
        .height(ui.available_height() - 4.0)
        .x_axis_label("Raman shift (cm⁻¹)")
        .y_axis_label("Intensity")
        .allow_drag(pan_allowed)
        .allow_zoom(true)
        .allow_scroll(true)
        .allow_boxed_zoom(pan_allowed)
        .show_grid([true, true]);

    let spectrum = scene.spectrum.clone();
    let baseline = scene.baseline.clone();
    let control_points = scene.control_points.clone();
    let peaks = scene.peaks.clone();
    let show_labels = scene.show_peak_labels;
    let crop_region = state.crop_region;
    let point_radius = config.control_point_radius;

    let plot_resp = plot.show(ui, |plot_ui| {
        if let Some(series) = &spectrum {
            for segment in nan_gapped_segments(&series.x, &series.y) {
                let line = Line::new(PlotPoints::from(segment))
                    .color(egui::Color32::BLACK)
                    .width(2.0);
                plot_ui.line(line);
            }
        }

        if let Some(series) = &baseline {
            let color = if editing_points {
                egui::Color32::DARK_GREEN
            } else {
                egui::Color32::RED
            };
            for segment in nan_gapped_segments(&series.x, &series.y) {
                let line = Line::new(PlotPoints::from(segment)).color(color).width(2.0);
                plot_ui.line(line);
            }
        }

        if let Some(points) = &control_points {
            // Connecting segments between neighbors.
            let pts: Vec<[f64; 2]> = points
                .x
                .iter()
                .zip(points.y.iter())
                .map(|(&px, &py)| [px, py])
                .collect();
            plot_ui.line(
                Line::new(PlotPoints::from(pts.clone()))
                    .color(egui::Color32::RED)
                    .width(1.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(pts))
                    .color(egui::Color32::from_rgb(0xD4, 0x3F, 0x00))
                    .radius(point_radius)
                    .shape(egui_plot::MarkerShape::Circle),
            );
        }

        if !peaks.is_empty() {
            let marker_pts: Vec<[f64; 2]> = peaks.iter().map(|p| [p.x, p.y]).collect();
            plot_ui.points(
                Points::new(PlotPoints::from(marker_pts))
                    .color(egui::Color32::BLUE)
                    .radius(3.0)
                    .shape(egui_plot::MarkerShape::Down),
            );
            if show_labels {
                for peak in &peaks {
                    let label = Text::new(
                        [peak.x, peak.y * 1.04].into(),
                        egui::RichText::new(format!("{:.0}", peak.x)).size(10.0),
                    )
                    .anchor(egui::Align2::CENTER_BOTTOM);
                    plot_ui.text(label);
                }
            }
        }

        if let Some((lo, hi)) = crop_region {
            plot_ui.vline(VLine::new(lo).color(egui::Color32::LIGHT_BLUE));
            plot_ui.vline(VLine::new(hi).color(egui::Color32::LIGHT_BLUE));
        }
    });

    // ── Crop-region picking ──
    if state.crop_mode {
        let response = &plot_resp.response;
        if let Some(pos) = response.interact_pointer_pos() {
            let coord = plot_resp.transform.value_from_position(pos);
            if response.drag_started() {
                state.crop_anchor = Some(coord.x);
            }
            if response.dragged() || response.drag_stopped() {
                if let Some(anchor) = state.crop_anchor {
                    state.crop_region = Some((anchor.min(coord.x), anchor.max(coord.x)));
                }
            }
        }
        return PlotAction::None;
    }

    // ── Control-point dragging ──
    if let Some(points) = &control_points {
        let response = &plot_resp.response;

        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                let mut best: Option<(usize, f32)> = None;
                for (i, (&px, &py)) in points.x.iter().zip(points.y.iter()).enumerate() {
                    let screen = plot_resp
                        .transform
                        .position_from_point(&egui_plot::PlotPoint::new(px, py));
                    let dist = screen.distance(pos);
                    if dist <= config.pick_radius && best.map_or(true, |(_, d)| dist < d) {
                        best = Some((i, dist));
                    }
                }
                if let Some((index, _)) = best {
                    state.drag = Some(ActiveDrag {
                        index,
                        start: (points.x[index], points.y[index]),
                        current: (points.x[index], points.y[index]),
                    });
                }
            }
        }

        if let Some(drag) = state.drag.as_mut() {
            if response.dragged() {
                if let Some(pos) = response.interact_pointer_pos() {
                    let coord = plot_resp.transform.value_from_position(pos);
                    // Clamp x between the neighboring points so the
                    // control points stay ordered.
                    let eps = 1e-9;
                    let lo = drag
                        .index
                        .checked_sub(1)
                        .map_or(f64::NEG_INFINITY, |i| points.x[i] + eps);
                    let hi = points
                        .x
                        .get(drag.index + 1)
                        .map_or(f64::INFINITY, |&v| v - eps);
                    let x = coord.x.clamp(lo, hi);
                    drag.current = (x, coord.y);
                    return PlotAction::DragMoved {
                        index: drag.index,
                        x,
                        y: coord.y,
                    };
                }
            }

            if response.drag_stopped() {
                let finished = *drag;
                state.drag = None;
                return PlotAction::DragFinished {
                    index: finished.index,
                    start: finished.start,
                    end: finished.current,
                };
            }
        }
    }

    PlotAction::None
}
