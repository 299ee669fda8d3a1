/// Reversible edit commands
///
/// Each command variant captures, at construction time, everything it needs
/// to replay its forward effect and to reverse it exactly: snapshots are
/// independent copies taken before any mutation, so a later edit can never
/// corrupt a stored undo state. `apply`/`reverse` are pure replays over the
/// explicit `SessionState`; preconditions (spectrum loaded, stage machine,
/// index in range, matching lengths) are the caller's responsibility.

use std::path::PathBuf;

use crate::data::spectrum::{BaselineModel, BaselineStage, Spectrum};
use crate::engine::scene::PlotScene;
use crate::engine::transforms;
use crate::log::session::{LogEntry, SessionLog};

/// Smoothing window length; valid samples below this count make the smooth
/// command a logged no-op.
pub const SMOOTH_WINDOW: usize = 11;
/// Smoothing polynomial order (capped at window − 1).
pub const SMOOTH_POLYORDER: usize = 3;

/// The mutable application state every command runs against. Spectrum and
/// baseline are exclusively owned here; commands receive it by `&mut` and
/// declare through their snapshots exactly which fields they touch.
#[derive(Debug, Default)]
pub struct SessionState {
    pub spectrum: Option<Spectrum>,
    pub baseline: BaselineModel,
    pub stage: BaselineStage,
    pub log: SessionLog,
    pub scene: PlotScene,
    pub source_path: Option<PathBuf>,
}

impl SessionState {
    /// Redraw the spectrum from scratch: clear the surface and plot the
    /// current curve, if any.
    fn redraw_spectrum(&mut self) {
        self.scene.clear();
        if let Some(spectrum) = &self.spectrum {
            self.scene.plot_spectrum(spectrum);
        }
    }
}

/// One reversible unit of work.
#[derive(Debug)]
pub enum Command {
    Load(LoadSpectrum),
    Crop(CropSpectrum),
    EstimateBaseline(EstimateBaseline),
    CorrectBaseline(CorrectBaseline),
    Smooth(SmoothSpectrum),
    DragPoint(DragControlPoint),
}

impl Command {
    pub fn apply(&mut self, state: &mut SessionState) {
        match self {
            Command::Load(c) => c.apply(state),
            Command::Crop(c) => c.apply(state),
            Command::EstimateBaseline(c) => c.apply(state),
            Command::CorrectBaseline(c) => c.apply(state),
            Command::Smooth(c) => c.apply(state),
            Command::DragPoint(c) => c.apply(state),
        }
    }

    pub fn reverse(&mut self, state: &mut SessionState) {
        match self {
            Command::Load(c) => c.reverse(state),
            Command::Crop(c) => c.reverse(state),
            Command::EstimateBaseline(c) => c.reverse(state),
            Command::CorrectBaseline(c) => c.reverse(state),
            Command::Smooth(c) => c.reverse(state),
            Command::DragPoint(c) => c.reverse(state),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Command::Load(_) => "Load spectrum",
            Command::Crop(_) => "Crop",
            Command::EstimateBaseline(_) => "Estimate baseline",
            Command::CorrectBaseline(_) => "Correct baseline",
            Command::Smooth(_) => "Smooth",
            Command::DragPoint(_) => "Drag baseline point",
        }
    }
}

// =========================================================================
//  Load
// =========================================================================

/// Replace the current spectrum with freshly read data. Clears the baseline
/// model, the stage and the session transcript; the prior spectrum,
/// baseline model, stage and transcript are all restored on undo, so
/// unwinding a whole session lands back on the exact pre-load state.
#[derive(Debug)]
pub struct LoadSpectrum {
    new_spectrum: Spectrum,
    source: PathBuf,
    old_spectrum: Option<Spectrum>,
    old_source: Option<PathBuf>,
    old_baseline: BaselineModel,
    old_stage: BaselineStage,
    old_log: Vec<LogEntry>,
}

impl LoadSpectrum {
    pub fn new(state: &SessionState, spectrum: Spectrum, source: PathBuf) -> Self {
        Self {
            new_spectrum: spectrum,
            source,
            old_spectrum: state.spectrum.clone(),
            old_source: state.source_path.clone(),
            old_baseline: state.baseline.clone(),
            old_stage: state.stage,
            old_log: state.log.snapshot(),
        }
    }

    fn apply(&mut self, state: &mut SessionState) {
        state.spectrum = Some(self.new_spectrum.clone());
        state.source_path = Some(self.source.clone());
        state.baseline.clear();
        state.stage = BaselineStage::Unestimated;

        state.log.clear();
        state.log.set_source(&self.source.display().to_string());
        state.log.add(format!("Loaded file: {}", self.source.display()));

        state.redraw_spectrum();
        state.scene.request_auto_range();
    }

    fn reverse(&mut self, state: &mut SessionState) {
        state.spectrum = self.old_spectrum.clone();
        state.source_path = self.old_source.clone();
        state.baseline = self.old_baseline.clone();
        state.stage = self.old_stage;
        state.log.restore(self.old_log.clone());

        state.redraw_spectrum();
        if let (Some(spectrum), Some(baseline)) =
            (&state.spectrum, &self.old_baseline.continuous)
        {
            let x = spectrum.x.clone();
            state.scene.plot_baseline(&x, baseline);
        }
        if let Some(points) = &self.old_baseline.control_points {
            state.scene.plot_control_points(points);
        }
        state.scene.request_auto_range();
    }
}

// =========================================================================
//  Crop
// =========================================================================

/// Mark every sample inside `[start_x, end_x]` as excluded (`NaN`). The
/// cropped spectrum is computed once in the constructor so forward and redo
/// replay the identical value.
#[derive(Debug)]
pub struct CropSpectrum {
    start_x: f64,
    end_x: f64,
    old_spectrum: Spectrum,
    new_spectrum: Spectrum,
}

impl CropSpectrum {
    /// Precondition: a spectrum is loaded.
    pub fn new(state: &SessionState, start_x: f64, end_x: f64) -> Self {
        let old = state
            .spectrum
            .clone()
            .unwrap_or_else(|| Spectrum::new(Vec::new(), Vec::new()));
        let new = transforms::crop_to_nan(&old, start_x, end_x);
        Self {
            start_x,
            end_x,
            old_spectrum: old,
            new_spectrum: new,
        }
    }

    fn apply(&mut self, state: &mut SessionState) {
        state.spectrum = Some(self.new_spectrum.clone());
        state.stage = BaselineStage::Unestimated;
        state.log.add(format!(
            "Cropped spectrum from {:.0} to {:.0} cm⁻¹",
            self.start_x, self.end_x
        ));
        state.redraw_spectrum();
    }

    fn reverse(&mut self, state: &mut SessionState) {
        state.spectrum = Some(self.old_spectrum.clone());
        state.stage = BaselineStage::Unestimated;
        state.log.add("Crop undone");
        state.redraw_spectrum();
    }
}

// =========================================================================
//  Estimate baseline
// =========================================================================

/// Store an externally computed baseline estimate as the continuous
/// baseline. The estimator runs before the command is constructed; the
/// command only stores and replays its output.
#[derive(Debug)]
pub struct EstimateBaseline {
    new_baseline: Vec<f64>,
    old_baseline: Option<Vec<f64>>,
}

impl EstimateBaseline {
    /// Preconditions: a spectrum is loaded and `computed` has the same
    /// length as its grid.
    pub fn new(state: &SessionState, computed: Vec<f64>) -> Self {
        Self {
            new_baseline: computed,
            old_baseline: state.baseline.continuous.clone(),
        }
    }

    fn apply(&mut self, state: &mut SessionState) {
        state.baseline.continuous = Some(self.new_baseline.clone());
        state.stage = BaselineStage::Estimated;
        state.log.add("Baseline estimate computed");

        if let Some(spectrum) = &state.spectrum {
            let x = spectrum.x.clone();
            state.scene.plot_baseline(&x, &self.new_baseline);
        }
    }

    fn reverse(&mut self, state: &mut SessionState) {
        state.baseline.continuous = self.old_baseline.clone();
        state.stage = BaselineStage::Unestimated;
        state.log.add("Baseline estimate undone");

        match (&state.spectrum, &self.old_baseline) {
            (Some(spectrum), Some(old)) => {
                let x = spectrum.x.clone();
                state.scene.plot_baseline(&x, old);
            }
            _ => state.scene.remove_baseline(),
        }
    }
}

// =========================================================================
//  Correct baseline
// =========================================================================

/// Subtract the continuous baseline from the spectrum. The corrected
/// spectrum is computed in the constructor; undo restores the original
/// values rather than adding the baseline back, so there is no floating
/// point drift.
#[derive(Debug)]
pub struct CorrectBaseline {
    old_spectrum: Spectrum,
    old_baseline: BaselineModel,
    new_spectrum: Spectrum,
}

impl CorrectBaseline {
    /// Preconditions: stage is `Estimated` and the continuous baseline is
    /// aligned to the loaded spectrum.
    pub fn new(state: &SessionState) -> Self {
        let old = state
            .spectrum
            .clone()
            .unwrap_or_else(|| Spectrum::new(Vec::new(), Vec::new()));
        let new_y = match &state.baseline.continuous {
            Some(baseline) => transforms::subtract_baseline(&old.y, baseline),
            None => old.y.clone(),
        };
        Self {
            new_spectrum: Spectrum::new(old.x.clone(), new_y),
            old_spectrum: old,
            old_baseline: state.baseline.clone(),
        }
    }

    fn apply(&mut self, state: &mut SessionState) {
        state.spectrum = Some(self.new_spectrum.clone());
        state.baseline.clear();
        state.stage = BaselineStage::Unestimated;
        state.log.add("Baseline corrected");

        state.redraw_spectrum();
        state.scene.request_auto_range();
    }

    fn reverse(&mut self, state: &mut SessionState) {
        state.spectrum = Some(self.old_spectrum.clone());
        state.baseline = self.old_baseline.clone();
        state.stage = BaselineStage::Estimated;
        state.log.add("Baseline restored");

        state.redraw_spectrum();
        if let Some(baseline) = &self.old_baseline.continuous {
            let x = self.old_spectrum.x.clone();
            state.scene.plot_baseline(&x, baseline);
        }
        if let Some(points) = &self.old_baseline.control_points {
            state.scene.plot_control_points(points);
        }
        state.scene.request_auto_range();
    }
}

// =========================================================================
//  Smooth
// =========================================================================

/// Savitzky-Golay smoothing of the valid (non-`NaN`) samples. With fewer
/// than `SMOOTH_WINDOW` valid samples the command is a no-op that emits a
/// single diagnostic line. Cropped samples are dropped from the result, not
/// masked — the excluded-sample representation is intentionally asymmetric
/// with Crop here.
///
/// Dropping samples changes the grid, so any previously estimated baseline
/// no longer lines up with the spectrum; a successful smooth therefore
/// resets the stage to `Unestimated` and the next baseline action
/// re-estimates instead of subtracting a misaligned vector.
#[derive(Debug)]
pub struct SmoothSpectrum {
    old_spectrum: Spectrum,
    old_stage: BaselineStage,
}

impl SmoothSpectrum {
    /// Precondition: a spectrum is loaded.
    pub fn new(state: &SessionState) -> Self {
        Self {
            old_spectrum: state
                .spectrum
                .clone()
                .unwrap_or_else(|| Spectrum::new(Vec::new(), Vec::new())),
            old_stage: state.stage,
        }
    }

    fn apply(&mut self, state: &mut SessionState) {
        let (valid_x, valid_y) = self.old_spectrum.valid_samples();

        if valid_y.len() < SMOOTH_WINDOW {
            state
                .log
                .add("Not enough valid samples for smoothing — skipped");
            return;
        }

        let window = SMOOTH_WINDOW.min(valid_y.len());
        let polyorder = SMOOTH_POLYORDER.min(window - 1);
        let smoothed = transforms::savgol_filter(&valid_y, window, polyorder);

        state.spectrum = Some(Spectrum::new(valid_x, smoothed));
        state.stage = BaselineStage::Unestimated;
        state.log.add("Smoothing applied");
        state.redraw_spectrum();
        state.scene.request_auto_range();
    }

    fn reverse(&mut self, state: &mut SessionState) {
        state.spectrum = Some(self.old_spectrum.clone());
        state.stage = self.old_stage;
        state.log.add("Smoothing undone");
        state.redraw_spectrum();
        state.scene.request_auto_range();
    }
}

// =========================================================================
//  Drag control point
// =========================================================================

/// Move one baseline control point and re-derive the continuous baseline by
/// linear interpolation onto the spectrum grid. One command per completed
/// drag; live pointer moves update the state directly and the final command
/// replays the end position.
#[derive(Debug)]
pub struct DragControlPoint {
    index: usize,
    start: (f64, f64),
    end: (f64, f64),
}

impl DragControlPoint {
    /// Preconditions: control points exist and `index` is in range.
    pub fn new(index: usize, start: (f64, f64), end: (f64, f64)) -> Self {
        Self { index, start, end }
    }

    fn set_point(&self, state: &mut SessionState, point: (f64, f64)) {
        let Some(points) = state.baseline.control_points.as_mut() else {
            return;
        };
        points.x[self.index] = point.0;
        points.y[self.index] = point.1;

        if let Some(spectrum) = &state.spectrum {
            let continuous = transforms::interpolate_control_points(points, &spectrum.x);
            let x = spectrum.x.clone();
            state.scene.plot_baseline(&x, &continuous);
            state.baseline.continuous = Some(continuous);
        }
        if let Some(points) = &state.baseline.control_points {
            state.scene.plot_control_points(points);
        }
    }

    fn apply(&mut self, state: &mut SessionState) {
        self.set_point(state, self.end);
    }

    fn reverse(&mut self, state: &mut SessionState) {
        self.set_point(state, self.start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::spectrum::ControlPoints;
    use crate::engine::history::CommandHistory;

    fn flat_state(n: usize, value: f64) -> SessionState {
        let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let y = vec![value; n];
        SessionState {
            spectrum: Some(Spectrum::new(x, y)),
            ..Default::default()
        }
    }

    #[test]
    fn test_crop_keeps_length_and_marks_nan() {
        let mut state = flat_state(10, 5.0);
        let mut history = CommandHistory::new();
        history.execute(
            Command::Crop(CropSpectrum::new(&state, 2.0, 4.0)),
            &mut state,
        );

        let spectrum = state.spectrum.as_ref().unwrap();
        assert_eq!(spectrum.len(), 10);
        assert_eq!(spectrum.valid_count(), 7);
        assert!(spectrum.y[2].is_nan());
        assert!(spectrum.y[4].is_nan());
        assert!(!spectrum.y[5].is_nan());
    }

    #[test]
    fn test_smooth_below_minimum_is_noop_with_one_diagnostic() {
        let mut state = flat_state(20, 5.0);
        let mut history = CommandHistory::new();
        // Crop away all but 8 samples.
        history.execute(
            Command::Crop(CropSpectrum::new(&state, 0.0, 11.0)),
            &mut state,
        );
        let before = state.spectrum.clone();
        let log_len = state.log.len();

        state.stage = BaselineStage::Estimated;
        history.execute(Command::Smooth(SmoothSpectrum::new(&state)), &mut state);

        assert_eq!(state.spectrum, before);
        // The no-op leaves the stage alone: nothing about the grid changed.
        assert_eq!(state.stage, BaselineStage::Estimated);
        assert_eq!(state.log.len(), log_len + 1);
        assert!(state
            .log
            .entries
            .last()
            .unwrap()
            .message
            .contains("Not enough valid samples"));
    }

    #[test]
    fn test_smooth_resets_stage_so_correction_reestimates() {
        // Crop, estimate, smooth: smoothing drops the excluded samples, so
        // the stored 30-sample estimate no longer matches the 25-sample
        // spectrum. The stage must fall back so the next baseline action
        // computes a fresh estimate instead of subtracting the stale one.
        let mut state = flat_state(30, 5.0);
        let mut history = CommandHistory::new();
        history.execute(
            Command::Crop(CropSpectrum::new(&state, 3.0, 7.0)),
            &mut state,
        );
        let estimate: Vec<f64> = state
            .spectrum
            .as_ref()
            .unwrap()
            .y
            .iter()
            .map(|&v| if v.is_nan() { f64::NAN } else { 5.0 })
            .collect();
        history.execute(
            Command::EstimateBaseline(EstimateBaseline::new(&state, estimate)),
            &mut state,
        );
        assert_eq!(state.stage, BaselineStage::Estimated);

        history.execute(Command::Smooth(SmoothSpectrum::new(&state)), &mut state);
        assert_eq!(state.stage, BaselineStage::Unestimated);

        // A fresh estimate on the new grid corrects cleanly.
        let n = state.spectrum.as_ref().unwrap().len();
        history.execute(
            Command::EstimateBaseline(EstimateBaseline::new(&state, vec![5.0; n])),
            &mut state,
        );
        history.execute(
            Command::CorrectBaseline(CorrectBaseline::new(&state)),
            &mut state,
        );
        let corrected = state.spectrum.as_ref().unwrap();
        assert_eq!(corrected.len(), 25);
        // The smoothed values went through a float polynomial fit, so allow
        // rounding noise around zero.
        assert!(corrected.y.iter().all(|&v| v.abs() < 1e-9));

        // Unwinding back past the smooth restores the pre-smooth stage.
        history.undo(&mut state);
        history.undo(&mut state);
        history.undo(&mut state);
        assert_eq!(state.stage, BaselineStage::Estimated);
    }

    #[test]
    fn test_smooth_drops_cropped_samples() {
        let mut state = flat_state(30, 5.0);
        let mut history = CommandHistory::new();
        history.execute(
            Command::Crop(CropSpectrum::new(&state, 3.0, 7.0)),
            &mut state,
        );
        history.execute(Command::Smooth(SmoothSpectrum::new(&state)), &mut state);

        let spectrum = state.spectrum.as_ref().unwrap();
        // 30 − 5 cropped samples; the NaN positions are gone, not masked.
        assert_eq!(spectrum.len(), 25);
        assert_eq!(spectrum.valid_count(), 25);
        assert!(!spectrum.x.contains(&4.0));
    }

    #[test]
    fn test_correct_then_undo_restores_bit_for_bit() {
        let mut state = flat_state(12, 5.0);
        state.baseline.continuous = Some(vec![1.25; 12]);
        state.stage = BaselineStage::Estimated;
        let spectrum_before = state.spectrum.clone();
        let baseline_before = state.baseline.clone();

        let mut history = CommandHistory::new();
        history.execute(
            Command::CorrectBaseline(CorrectBaseline::new(&state)),
            &mut state,
        );
        assert!(state.baseline.continuous.is_none());
        assert_eq!(state.stage, BaselineStage::Unestimated);
        let corrected = state.spectrum.as_ref().unwrap();
        assert!(corrected.y.iter().all(|&v| v == 3.75));

        history.undo(&mut state);
        assert_eq!(state.spectrum, spectrum_before);
        assert_eq!(state.baseline, baseline_before);
        assert_eq!(state.stage, BaselineStage::Estimated);
    }

    #[test]
    fn test_drag_changes_only_neighborhood_and_undoes_exactly() {
        let mut state = flat_state(101, 2.0);
        state.baseline.continuous = Some(vec![0.2; 101]);
        state.baseline.control_points = Some(ControlPoints {
            x: vec![0.0, 25.0, 50.0, 75.0, 100.0],
            y: vec![0.2; 5],
        });
        state.stage = BaselineStage::Estimated;

        // Derive the continuous baseline from the points first so the
        // pre-drag state is self-consistent.
        let grid = state.spectrum.as_ref().unwrap().x.clone();
        let continuous = transforms::interpolate_control_points(
            state.baseline.control_points.as_ref().unwrap(),
            &grid,
        );
        state.baseline.continuous = Some(continuous.clone());

        let mut history = CommandHistory::new();
        history.execute(
            Command::DragPoint(DragControlPoint::new(2, (50.0, 0.2), (50.0, 0.5))),
            &mut state,
        );

        let after = state.baseline.continuous.as_ref().unwrap();
        // Outside the segment between neighbors 1 and 3, nothing moved.
        for i in 0..=25 {
            assert_eq!(after[i], continuous[i], "index {i} changed");
        }
        for i in 75..=100 {
            assert_eq!(after[i], continuous[i], "index {i} changed");
        }
        // At the dragged point the baseline follows the new value.
        assert!((after[50] - 0.5).abs() < 1e-12);

        history.undo(&mut state);
        assert_eq!(state.baseline.continuous.as_ref().unwrap(), &continuous);
        let points = state.baseline.control_points.as_ref().unwrap();
        assert_eq!(points.y[2], 0.2);
    }

    #[test]
    fn test_load_restores_prior_log_transcript() {
        let mut state = SessionState::default();
        state.log.add("pre-existing line");
        let mut history = CommandHistory::new();

        let spectrum = Spectrum::new(vec![0.0, 1.0], vec![1.0, 2.0]);
        history.execute(
            Command::Load(LoadSpectrum::new(
                &state,
                spectrum,
                PathBuf::from("sample.txt"),
            )),
            &mut state,
        );
        assert_eq!(state.log.len(), 1);
        assert!(state.log.entries[0].message.contains("sample.txt"));

        history.undo(&mut state);
        assert_eq!(state.log.len(), 1);
        assert_eq!(state.log.entries[0].message, "pre-existing line");
        assert!(state.spectrum.is_none());
    }

    #[test]
    fn test_load_undo_restores_baseline_model_and_stage() {
        let mut state = flat_state(12, 5.0);
        let mut history = CommandHistory::new();
        history.execute(
            Command::EstimateBaseline(EstimateBaseline::new(&state, vec![5.0; 12])),
            &mut state,
        );
        let baseline_before = state.baseline.clone();
        assert_eq!(state.stage, BaselineStage::Estimated);

        history.execute(
            Command::Load(LoadSpectrum::new(
                &state,
                Spectrum::new(vec![0.0, 1.0], vec![1.0, 2.0]),
                PathBuf::from("next.txt"),
            )),
            &mut state,
        );
        assert!(state.baseline.continuous.is_none());
        assert_eq!(state.stage, BaselineStage::Unestimated);

        history.undo(&mut state);
        assert_eq!(state.baseline, baseline_before);
        assert_eq!(state.stage, BaselineStage::Estimated);
        assert!(state.scene.baseline.is_some());
    }

    #[test]
    fn test_redraw_commands_clear_peak_markers() {
        let mut state = flat_state(10, 5.0);
        state.scene.peaks.push(crate::engine::peaks::Peak {
            x: 3.0,
            y: 5.0,
            prominence: 1.0,
            width: 1.0,
        });
        state.scene.show_peak_labels = true;

        let mut history = CommandHistory::new();
        history.execute(
            Command::Crop(CropSpectrum::new(&state, 2.0, 4.0)),
            &mut state,
        );
        assert!(state.scene.peaks.is_empty());
        assert!(!state.scene.show_peak_labels);
    }
}
