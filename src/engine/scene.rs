/// Retained render-intent model
///
/// Commands describe what the plot should show by mutating this scene;
/// the immediate-mode plot view reads it back every frame. This keeps the
/// engine free of any widget state while still letting commands issue the
/// classic surface effects: clear, draw series, draw markers, request an
/// auto-range.

use crate::data::spectrum::{ControlPoints, Spectrum};
use crate::engine::peaks::Peak;

/// An (x, y) series handed to the plot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotScene {
    pub spectrum: Option<Series>,
    pub baseline: Option<Series>,
    pub control_points: Option<ControlPoints>,
    pub peaks: Vec<Peak>,
    pub show_peak_labels: bool,
    auto_range_pending: bool,
}

impl PlotScene {
    /// Remove everything from the surface.
    pub fn clear(&mut self) {
        self.spectrum = None;
        self.baseline = None;
        self.control_points = None;
        self.peaks.clear();
        self.show_peak_labels = false;
    }

    pub fn plot_spectrum(&mut self, spectrum: &Spectrum) {
        self.spectrum = Some(Series {
            x: spectrum.x.clone(),
            y: spectrum.y.clone(),
        });
    }

    pub fn plot_baseline(&mut self, x: &[f64], baseline: &[f64]) {
        self.baseline = Some(Series {
            x: x.to_vec(),
            y: baseline.to_vec(),
        });
    }

    pub fn remove_baseline(&mut self) {
        self.baseline = None;
    }

    pub fn plot_control_points(&mut self, points: &ControlPoints) {
        self.control_points = Some(points.clone());
    }

    pub fn remove_control_points(&mut self) {
        self.control_points = None;
    }

    pub fn request_auto_range(&mut self) {
        self.auto_range_pending = true;
    }

    /// Consume a pending auto-range request (called once per frame by the
    /// plot view).
    pub fn take_auto_range(&mut self) -> bool {
        std::mem::take(&mut self.auto_range_pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_removes_all_items() {
        let mut scene = PlotScene::default();
        scene.plot_spectrum(&Spectrum::new(vec![0.0, 1.0], vec![2.0, 3.0]));
        scene.plot_baseline(&[0.0, 1.0], &[1.0, 1.0]);
        scene.clear();
        assert!(scene.spectrum.is_none());
        assert!(scene.baseline.is_none());
        assert!(scene.peaks.is_empty());
    }

    #[test]
    fn test_auto_range_is_consumed_once() {
        let mut scene = PlotScene::default();
        scene.request_auto_range();
        assert!(scene.take_auto_range());
        assert!(!scene.take_auto_range());
    }
}
