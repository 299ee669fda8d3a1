/// Core spectral data entities
///
/// A `Spectrum` is one version of the loaded data: an ordered x-grid and the
/// ordinates aligned to it. Samples excluded by cropping are marked with
/// `NaN` in `y`; the grid itself is never shortened by a crop. Every edit
/// produces a new `Spectrum` value so that history snapshots stay
/// independent of later mutations.

use serde::{Deserialize, Serialize};

/// One version of a loaded spectrum: paired x/y samples of equal length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spectrum {
    /// Wavenumber axis (cm⁻¹), non-decreasing.
    pub x: Vec<f64>,
    /// Intensities; `NaN` marks cropped/excluded samples.
    pub y: Vec<f64>,
}

/// Bit-level equality: `NaN` samples (cropped positions) compare equal to
/// `NaN`, so two spectra with identical crop masks are equal.
impl PartialEq for Spectrum {
    fn eq(&self, other: &Self) -> bool {
        fn bits_eq(a: &[f64], b: &[f64]) -> bool {
            a.len() == b.len()
                && a.iter()
                    .zip(b.iter())
                    .all(|(p, q)| p.to_bits() == q.to_bits())
        }
        bits_eq(&self.x, &other.x) && bits_eq(&self.y, &other.y)
    }
}

impl Spectrum {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        debug_assert_eq!(x.len(), y.len());
        Self { x, y }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Number of samples whose y is not `NaN`.
    pub fn valid_count(&self) -> usize {
        self.y.iter().filter(|v| !v.is_nan()).count()
    }

    /// The non-`NaN` samples as parallel (x, y) vectors, preserving order.
    pub fn valid_samples(&self) -> (Vec<f64>, Vec<f64>) {
        let mut vx = Vec::with_capacity(self.len());
        let mut vy = Vec::with_capacity(self.len());
        for (&x, &y) in self.x.iter().zip(self.y.iter()) {
            if !y.is_nan() {
                vx.push(x);
                vy.push(y);
            }
        }
        (vx, vy)
    }
}

/// Sparse, editable baseline representation: control points sampled at a
/// fixed step across the spectrum domain, ordered by x.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPoints {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl ControlPoints {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// A computed or interactively edited baseline aligned to a spectrum's grid.
///
/// `continuous` holds the baseline value at every spectrum sample; it is
/// always re-derivable from `control_points` (when those exist) by
/// piecewise-linear interpolation onto the grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineModel {
    pub continuous: Option<Vec<f64>>,
    pub control_points: Option<ControlPoints>,
}

impl BaselineModel {
    pub fn clear(&mut self) {
        self.continuous = None;
        self.control_points = None;
    }

    pub fn is_estimated(&self) -> bool {
        self.continuous.is_some()
    }
}

/// Which baseline operation a single "baseline" user action performs next.
/// Part of the state every command snapshots and restores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaselineStage {
    #[default]
    Unestimated,
    Estimated,
    Corrected,
}

impl std::fmt::Display for BaselineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BaselineStage::Unestimated => write!(f, "no baseline"),
            BaselineStage::Estimated => write!(f, "baseline estimated"),
            BaselineStage::Corrected => write!(f, "baseline corrected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_samples_skip_nan() {
        let s = Spectrum::new(vec![0.0, 1.0, 2.0, 3.0], vec![5.0, f64::NAN, 7.0, f64::NAN]);
        assert_eq!(s.len(), 4);
        assert_eq!(s.valid_count(), 2);
        let (vx, vy) = s.valid_samples();
        assert_eq!(vx, vec![0.0, 2.0]);
        assert_eq!(vy, vec![5.0, 7.0]);
    }

    #[test]
    fn test_baseline_model_clear() {
        let mut model = BaselineModel {
            continuous: Some(vec![1.0, 2.0]),
            control_points: Some(ControlPoints {
                x: vec![0.0],
                y: vec![1.0],
            }),
        };
        assert!(model.is_estimated());
        model.clear();
        assert!(!model.is_estimated());
        assert!(model.control_points.is_none());
    }
}
