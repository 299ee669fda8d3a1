/// Peak detection with scipy-style filters
///
/// Finds local maxima and narrows them by optional minimum height,
/// prominence, and width. Width is measured in samples at a horizontal cut
/// placed `prominence * rel_height` below the apex, with linear
/// interpolation of the crossing points. Unset filters mean "unfiltered".

use serde::{Deserialize, Serialize};

/// Optional detection filters. Each bound is a minimum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakFilter {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub prominence: Option<f64>,
    /// Relative height for width measurement, in (0, 1]; 0.5 when unset.
    pub rel_height: Option<f64>,
}

/// A matched peak with its measured properties.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub x: f64,
    pub y: f64,
    pub prominence: f64,
    /// Width in samples at the relative-height cut.
    pub width: f64,
}

/// Find peaks in `(x, y)` matching the filter. Returns peaks ordered by x.
pub fn find_peaks(x: &[f64], y: &[f64], filter: &PeakFilter) -> Vec<Peak> {
    debug_assert_eq!(x.len(), y.len());
    let rel_height = filter.rel_height.unwrap_or(0.5);

    let mut peaks = Vec::new();
    for idx in local_maxima(y) {
        if let Some(min_height) = filter.height {
            if y[idx] < min_height {
                continue;
            }
        }
        let prominence = peak_prominence(y, idx);
        if let Some(min_prom) = filter.prominence {
            if prominence < min_prom {
                continue;
            }
        }
        let width = peak_width(y, idx, prominence, rel_height);
        if let Some(min_width) = filter.width {
            if width < min_width {
                continue;
            }
        }
        peaks.push(Peak {
            x: x[idx],
            y: y[idx],
            prominence,
            width,
        });
    }
    peaks
}

/// Indices of local maxima. A flat-topped peak reports the midpoint of its
/// plateau. `NaN` samples never qualify (comparisons with `NaN` are false).
fn local_maxima(y: &[f64]) -> Vec<usize> {
    let n = y.len();
    let mut maxima = Vec::new();
    let mut i = 1;
    while i + 1 < n {
        if y[i] > y[i - 1] {
            // Walk across a possible plateau.
            let mut end = i;
            while end + 1 < n && y[end + 1] == y[i] {
                end += 1;
            }
            if end + 1 < n && y[end + 1] < y[i] {
                maxima.push((i + end) / 2);
            }
            i = end + 1;
        } else {
            i += 1;
        }
    }
    maxima
}

/// Topographic prominence: extend left and right from the peak until a
/// higher sample or the signal edge, take the minimum on each side, and
/// subtract the larger of the two minima from the apex.
fn peak_prominence(y: &[f64], peak: usize) -> f64 {
    let apex = y[peak];

    let mut left_min = apex;
    let mut i = peak;
    while i > 0 {
        i -= 1;
        if y[i] > apex {
            break;
        }
        if y[i] < left_min {
            left_min = y[i];
        }
    }

    let mut right_min = apex;
    let mut j = peak;
    while j + 1 < y.len() {
        j += 1;
        if y[j] > apex {
            break;
        }
        if y[j] < right_min {
            right_min = y[j];
        }
    }

    apex - left_min.max(right_min)
}

/// Width in samples at `apex − prominence·rel_height`, with linearly
/// interpolated crossings on both flanks.
fn peak_width(y: &[f64], peak: usize, prominence: f64, rel_height: f64) -> f64 {
    let cut = y[peak] - prominence * rel_height;

    // Left crossing.
    let mut left_ip = 0.0;
    let mut i = peak;
    while i > 0 {
        if y[i - 1] < cut {
            let span = y[i] - y[i - 1];
            let frac = if span != 0.0 { (y[i] - cut) / span } else { 0.0 };
            left_ip = i as f64 - frac;
            break;
        }
        i -= 1;
        left_ip = i as f64;
    }

    // Right crossing.
    let n = y.len();
    let mut right_ip = (n - 1) as f64;
    let mut j = peak;
    while j + 1 < n {
        if y[j + 1] < cut {
            let span = y[j] - y[j + 1];
            let frac = if span != 0.0 { (y[j] - cut) / span } else { 0.0 };
            right_ip = j as f64 + frac;
            break;
        }
        j += 1;
        right_ip = j as f64;
    }

    right_ip - left_ip
}
