/// Numeric transforms over spectra and baselines
///
/// These are the forward bodies the commands replay: crop-to-NaN,
/// Savitzky-Golay smoothing, piecewise-linear interpolation, and baseline
/// discretization. All of them allocate fresh output vectors; callers own
/// snapshotting.

use crate::data::spectrum::{ControlPoints, Spectrum};

/// Mark every sample whose x falls in `[start_x, end_x]` as excluded by
/// setting its y to `NaN`. The grid and length are unchanged.
pub fn crop_to_nan(spectrum: &Spectrum, start_x: f64, end_x: f64) -> Spectrum {
    let mut y = spectrum.y.clone();
    for (i, &x) in spectrum.x.iter().enumerate() {
        if x >= start_x && x <= end_x {
            y[i] = f64::NAN;
        }
    }
    Spectrum::new(spectrum.x.clone(), y)
}

/// Elementwise `y − baseline`. `NaN` in either operand propagates, so
/// previously cropped samples remain `NaN` after correction.
pub fn subtract_baseline(y: &[f64], baseline: &[f64]) -> Vec<f64> {
    debug_assert_eq!(y.len(), baseline.len());
    y.iter().zip(baseline.iter()).map(|(a, b)| a - b).collect()
}

/// Piecewise-linear interpolation of `(xp, fp)` at the query points `xq`.
///
/// Matches NumPy's `interp`: queries left of `xp[0]` clamp to `fp[0]`,
/// queries right of the last point clamp to the last value. `xp` must be
/// ascending and non-empty.
pub fn interp(xq: &[f64], xp: &[f64], fp: &[f64]) -> Vec<f64> {
    debug_assert_eq!(xp.len(), fp.len());
    debug_assert!(!xp.is_empty());

    xq.iter()
        .map(|&q| {
            if q <= xp[0] {
                return fp[0];
            }
            if q >= xp[xp.len() - 1] {
                return fp[fp.len() - 1];
            }
            // partition_point: first index with xp[i] > q; q is strictly
            // inside the range here so 1 <= i <= len-1.
            let i = xp.partition_point(|&p| p <= q);
            let (x0, x1) = (xp[i - 1], xp[i]);
            let (y0, y1) = (fp[i - 1], fp[i]);
            if x1 == x0 {
                y0
            } else {
                y0 + (q - x0) * (y1 - y0) / (x1 - x0)
            }
        })
        .collect()
}

/// Sample the continuous baseline at a fixed x-step across the spectrum
/// domain, producing the editable control points. The grid runs from the
/// first x up to (excluding) the last x, mirroring an end-exclusive arange.
pub fn discretize_baseline(x: &[f64], continuous: &[f64], step: f64) -> ControlPoints {
    debug_assert!(step > 0.0);
    let (first, last) = (x[0], x[x.len() - 1]);

    let mut grid = Vec::new();
    let mut v = first;
    while v < last {
        grid.push(v);
        v += step;
    }

    let y = interp(&grid, x, continuous);
    ControlPoints { x: grid, y }
}

/// Re-derive the continuous baseline from control points by interpolating
/// onto the spectrum grid. Runs on every pointer move during a drag, so it
/// stays a single O(n) pass.
pub fn interpolate_control_points(points: &ControlPoints, grid: &[f64]) -> Vec<f64> {
    interp(grid, &points.x, &points.y)
}

// =========================================================================
//  Savitzky-Golay smoothing
// =========================================================================

/// Savitzky-Golay filter: least-squares polynomial smoothing over a sliding
/// window. Interior points use a centered window; near the edges the window
/// is shifted inside the data and the fitted polynomial is evaluated at the
/// off-center position, so edge samples are smoothed rather than padded.
///
/// `window` must be at least `order + 1` and no longer than the data.
pub fn savgol_filter(y: &[f64], window: usize, order: usize) -> Vec<f64> {
    let n = y.len();
    debug_assert!(window >= order + 1);
    debug_assert!(window <= n);

    let half = window / 2;
    let mut out = Vec::with_capacity(n);

    // Window abscissae centered for conditioning.
    let xs: Vec<f64> = (0..window).map(|j| j as f64 - half as f64).collect();

    for i in 0..n {
        let start = i.saturating_sub(half).min(n - window);
        let coeffs = polyfit(&xs, &y[start..start + window], order);
        let at = (i - start) as f64 - half as f64;
        out.push(polyval(&coeffs, at));
    }
    out
}

/// Least-squares polynomial fit via normal equations. The systems here are
/// tiny (order ≤ 3), so plain Gaussian elimination with partial pivoting is
/// plenty.
fn polyfit(xs: &[f64], ys: &[f64], order: usize) -> Vec<f64> {
    let m = order + 1;

    // Power sums S_k = Σ x^k for the Gram matrix, k = 0..2*order.
    let mut sums = vec![0.0f64; 2 * order + 1];
    for &x in xs {
        let mut p = 1.0;
        for s in sums.iter_mut() {
            *s += p;
            p *= x;
        }
    }

    // Augmented system [A | b], A[r][c] = S_{r+c}, b[r] = Σ y x^r.
    let mut aug = vec![vec![0.0f64; m + 1]; m];
    for r in 0..m {
        for c in 0..m {
            aug[r][c] = sums[r + c];
        }
    }
    for (&x, &y) in xs.iter().zip(ys.iter()) {
        let mut p = 1.0;
        for row in aug.iter_mut() {
            row[m] += y * p;
            p *= x;
        }
    }

    // Gaussian elimination with partial pivoting.
    for col in 0..m {
        let pivot = (col..m)
            .max_by(|&a, &b| {
                aug[a][col]
                    .abs()
                    .partial_cmp(&aug[b][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        aug.swap(col, pivot);
        let diag = aug[col][col];
        if diag.abs() < 1e-300 {
            continue;
        }
        for row in col + 1..m {
            let factor = aug[row][col] / diag;
            for k in col..=m {
                aug[row][k] -= factor * aug[col][k];
            }
        }
    }

    // Back substitution.
    let mut coeffs = vec![0.0f64; m];
    for row in (0..m).rev() {
        let mut acc = aug[row][m];
        for k in row + 1..m {
            acc -= aug[row][k] * coeffs[k];
        }
        let diag = aug[row][row];
        coeffs[row] = if diag.abs() < 1e-300 { 0.0 } else { acc / diag };
    }
    coeffs
}

fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}
