/// Asymmetric least squares baseline estimation
///
/// Iteratively solves `(W + λ·D₂ᵀD₂)·z = w∘y` where `D₂` is the second
/// difference operator and `w` asymmetric weights: samples above the current
/// baseline get weight `p`, samples below get `1 − p`. The penalty matrix is
/// pentadiagonal, so each solve is a bandwidth-2 Cholesky factorization —
/// O(n) per iteration.
///
/// The estimator is deterministic and side-effect-free; `NaN` samples
/// (cropped regions) are excluded from the solve and stay `NaN` in the
/// returned baseline.

use serde::{Deserialize, Serialize};

/// Estimator parameters. Larger `lambda` → smoother baseline; `asymmetry`
/// is the weight given to samples above the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlsParams {
    pub lambda: f64,
    pub asymmetry: f64,
    pub max_iterations: usize,
}

impl Default for AlsParams {
    fn default() -> Self {
        Self {
            lambda: 1e5,
            asymmetry: 0.05,
            max_iterations: 1000,
        }
    }
}

/// Estimate the baseline of `y`, skipping `NaN` samples. Returns a vector
/// of the same length with `NaN` at every excluded position.
pub fn baseline_als(y: &[f64], params: &AlsParams) -> Vec<f64> {
    let valid_idx: Vec<usize> = (0..y.len()).filter(|&i| !y[i].is_nan()).collect();
    let valid: Vec<f64> = valid_idx.iter().map(|&i| y[i]).collect();

    if valid.len() < 3 {
        log::warn!(
            "baseline estimation needs at least 3 valid samples, got {}",
            valid.len()
        );
        return y.to_vec();
    }

    let baseline_valid = als_dense(&valid, params);

    let mut out = vec![f64::NAN; y.len()];
    for (&i, &b) in valid_idx.iter().zip(baseline_valid.iter()) {
        out[i] = b;
    }
    out
}

/// ALS over a gap-free signal.
fn als_dense(y: &[f64], params: &AlsParams) -> Vec<f64> {
    let n = y.len();
    let penalty = penalty_bands(n, params.lambda);

    let mut w = vec![1.0f64; n];
    let mut z = vec![0.0f64; n];

    for _ in 0..params.max_iterations {
        // A = W + λ·D₂ᵀD₂ in band storage; only the diagonal changes
        // between iterations.
        let mut d0 = penalty.d0.clone();
        for i in 0..n {
            d0[i] += w[i];
        }
        let rhs: Vec<f64> = w.iter().zip(y.iter()).map(|(wi, yi)| wi * yi).collect();
        z = solve_banded_spd(&d0, &penalty.d1, &penalty.d2, &rhs);

        let p = params.asymmetry;
        let mut changed = false;
        let mut any_nonzero = false;
        for i in 0..n {
            let next = if y[i] > z[i] {
                p
            } else if y[i] < z[i] {
                1.0 - p
            } else {
                0.0
            };
            if next != w[i] {
                w[i] = next;
                changed = true;
            }
            any_nonzero |= next != 0.0;
        }
        // Fixed weights reproduce the same solve, so the iteration has
        // converged. All-zero weights mean the baseline already passes
        // through every sample; the next system would be singular.
        if !changed || !any_nonzero {
            break;
        }
    }
    z
}

/// Symmetric pentadiagonal band storage: main diagonal plus the first and
/// second subdiagonals (`d1[i]` = A[i+1][i], `d2[i]` = A[i+2][i]).
struct Bands {
    d0: Vec<f64>,
    d1: Vec<f64>,
    d2: Vec<f64>,
}

/// Build `λ·D₂ᵀD₂` by accumulating the outer product of each second
/// difference stencil column `(1, −2, 1)`.
fn penalty_bands(n: usize, lambda: f64) -> Bands {
    let mut bands = Bands {
        d0: vec![0.0; n],
        d1: vec![0.0; n.saturating_sub(1)],
        d2: vec![0.0; n.saturating_sub(2)],
    };
    const STENCIL: [f64; 3] = [1.0, -2.0, 1.0];
    for j in 0..n - 2 {
        for (a, &va) in STENCIL.iter().enumerate() {
            for (b, &vb) in STENCIL.iter().enumerate() {
                let (ra, rb) = (j + a, j + b);
                if rb == ra {
                    bands.d0[ra] += lambda * va * vb;
                } else if rb == ra + 1 {
                    bands.d1[ra] += lambda * va * vb;
                } else if rb == ra + 2 {
                    bands.d2[ra] += lambda * va * vb;
                }
            }
        }
    }
    bands
}

/// Solve `A·x = b` for a symmetric positive definite pentadiagonal `A` via
/// banded Cholesky (`A = L·Lᵀ`, bandwidth 2).
fn solve_banded_spd(d0: &[f64], d1: &[f64], d2: &[f64], b: &[f64]) -> Vec<f64> {
    let n = d0.len();
    let mut l0 = vec![0.0f64; n];
    let mut l1 = vec![0.0f64; n]; // l1[i] = L[i][i-1]
    let mut l2 = vec![0.0f64; n]; // l2[i] = L[i][i-2]

    for i in 0..n {
        if i >= 2 {
            l2[i] = d2[i - 2] / l0[i - 2];
        }
        if i >= 1 {
            let mut v = d1[i - 1];
            if i >= 2 {
                v -= l2[i] * l1[i - 1];
            }
            l1[i] = v / l0[i - 1];
        }
        let mut v = d0[i];
        v -= l1[i] * l1[i] + l2[i] * l2[i];
        l0[i] = v.max(1e-300).sqrt();
    }

    // Forward substitution L·u = b.
    let mut u = vec![0.0f64; n];
    for i in 0..n {
        let mut v = b[i];
        if i >= 1 {
            v -= l1[i] * u[i - 1];
        }
        if i >= 2 {
            v -= l2[i] * u[i - 2];
        }
        u[i] = v / l0[i];
    }

    // Back substitution Lᵀ·x = u.
    let mut x = vec![0.0f64; n];
    for i in (0..n).rev() {
        let mut v = u[i];
        if i + 1 < n {
            v -= l1[i + 1] * x[i + 1];
        }
        if i + 2 < n {
            v -= l2[i + 2] * x[i + 2];
        }
        x[i] = v / l0[i];
    }
    x
}
