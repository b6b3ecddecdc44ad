//! Natural cubic smoothing splines over strictly increasing knots.
//!
//! # Algorithm
//!
//! Fits the penalized least-squares spline minimizing
//!
//! ```text
//! sum_i (y_i - g(t_i))^2  +  alpha * integral g''(t)^2 dt
//! ```
//!
//! whose minimizer is a natural cubic spline with knots at the data sites.
//! Writing gamma for the second derivatives at the interior knots, the
//! optimum solves the banded system
//!
//! ```text
//! (R + alpha * Q'Q) gamma = Q'y,      g = y - alpha * Q gamma
//! ```
//!
//! with R tridiagonal and Q'Q pentadiagonal (both symmetric positive
//! definite), solved here by a bandwidth-2 LDL' factorization. With
//! `alpha = 0` the system reduces to the classic interpolating natural
//! spline and `g` passes through every sample exactly.
//!
//! Evaluation uses the closed piecewise-cubic form in terms of the knot
//! values and second derivatives, so first and second derivatives come out
//! of the same representation with no extra fitting.

/// A fitted natural cubic spline
///
/// Stores knot positions, fitted knot values and second derivatives; all
/// evaluation is piecewise-closed-form from these. Outside the knot range
/// evaluation continues the boundary segment's cubic. The pipeline only
/// evaluates at the knots themselves.
#[derive(Clone, Debug)]
pub struct CubicSpline {
    knots: Vec<f64>,
    values: Vec<f64>,
    second_derivs: Vec<f64>,
}

/// Minimum sample count for a degree-3 fit
pub const MIN_POINTS: usize = 4;

impl CubicSpline {
    /// Fit a natural cubic smoothing spline.
    ///
    /// `smoothing` is the curvature penalty weight; 0.0 interpolates the
    /// samples exactly. Returns `None` when the input cannot support a
    /// degree-3 fit: fewer than [`MIN_POINTS`] samples, knots not strictly
    /// increasing, non-finite data, or a negative/non-finite smoothing
    /// weight. Callers treat `None` as a degenerate unit to skip.
    pub fn fit(knots: &[f64], values: &[f64], smoothing: f64) -> Option<CubicSpline> {
        let n = knots.len();
        if n < MIN_POINTS || values.len() != n {
            return None;
        }
        if !(smoothing.is_finite() && smoothing >= 0.0) {
            return None;
        }
        if knots.iter().any(|t| !t.is_finite()) || values.iter().any(|v| !v.is_finite()) {
            return None;
        }

        // Knot spacings; strict monotonicity keeps the system positive
        // definite.
        let mut h = Vec::with_capacity(n - 1);
        for i in 0..n - 1 {
            let dt = knots[i + 1] - knots[i];
            if dt <= 0.0 {
                return None;
            }
            h.push(dt);
        }

        let m = n - 2; // interior knots carrying free second derivatives

        // A = R + alpha * Q'Q as three symmetric bands.
        let mut diag = vec![0.0; m];
        let mut off1 = vec![0.0; m.saturating_sub(1)];
        let mut off2 = vec![0.0; m.saturating_sub(2)];
        let mut rhs = vec![0.0; m];

        for i in 0..m {
            let hi = h[i];
            let hj = h[i + 1];
            diag[i] = (hi + hj) / 3.0;
            rhs[i] = (values[i + 2] - values[i + 1]) / hj - (values[i + 1] - values[i]) / hi;
        }
        for i in 0..m.saturating_sub(1) {
            off1[i] = h[i + 1] / 6.0;
        }

        if smoothing > 0.0 {
            let inv: Vec<f64> = h.iter().map(|&hi| 1.0 / hi).collect();
            for i in 0..m {
                let a = inv[i];
                let b = inv[i] + inv[i + 1];
                let c = inv[i + 1];
                diag[i] += smoothing * (a * a + b * b + c * c);
            }
            for i in 0..m.saturating_sub(1) {
                let b_i = inv[i] + inv[i + 1];
                let b_next = inv[i + 1] + inv[i + 2];
                off1[i] += smoothing * (-b_i * inv[i + 1] - inv[i + 1] * b_next);
            }
            for i in 0..m.saturating_sub(2) {
                off2[i] = smoothing * inv[i + 1] * inv[i + 2];
            }
        }

        let gamma = solve_banded_spd(&diag, &off1, &off2, &rhs)?;

        // Fitted knot values: g = y - alpha * Q gamma.
        let mut fitted = values.to_vec();
        if smoothing > 0.0 {
            for k in 0..n {
                let mut qg = 0.0;
                if k < m {
                    qg += gamma[k] / h[k];
                }
                if k >= 1 && k - 1 < m {
                    qg -= gamma[k - 1] * (1.0 / h[k - 1] + 1.0 / h[k]);
                }
                if k >= 2 && k - 2 < m {
                    qg += gamma[k - 2] / h[k - 1];
                }
                fitted[k] -= smoothing * qg;
            }
        }

        // Natural boundary: zero second derivative at both ends.
        let mut second_derivs = Vec::with_capacity(n);
        second_derivs.push(0.0);
        second_derivs.extend_from_slice(&gamma);
        second_derivs.push(0.0);

        Some(CubicSpline {
            knots: knots.to_vec(),
            values: fitted,
            second_derivs,
        })
    }

    /// Spline value at `t`
    pub fn evaluate(&self, t: f64) -> f64 {
        let (i, a, b, h) = self.segment(t);
        let (g0, g1) = (self.values[i], self.values[i + 1]);
        let (m0, m1) = (self.second_derivs[i], self.second_derivs[i + 1]);
        a * g0 + b * g1 + ((a * a * a - a) * m0 + (b * b * b - b) * m1) * h * h / 6.0
    }

    /// First derivative at `t`
    pub fn derivative(&self, t: f64) -> f64 {
        let (i, a, b, h) = self.segment(t);
        let (g0, g1) = (self.values[i], self.values[i + 1]);
        let (m0, m1) = (self.second_derivs[i], self.second_derivs[i + 1]);
        (g1 - g0) / h - (3.0 * a * a - 1.0) / 6.0 * h * m0 + (3.0 * b * b - 1.0) / 6.0 * h * m1
    }

    /// Second derivative at `t`
    pub fn second_derivative(&self, t: f64) -> f64 {
        let (i, a, b, _) = self.segment(t);
        a * self.second_derivs[i] + b * self.second_derivs[i + 1]
    }

    /// Fitted values at the knots
    pub fn knot_values(&self) -> &[f64] {
        &self.values
    }

    /// Locate the segment containing `t` and its barycentric weights.
    ///
    /// Out-of-range `t` clamps to the boundary segments, continuing their
    /// cubics.
    fn segment(&self, t: f64) -> (usize, f64, f64, f64) {
        let n = self.knots.len();
        let i = self
            .knots
            .partition_point(|&k| k <= t)
            .saturating_sub(1)
            .min(n - 2);
        let h = self.knots[i + 1] - self.knots[i];
        let a = (self.knots[i + 1] - t) / h;
        let b = (t - self.knots[i]) / h;
        (i, a, b, h)
    }
}

/// Solve `A x = b` for symmetric positive definite `A` with bandwidth 2,
/// given as (diagonal, first subdiagonal, second subdiagonal).
///
/// Plain LDL' specialization: no pivoting is needed for an SPD band, and
/// the factors keep the same bandwidth. Returns `None` if a pivot
/// degenerates (input not positive definite).
fn solve_banded_spd(diag: &[f64], off1: &[f64], off2: &[f64], b: &[f64]) -> Option<Vec<f64>> {
    let m = diag.len();
    if m == 0 {
        return Some(Vec::new());
    }

    let mut d = vec![0.0; m]; // D
    let mut l1 = vec![0.0; m]; // L[i][i-1]
    let mut l2 = vec![0.0; m]; // L[i][i-2]

    for i in 0..m {
        if i >= 2 {
            l2[i] = off2[i - 2] / d[i - 2];
        }
        if i >= 1 {
            let mut v = off1[i - 1];
            if i >= 2 {
                v -= l2[i] * d[i - 2] * l1[i - 1];
            }
            l1[i] = v / d[i - 1];
        }
        let mut v = diag[i];
        if i >= 1 {
            v -= l1[i] * l1[i] * d[i - 1];
        }
        if i >= 2 {
            v -= l2[i] * l2[i] * d[i - 2];
        }
        if !(v.is_finite() && v > 0.0) {
            return None;
        }
        d[i] = v;
    }

    // Forward substitution L z = b.
    let mut x = b.to_vec();
    for i in 0..m {
        if i >= 1 {
            x[i] -= l1[i] * x[i - 1];
        }
        if i >= 2 {
            x[i] -= l2[i] * x[i - 2];
        }
    }
    // Diagonal scaling.
    for i in 0..m {
        x[i] /= d[i];
    }
    // Back substitution L' x = z.
    for i in (0..m).rev() {
        if i + 1 < m {
            x[i] -= l1[i + 1] * x[i + 1];
        }
        if i + 2 < m {
            x[i] -= l2[i + 2] * x[i + 2];
        }
    }

    Some(x)
}
