use crate::{
    interp::{Interpolator1D, InterpolatorError},
    mesh::UniformGrid,
};
use ndarray::{ArrayView1, ArrayViewMut1, Zip};
use serde::{Deserialize, Serialize};

/// Clamped cubic spline interpolator on a uniform grid.
///
/// The spline is determined by the values on the grid and the first derivatives at both ends.
/// The tridiagonal system for the second derivatives at the grid points has a fixed matrix, so
/// the forward sweep of the Thomas algorithm is computed once on construction.
///
/// Feet outside of the grid take the value at the nearest boundary, non-finite feet produce NaN.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SplineInterpolator {
    grid: UniformGrid,
    c_prime: Vec<f64>,
    inv_pivots: Vec<f64>,
}

impl SplineInterpolator {
    /// Minimum number of grid points.
    pub const MIN_POINTS: usize = 4;

    /// Create a new [`SplineInterpolator`] on the given grid.
    pub fn new(grid: UniformGrid) -> Result<Self, InterpolatorError> {
        let n = grid.len();

        if n < Self::MIN_POINTS {
            return Err(InterpolatorError::GridTooSmall {
                points: n,
                required: Self::MIN_POINTS,
            });
        }

        let mut c_prime = vec![0.0; n];
        let mut inv_pivots = vec![0.0; n];

        // Sub- and super-diagonals are all ones.
        let diagonal = |i: usize| if i == 0 || i == n - 1 { 2.0 } else { 4.0 };

        inv_pivots[0] = 1.0 / diagonal(0);
        c_prime[0] = inv_pivots[0];

        for i in 1..n {
            inv_pivots[i] = 1.0 / (diagonal(i) - c_prime[i - 1]);

            if i < n - 1 {
                c_prime[i] = inv_pivots[i];
            }
        }

        Ok(Self {
            grid,
            c_prime,
            inv_pivots,
        })
    }

    /// Computes the second derivatives of the spline at the grid points.
    fn moments(&self, f: &[f64], deriv_min: f64, deriv_max: f64) -> Vec<f64> {
        let n = f.len();
        let h = self.grid.step();

        let rhs = |i: usize| {
            if i == 0 {
                6.0 / h * ((f[1] - f[0]) / h - deriv_min)
            } else if i == n - 1 {
                6.0 / h * (deriv_max - (f[n - 1] - f[n - 2]) / h)
            } else {
                6.0 / (h * h) * (f[i + 1] - 2.0 * f[i] + f[i - 1])
            }
        };

        let mut m = vec![0.0; n];

        m[0] = rhs(0) * self.inv_pivots[0];

        for i in 1..n {
            m[i] = (rhs(i) - m[i - 1]) * self.inv_pivots[i];
        }

        for i in (0..n - 1).rev() {
            m[i] -= self.c_prime[i] * m[i + 1];
        }

        m
    }

    /// Evaluates the spline with values `f` and second derivatives `m` at `x`.
    fn evaluate(&self, f: &[f64], m: &[f64], x: f64) -> f64 {
        let n = f.len();

        if !x.is_finite() {
            return f64::NAN;
        } else if x <= self.grid.min() {
            return f[0];
        } else if x >= self.grid.max() {
            return f[n - 1];
        }

        let h = self.grid.step();
        let i = (((x - self.grid.min()) / h).floor() as usize).min(n - 2);

        let a = self.grid.coord(i + 1) - x;
        let b = x - self.grid.coord(i);

        (m[i] * a * a * a + m[i + 1] * b * b * b) / (6.0 * h)
            + (f[i] / h - m[i] * h / 6.0) * a
            + (f[i + 1] / h - m[i + 1] * h / 6.0) * b
    }
}

impl Interpolator1D for SplineInterpolator {
    fn grid(&self) -> &UniformGrid {
        &self.grid
    }

    fn interpolate(
        &self,
        mut values: ArrayViewMut1<f64>,
        feet: ArrayView1<f64>,
        deriv_min: f64,
        deriv_max: f64,
    ) {
        let f = values.to_vec();
        let m = self.moments(&f, deriv_min, deriv_max);

        Zip::from(&mut values)
            .and(&feet)
            .for_each(|value, x| *value = self.evaluate(&f, &m, *x));
    }
}
