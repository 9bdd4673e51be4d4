//! # 1D interpolation along a single velocity axis.
//!
//! Each shear of the rotation splitting resamples the distribution function along lines of one
//! velocity axis. The [`Interpolator1D`] trait abstracts over the interpolation scheme that is
//! used for this, with [`SplineInterpolator`] (clamped cubic splines) as the provided
//! implementation.

mod spline;

pub use spline::*;

use crate::mesh::UniformGrid;
use ndarray::{ArrayView1, ArrayView2, ArrayView3, ArrayViewMut1, ArrayViewMut3, Axis, Zip};
use thiserror::Error;

/// Errors associated with interpolators.
#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq)]
pub enum InterpolatorError {
    #[error("the interpolator requires at least {required} grid points, got {points}")]
    GridTooSmall { points: usize, required: usize },
}

/// A semi-Lagrangian 1D interpolator on a fixed grid.
pub trait Interpolator1D: Send + Sync {
    /// The grid on which the values are given.
    fn grid(&self) -> &UniformGrid;

    /// Resample `values`, given on [`Interpolator1D::grid`], at the `feet` coordinates.
    ///
    /// The result overwrites `values` in place. The boundary derivatives `deriv_min` and
    /// `deriv_max` are imposed at the two ends of the grid.
    fn interpolate(
        &self,
        values: ArrayViewMut1<f64>,
        feet: ArrayView1<f64>,
        deriv_min: f64,
        deriv_max: f64,
    );

    /// Resample every lane of `values` along `axis` at the matching lane of `feet`.
    ///
    /// The boundary derivatives are shaped like the batch of lanes, i.e. `values` with `axis`
    /// removed. Lanes are processed in parallel.
    fn interpolate_batch(
        &self,
        mut values: ArrayViewMut3<f64>,
        feet: ArrayView3<f64>,
        axis: Axis,
        deriv_min: ArrayView2<f64>,
        deriv_max: ArrayView2<f64>,
    ) {
        Zip::from(values.lanes_mut(axis))
            .and(feet.lanes(axis))
            .and(deriv_min)
            .and(deriv_max)
            .par_for_each(|line, line_feet, dmin, dmax| {
                self.interpolate(line, line_feet, *dmin, *dmax)
            });
    }
}

