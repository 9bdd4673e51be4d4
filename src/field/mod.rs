//! # Phase-space and spatial fields.
//!
//! - [`DistributionFunction`] The kinetic unknown on `(species, x, vx, vy, vz)`.
//! - [`SpatialVectorField`] A 3-vector per spatial grid point, such as the magnetic field or the
//!   mean velocity.
//! - [`MaxwellianEquilibrium`] Initialization of a distribution function with drifting Maxwellians.

mod maxwellian;

pub use maxwellian::*;

use crate::mesh::{PhaseSpace, UniformGrid};
use derive_more::{Deref, DerefMut, From, Index, IntoIterator};
use nalgebra::Vector3;
use ndarray::{Array5, ArrayView1, ArrayView3, ArrayViewMut3, s};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors associated with fields.
#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("vector field components have different lengths ({x}, {y}, {z})")]
    ComponentLengthMismatch { x: usize, y: usize, z: usize },
    #[error("expected parameters for {expected} species, got {got}")]
    SpeciesCountMismatch { expected: usize, got: usize },
    #[error("invalid temperature {temperature} for species {species}")]
    InvalidTemperature { species: usize, temperature: f64 },
}

/// A distribution function on `(species, x, vx, vy, vz)`.
#[derive(Clone, Debug, Deref, DerefMut, Deserialize, From, PartialEq, Serialize)]
pub struct DistributionFunction(Array5<f64>);

impl DistributionFunction {
    /// Create a new zero-valued [`DistributionFunction`].
    pub fn zeros(species: usize, phase_space: &PhaseSpace) -> Self {
        let [nx, nvx, nvy, nvz] = phase_space.shape();

        Self(Array5::zeros((species, nx, nvx, nvy, nvz)))
    }

    /// Returns the underlying array.
    pub fn into_inner(self) -> Array5<f64> {
        self.0
    }

    /// Velocity space slice for one species at one spatial point.
    pub fn slice_point(&self, isp: usize, ix: usize) -> ArrayView3<'_, f64> {
        self.0.slice(s![isp, ix, .., .., ..])
    }

    /// Mutable velocity space slice for one species at one spatial point.
    pub fn slice_point_mut(&mut self, isp: usize, ix: usize) -> ArrayViewMut3<'_, f64> {
        self.0.slice_mut(s![isp, ix, .., .., ..])
    }
}

/// A 3-vector field over the spatial grid.
#[derive(Clone, Debug, Deref, Deserialize, From, Index, IntoIterator, PartialEq, Serialize)]
pub struct SpatialVectorField(#[into_iterator(owned, ref)] Vec<Vector3<f64>>);

impl SpatialVectorField {
    /// Create a new [`SpatialVectorField`] from its three components.
    pub fn from_components(
        x: ArrayView1<f64>,
        y: ArrayView1<f64>,
        z: ArrayView1<f64>,
    ) -> Result<Self, FieldError> {
        if x.len() != y.len() || x.len() != z.len() {
            return Err(FieldError::ComponentLengthMismatch {
                x: x.len(),
                y: y.len(),
                z: z.len(),
            });
        }

        Ok(Self(
            x.iter()
                .zip(y.iter())
                .zip(z.iter())
                .map(|((x, y), z)| Vector3::new(*x, *y, *z))
                .collect(),
        ))
    }

    /// Create a new [`SpatialVectorField`] by evaluating `func` on the grid coordinates.
    pub fn from_fn<F>(grid: &UniformGrid, func: F) -> Self
    where
        F: Fn(f64) -> Vector3<f64>,
    {
        Self(grid.coords().map(func).collect())
    }

    /// Create a new constant [`SpatialVectorField`].
    pub fn uniform(value: Vector3<f64>, points: usize) -> Self {
        Self(vec![value; points])
    }

    /// The vector at the spatial index `ix`.
    pub fn at(&self, ix: usize) -> Vector3<f64> {
        self.0[ix]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::VelocityMesh;
    use ndarray::Array1;

    #[test]
    fn test_distribution_function_slices() {
        let grid = UniformGrid::new(-1.0, 1.0, 4).unwrap();

        let phase_space = PhaseSpace {
            x: UniformGrid::new(0.0, 1.0, 3).unwrap(),
            velocity: VelocityMesh {
                vx: grid.clone(),
                vy: grid.clone(),
                vz: UniformGrid::new(-1.0, 1.0, 5).unwrap(),
            },
        };

        let mut f = DistributionFunction::zeros(2, &phase_space);

        assert!(f.shape() == [2, 3, 4, 4, 5]);

        f.slice_point_mut(1, 2)[[0, 1, 4]] = 1.0;

        assert!(f[[1, 2, 0, 1, 4]] == 1.0);
        assert!(f.slice_point(1, 2).sum() == 1.0);
        assert!(f.slice_point(0, 2).sum() == 0.0);
    }

    #[test]
    fn test_spatial_vector_field() {
        let x = Array1::from_vec(vec![1.0, 2.0]);
        let y = Array1::from_vec(vec![3.0, 4.0]);

        let field = SpatialVectorField::from_components(x.view(), y.view(), x.view()).unwrap();

        assert!(field.at(1) == Vector3::new(2.0, 4.0, 2.0));
        assert!(field.len() == 2);

        assert!(
            SpatialVectorField::from_components(x.view(), y.view(), y.slice(s![..1])).unwrap_err()
                == FieldError::ComponentLengthMismatch { x: 2, y: 2, z: 1 }
        );

        let grid = UniformGrid::new(0.0, 1.0, 3).unwrap();
        let field = SpatialVectorField::from_fn(&grid, |x| Vector3::new(x, 0.0, 1.0));

        assert!(field[2] == Vector3::new(1.0, 0.0, 1.0));
        assert!(SpatialVectorField::uniform(Vector3::z(), 5).iter().all(|v| *v == Vector3::z()));
    }
}
