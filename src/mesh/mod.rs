//! # Uniform phase-space meshes.
//!
//! The phase space is made up of one spatial grid and three velocity grids, all of which are
//! uniform with both end points included.

use crate::splitting::Axis;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors associated with mesh construction.
#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq)]
pub enum MeshError {
    #[error("invalid grid bounds [{min}, {max}]")]
    InvalidBounds { min: f64, max: f64 },
    #[error("a grid requires at least two points, got {points}")]
    TooFewPoints { points: usize },
}

/// A uniform 1D grid including both end points.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(try_from = "UniformGridParameters")]
pub struct UniformGrid {
    min: f64,
    max: f64,
    points: usize,
}

/// Unchecked grid parameters, used for deserialization.
#[derive(Deserialize)]
struct UniformGridParameters {
    min: f64,
    max: f64,
    points: usize,
}

impl TryFrom<UniformGridParameters> for UniformGrid {
    type Error = MeshError;

    fn try_from(value: UniformGridParameters) -> Result<Self, Self::Error> {
        Self::new(value.min, value.max, value.points)
    }
}

impl UniformGrid {
    /// Create a new uniform grid with `points` points on `[min, max]`.
    pub fn new(min: f64, max: f64, points: usize) -> Result<Self, MeshError> {
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(MeshError::InvalidBounds { min, max });
        }

        if points < 2 {
            return Err(MeshError::TooFewPoints { points });
        }

        Ok(Self { min, max, points })
    }

    /// Returns the coordinate of the i-th grid point.
    pub fn coord(&self, i: usize) -> f64 {
        if i + 1 == self.points {
            self.max
        } else {
            self.min + i as f64 * self.step()
        }
    }

    /// Returns an iterator over all grid coordinates.
    pub fn coords(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.points).map(|i| self.coord(i))
    }

    /// Lower boundary.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper boundary.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.points
    }

    /// Always `false`, a grid has at least two points.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Grid spacing.
    pub fn step(&self) -> f64 {
        (self.max - self.min) / (self.points - 1) as f64
    }
}

/// The three velocity grids.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct VelocityMesh {
    #[allow(missing_docs)]
    pub vx: UniformGrid,
    #[allow(missing_docs)]
    pub vy: UniformGrid,
    #[allow(missing_docs)]
    pub vz: UniformGrid,
}

impl VelocityMesh {
    /// Returns the grid along a velocity axis.
    pub fn grid(&self, axis: Axis) -> &UniformGrid {
        match axis {
            Axis::X => &self.vx,
            Axis::Y => &self.vy,
            Axis::Z => &self.vz,
        }
    }

    /// The number of points along each velocity axis.
    pub fn shape(&self) -> [usize; 3] {
        [self.vx.len(), self.vy.len(), self.vz.len()]
    }
}

/// A 1D spatial grid times the 3D velocity mesh.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PhaseSpace {
    /// Spatial grid.
    pub x: UniformGrid,

    /// Velocity mesh.
    pub velocity: VelocityMesh,
}

impl PhaseSpace {
    /// The number of points along `(x, vx, vy, vz)`.
    pub fn shape(&self) -> [usize; 4] {
        let [nvx, nvy, nvz] = self.velocity.shape();

        [self.x.len(), nvx, nvy, nvz]
    }
}
