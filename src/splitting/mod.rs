//! # Exact splitting of a velocity rotation into four shears.
//!
//! A rotation `R = exp(t B̂)`, generated by the antisymmetric matrix `B̂ v = b × v`, is
//! factorized exactly into a product of four coordinate shears
//!
//! `R = (I + t yl e_o0ᵀ) (I + t y2 e_o1ᵀ) (I + t y3 e_o2ᵀ) (I + t yr e_o0ᵀ)`
//!
//! where `o = (o0, o1, o2)` is an [`AxisOrder`]. Each factor displaces a single coordinate by an
//! amount that is linear in the two others and can therefore be carried out by a 1D
//! interpolation.
//!
//! The [`ExactSplitting`] solver seeds the four shear vectors with the closed-form factorization
//! of the Rodrigues rotation matrix (or a first-order estimate, if the former is not finite) and
//! polishes them with a fixed-point iteration on the matrix logarithm of the shear product.

mod order;
mod seed;
mod solver;

pub use order::*;
pub use solver::*;

use derive_builder::Builder;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// The four shear vectors of an exact rotation splitting.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ShearVectors {
    /// Left outer shear vector, acts along `order[0]`.
    pub yl: Vector3<f64>,

    /// Inner shear vector, acts along `order[1]`.
    pub y2: Vector3<f64>,

    /// Inner shear vector, acts along `order[2]`.
    pub y3: Vector3<f64>,

    /// Right outer shear vector, acts along `order[0]`.
    pub yr: Vector3<f64>,
}

impl ShearVectors {
    /// Multiplies out the four shear matrices for the time `t`.
    pub fn product(&self, t: f64, order: AxisOrder) -> Matrix3<f64> {
        let [o0, o1, o2] = order.indices();

        shear_matrix(&self.yl, o0, t)
            * shear_matrix(&self.y2, o1, t)
            * shear_matrix(&self.y3, o2, t)
            * shear_matrix(&self.yr, o0, t)
    }

    /// Returns `true` if all four factors are pure shears, i.e. each vector vanishes on its own
    /// axis.
    pub fn is_pure(&self, order: AxisOrder) -> bool {
        let [o0, o1, o2] = order.indices();

        self.yl[o0] == 0.0 && self.yr[o0] == 0.0 && self.y2[o1] == 0.0 && self.y3[o2] == 0.0
    }
}

/// The shear matrix `I + t y e_kᵀ`.
pub fn shear_matrix(y: &Vector3<f64>, axis: usize, t: f64) -> Matrix3<f64> {
    let mut matrix = Matrix3::identity();

    matrix.column_mut(axis).axpy(t, y, 1.0);

    matrix
}

/// Settings for the [`ExactSplitting`] solver and the classification of field vectors.
#[derive(Builder, Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct SplittingSettings {
    /// Maximum number of refinement iterations.
    #[builder(default = 500)]
    pub max_iterations: usize,

    /// Frobenius norm tolerance between the shear product and the exact rotation.
    #[builder(default = 1e-14)]
    pub tolerance: f64,

    /// Field components with an absolute value at or below this threshold count as zero.
    #[builder(default = 1e-13)]
    pub zero_tolerance: f64,

    /// Seed the refinement with the closed-form factorization.
    #[builder(default = true)]
    pub analytic_seed: bool,
}

impl Default for SplittingSettings {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-14,
            zero_tolerance: 1e-13,
            analytic_seed: true,
        }
    }
}

/// The initial guess that a splitting was started from.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SplittingSeed {
    /// Zero time step, the splitting is the identity.
    Trivial,

    /// Closed-form factorization of the exact rotation matrix.
    Analytic,

    /// First-order shears with a commutator corrected outer shear.
    FirstOrder,
}

/// Convergence diagnostics of a single exact splitting.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct SplittingReport {
    /// Number of refinement iterations.
    pub iterations: usize,

    /// Final Frobenius norm between the shear product and the exact rotation.
    pub residual: f64,

    /// The residual is below the tolerance.
    pub converged: bool,

    /// The initial guess.
    pub seed: SplittingSeed,
}
