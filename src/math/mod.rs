//! # Small dense linear algebra for 3×3 rotations.
//!
//! The exact splitting of a velocity rotation only ever deals with 3×3 real matrices, so this
//! module provides the handful of routines that are needed for it on top of [`nalgebra`]:
//! - [`exp_antisym`] The Rodrigues formula for the exponential of an antisymmetric generator.
//!   It serves as the reference (oracle) rotation matrix.
//! - [`expm1_antisym`] The same exponential minus the identity, computed without cancellation.
//! - [`logm`] A real matrix logarithm based on inverse scaling and squaring.
//! - [`sqrtm`] The principal matrix square root (Denman–Beavers iteration).

mod logm;
mod rotation;

pub use logm::{logm, sqrtm};
pub use rotation::{exp_antisym, expm1_antisym};
