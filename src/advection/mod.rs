//! # Backward semi-Lagrangian velocity rotation.
//!
//! The [`RotationAdvection`] operator advances a [`DistributionFunction`] under the magnetic part
//! of the Lorentz force over a time step `dt`. At every spatial point and for every species, the
//! rotation of the velocity space by the field `b = -(q/m) B` is classified into a
//! [`RotationPlan`], turned into an ordered sequence of [`ShearStep`]s and carried out as 1D
//! interpolations along the velocity axes.
//!
//! ```
//! # use bslrot::{
//! #     advection::RotationAdvection,
//! #     field::{DistributionFunction, SpatialVectorField},
//! #     interp::SplineInterpolator,
//! #     mesh::{PhaseSpace, UniformGrid, VelocityMesh},
//! #     species::{Species, SpeciesInfo},
//! #     splitting::SplittingSettings,
//! # };
//! # use nalgebra::Vector3;
//! let grid = UniformGrid::new(-4.0, 4.0, 16).unwrap();
//!
//! let phase_space = PhaseSpace {
//!     x: UniformGrid::new(0.0, 1.0, 2).unwrap(),
//!     velocity: VelocityMesh { vx: grid.clone(), vy: grid.clone(), vz: grid.clone() },
//! };
//!
//! let species = SpeciesInfo::new(vec![Species::new("ions", 1.0, 1.0)]).unwrap();
//!
//! let advection = RotationAdvection::new(
//!     SplineInterpolator::new(grid.clone()).unwrap(),
//!     SplineInterpolator::new(grid.clone()).unwrap(),
//!     SplineInterpolator::new(grid).unwrap(),
//!     SplittingSettings::default(),
//! );
//!
//! let mut f = DistributionFunction::zeros(1, &phase_space);
//!
//! let report = advection
//!     .advect(
//!         &mut f,
//!         &species,
//!         &phase_space,
//!         &SpatialVectorField::uniform(Vector3::new(0.1, 0.2, 1.0), 2),
//!         &SpatialVectorField::uniform(Vector3::zeros(), 2),
//!         0.1,
//!     )
//!     .unwrap();
//!
//! assert!(report.three_axis == 2);
//! ```

mod plan;
mod shear;

pub use plan::*;
pub use shear::apply_shear;

use crate::{
    field::{DistributionFunction, SpatialVectorField},
    interp::Interpolator1D,
    mesh::PhaseSpace,
    species::SpeciesInfo,
    splitting::{Axis, ExactSplitting, SplittingSettings},
};
use itertools::iproduct;
use log::{debug, warn};
use ndarray::{Array2, Array3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;

/// Errors associated with the rotation advection operator.
#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq)]
pub enum AdvectionError {
    #[error("distribution function shape {got:?} does not match {expected:?}")]
    ShapeMismatch {
        expected: [usize; 5],
        got: Vec<usize>,
    },
    #[error("the {axis} interpolator grid does not match the velocity mesh")]
    InterpolatorGridMismatch { axis: Axis },
    #[error("the {name} field has {got} points, expected {expected}")]
    FieldLengthMismatch {
        name: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("invalid time step {dt}")]
    InvalidTimeStep { dt: f64 },
}

/// Summary of a single [`RotationAdvection::advect`] call.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct AdvectionReport {
    /// Points that were split into four shears.
    pub three_axis: usize,

    /// Points with a single field component.
    pub single_axis: usize,

    /// Points without a field.
    pub degenerate: usize,

    /// Total number of applied shears.
    pub shears: usize,

    /// Largest absolute shear coefficient of all applied shears.
    pub max_shear: f64,

    /// Largest residual of all exact splittings.
    pub max_residual: f64,

    /// Largest number of refinement iterations of all exact splittings.
    pub max_iterations: usize,

    /// Number of exact splittings that did not converge.
    pub not_converged: usize,

    /// Wall time in seconds.
    pub elapsed: f64,
}

/// Velocity rotation operator using an exact four shear splitting.
#[derive(Clone, Debug)]
pub struct RotationAdvection<IX, IY, IZ> {
    interp_vx: IX,
    interp_vy: IY,
    interp_vz: IZ,
    solver: ExactSplitting,
}

impl<IX, IY, IZ> RotationAdvection<IX, IY, IZ>
where
    IX: Interpolator1D,
    IY: Interpolator1D,
    IZ: Interpolator1D,
{
    /// Create a new [`RotationAdvection`] operator with one interpolator per velocity axis.
    pub fn new(interp_vx: IX, interp_vy: IY, interp_vz: IZ, settings: SplittingSettings) -> Self {
        Self {
            interp_vx,
            interp_vy,
            interp_vz,
            solver: ExactSplitting::new(settings),
        }
    }

    /// Returns the interpolator along a velocity axis.
    pub fn interpolator(&self, axis: Axis) -> &dyn Interpolator1D {
        match axis {
            Axis::X => &self.interp_vx,
            Axis::Y => &self.interp_vy,
            Axis::Z => &self.interp_vz,
        }
    }

    /// Returns a reference to the exact splitting solver.
    pub fn solver(&self) -> &ExactSplitting {
        &self.solver
    }

    /// Advance the distribution function by `dt` under the magnetic field.
    ///
    /// All inputs are validated before `f` is touched. Non-converged splittings do not fail the
    /// call, they are logged and counted in the returned report.
    pub fn advect(
        &self,
        f: &mut DistributionFunction,
        species: &SpeciesInfo,
        phase_space: &PhaseSpace,
        magnetic_field: &SpatialVectorField,
        mean_velocity: &SpatialVectorField,
        dt: f64,
    ) -> Result<AdvectionReport, AdvectionError> {
        self.validate(f, species, phase_space, magnetic_field, mean_velocity, dt)?;

        let start = Instant::now();

        let mesh = &phase_space.velocity;
        let shape = mesh.shape();

        let mut report = AdvectionReport::default();

        let mut feet = Axis::ALL.map(|_| Array3::<f64>::zeros(shape));

        // Zero boundary derivatives for every line along each axis.
        let derivs = Axis::ALL.map(|axis| {
            let [a, b] = axis.others();
            let dim = (shape[a.index()], shape[b.index()]);

            (Array2::<f64>::zeros(dim), Array2::<f64>::zeros(dim))
        });

        // The splittings of all points are independent of the distribution function.
        let plans = iproduct!(0..species.len(), 0..phase_space.x.len())
            .collect::<Vec<(usize, usize)>>()
            .into_par_iter()
            .map(|(isp, ix)| {
                let b = magnetic_field.at(ix) * -species.q_over_m(isp);
                let plan = RotationPlan::classify(&b, self.solver.settings().zero_tolerance);
                let (steps, splitting) = plan.shear_steps(dt, &self.solver);

                (isp, ix, plan, steps, splitting)
            })
            .collect::<Vec<_>>();

        for (isp, ix, plan, steps, splitting) in plans {
            let mean = mean_velocity.at(ix);

            match plan {
                RotationPlan::ThreeAxis { .. } => report.three_axis += 1,
                RotationPlan::SingleAxis { .. } => report.single_axis += 1,
                RotationPlan::Degenerate => report.degenerate += 1,
            }

            if let Some(splitting) = splitting {
                report.max_residual = report.max_residual.max(splitting.residual);
                report.max_iterations = report.max_iterations.max(splitting.iterations);

                if !splitting.converged {
                    report.not_converged += 1;

                    warn!(
                        "advect: splitting did not converge at species {}, x index {} (residual {:.2e} after {} iterations)",
                        isp, ix, splitting.residual, splitting.iterations
                    );
                }
            }

            for step in steps.iter() {
                let k = step.axis.index();

                apply_shear(
                    step,
                    f.slice_point_mut(isp, ix),
                    &mut feet[k],
                    mesh,
                    &mean,
                    self.interpolator(step.axis),
                    derivs[k].0.view(),
                    derivs[k].1.view(),
                );
            }

            report.shears += steps.len();
            report.max_shear = steps
                .iter()
                .flat_map(|step| step.coefs)
                .fold(report.max_shear, |acc, coef| acc.max(coef.abs()));
        }

        report.elapsed = start.elapsed().as_millis() as f64 / 1e3;

        debug!(
            "advect: {:2.2}M value updates in {:.2} sec",
            (report.shears * shape.iter().product::<usize>()) as f64 / 1e6,
            report.elapsed
        );

        Ok(report)
    }

    /// Checks all input shapes against the phase space and the interpolator grids.
    fn validate(
        &self,
        f: &DistributionFunction,
        species: &SpeciesInfo,
        phase_space: &PhaseSpace,
        magnetic_field: &SpatialVectorField,
        mean_velocity: &SpatialVectorField,
        dt: f64,
    ) -> Result<(), AdvectionError> {
        if !dt.is_finite() {
            return Err(AdvectionError::InvalidTimeStep { dt });
        }

        let [nx, nvx, nvy, nvz] = phase_space.shape();
        let expected = [species.len(), nx, nvx, nvy, nvz];

        if f.shape() != expected {
            return Err(AdvectionError::ShapeMismatch {
                expected,
                got: f.shape().to_vec(),
            });
        }

        for (name, field) in [
            ("magnetic", magnetic_field),
            ("mean velocity", mean_velocity),
        ] {
            if field.len() != nx {
                return Err(AdvectionError::FieldLengthMismatch {
                    name,
                    expected: nx,
                    got: field.len(),
                });
            }
        }

        for axis in Axis::ALL {
            if self.interpolator(axis).grid() != phase_space.velocity.grid(axis) {
                return Err(AdvectionError::InterpolatorGridMismatch { axis });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        interp::SplineInterpolator,
        mesh::{UniformGrid, VelocityMesh},
        species::Species,
        splitting::SplittingSettingsBuilder,
    };
    use nalgebra::Vector3;
    use ndarray::Zip;
    use std::f64::consts::{PI, TAU};

    type SplineAdvection =
        RotationAdvection<SplineInterpolator, SplineInterpolator, SplineInterpolator>;

    fn setup(points: usize) -> (PhaseSpace, SplineAdvection) {
        let grid = UniformGrid::new(-6.0, 6.0, points).unwrap();

        let phase_space = PhaseSpace {
            x: UniformGrid::new(0.0, 1.0, 2).unwrap(),
            velocity: VelocityMesh {
                vx: grid.clone(),
                vy: grid.clone(),
                vz: grid.clone(),
            },
        };

        let advection = RotationAdvection::new(
            SplineInterpolator::new(grid.clone()).unwrap(),
            SplineInterpolator::new(grid.clone()).unwrap(),
            SplineInterpolator::new(grid).unwrap(),
            SplittingSettings::default(),
        );

        (phase_space, advection)
    }

    fn gaussian(phase_space: &PhaseSpace, center: Vector3<f64>) -> DistributionFunction {
        let mut f = DistributionFunction::zeros(1, phase_space);
        let mesh = &phase_space.velocity;

        Zip::indexed(&mut *f).for_each(|(_, _, i, j, k), value| {
            let v = Vector3::new(mesh.vx.coord(i), mesh.vy.coord(j), mesh.vz.coord(k));

            *value = (-0.5 * (v - center).norm_squared()).exp();
        });

        f
    }

    fn ions() -> SpeciesInfo {
        SpeciesInfo::new(vec![Species::new("ions", 1.0, 1.0)]).unwrap()
    }

    #[test]
    fn test_advect_zero_field() {
        let (phase_space, advection) = setup(16);

        let mut f = gaussian(&phase_space, Vector3::new(0.5, 0.0, 0.0));
        let original = f.clone();

        let report = advection
            .advect(
                &mut f,
                &ions(),
                &phase_space,
                &SpatialVectorField::uniform(Vector3::zeros(), 2),
                &SpatialVectorField::uniform(Vector3::new(0.1, 0.2, 0.3), 2),
                0.7,
            )
            .unwrap();

        assert!(report.degenerate == 2 && report.shears == 0);
        assert!(f == original);
    }

    #[test]
    fn test_advect_round_trip() {
        let magnetic_field = SpatialVectorField::uniform(Vector3::new(0.3, 0.5, 0.8), 2);
        let mean_velocity = SpatialVectorField::uniform(Vector3::zeros(), 2);

        let errors = [16, 32].map(|points| {
            let (phase_space, advection) = setup(points);

            let mut f = gaussian(&phase_space, Vector3::new(0.5, 0.0, 0.0));
            let original = f.clone();

            for dt in [0.5, -0.5] {
                let report = advection
                    .advect(
                        &mut f,
                        &ions(),
                        &phase_space,
                        &magnetic_field,
                        &mean_velocity,
                        dt,
                    )
                    .unwrap();

                assert!(report.three_axis == 2 && report.shears == 8);
                assert!(report.not_converged == 0);
            }

            let diff = (&*f - &*original).mapv(|d| d * d).sum().sqrt();

            diff / original.mapv(|v| v * v).sum().sqrt()
        });

        assert!(errors[1] < 0.5 * errors[0]);
        assert!(errors[1] < 2e-2);
    }

    /// Advects a narrow Gaussian centered at `(1.5, 0, 0)` and returns the largest deviation from
    /// the Gaussian around the rotated center.
    fn rotated_center_error(b: Vector3<f64>, dt: f64) -> (f64, AdvectionReport) {
        let (phase_space, advection) = setup(49);

        let mut f = gaussian(&phase_space, Vector3::new(1.5, 0.0, 0.0));

        let report = advection
            .advect(
                &mut f,
                &ions(),
                &phase_space,
                &SpatialVectorField::uniform(b, 2),
                &SpatialVectorField::uniform(Vector3::zeros(), 2),
                dt,
            )
            .unwrap();

        // The ions gyrate with b = -B, i.e. clockwise around B.
        let center = crate::math::exp_antisym(&-b, dt) * Vector3::new(1.5, 0.0, 0.0);
        let expected = gaussian(&phase_space, center);

        let diff = (&*f - &*expected).mapv(f64::abs).fold(0.0_f64, |acc, d| acc.max(*d));

        (diff, report)
    }

    #[test]
    fn test_advect_rotates_center() {
        let (diff, report) = rotated_center_error(Vector3::new(0.0, 0.0, 1.0), 0.5);

        assert!(report.single_axis == 2 && report.shears == 6);
        assert!(diff < 1e-3);
    }

    #[test]
    fn test_advect_whole_turns() {
        // A full gyration leaves the distribution untouched.
        let (diff, report) = rotated_center_error(Vector3::new(0.0, 0.0, 1.0), TAU);

        assert!(report.shears == 0);
        assert!(diff < 1e-12);

        // Close to a full turn the remainder is a small rotation.
        let (diff, report) = rotated_center_error(Vector3::new(0.0, 0.0, 1.0), 6.0);

        assert!(report.shears == 6 && report.max_shear < 0.3);
        assert!(diff < 1e-3);
    }

    #[test]
    fn test_advect_near_half_turn() {
        // A small first component makes a single four shear sequence degenerate near a half turn.
        for (b, dt) in [
            (Vector3::new(0.6, 0.01, 0.8), 3.0),
            (Vector3::new(0.6, 1e-3, 0.8), 0.99 * PI / (1.0_f64 + 1e-6).sqrt()),
        ] {
            let (diff, report) = rotated_center_error(b, dt);

            assert!(report.three_axis == 2 && report.not_converged == 0);
            assert!(report.shears == 24 && report.max_shear < 1.0);
            assert!(diff < 1e-3);
        }
    }

    #[test]
    fn test_advect_errors() {
        let (phase_space, advection) = setup(16);

        let uniform = SpatialVectorField::uniform(Vector3::z(), 2);
        let mut f = DistributionFunction::zeros(2, &phase_space);

        assert!(matches!(
            advection.advect(&mut f, &ions(), &phase_space, &uniform, &uniform, 0.1),
            Err(AdvectionError::ShapeMismatch { .. })
        ));

        let mut f = DistributionFunction::zeros(1, &phase_space);

        assert!(
            advection.advect(
                &mut f,
                &ions(),
                &phase_space,
                &SpatialVectorField::uniform(Vector3::z(), 3),
                &uniform,
                0.1
            ) == Err(AdvectionError::FieldLengthMismatch {
                name: "magnetic",
                expected: 2,
                got: 3
            })
        );

        assert!(
            advection.advect(&mut f, &ions(), &phase_space, &uniform, &uniform, f64::NAN)
                .is_err()
        );

        let (other_phase_space, _) = setup(20);
        let mut f = DistributionFunction::zeros(1, &other_phase_space);

        assert!(
            advection.advect(&mut f, &ions(), &other_phase_space, &uniform, &uniform, 0.1)
                == Err(AdvectionError::InterpolatorGridMismatch { axis: Axis::X })
        );
    }

    #[test]
    fn test_advect_reports_non_convergence() {
        let grid = UniformGrid::new(-2.0, 2.0, 8).unwrap();

        let phase_space = PhaseSpace {
            x: UniformGrid::new(0.0, 1.0, 2).unwrap(),
            velocity: VelocityMesh {
                vx: grid.clone(),
                vy: grid.clone(),
                vz: grid.clone(),
            },
        };

        // Without the analytic seed and refinement the first-order splitting is not exact.
        let advection = RotationAdvection::new(
            SplineInterpolator::new(grid.clone()).unwrap(),
            SplineInterpolator::new(grid.clone()).unwrap(),
            SplineInterpolator::new(grid).unwrap(),
            SplittingSettingsBuilder::default()
                .analytic_seed(false)
                .max_iterations(0)
                .build()
                .unwrap(),
        );

        let mut f = DistributionFunction::zeros(1, &phase_space);

        let report = advection
            .advect(
                &mut f,
                &ions(),
                &phase_space,
                &SpatialVectorField::uniform(Vector3::new(0.3, 0.5, 0.8), 2),
                &SpatialVectorField::uniform(Vector3::zeros(), 2),
                0.5,
            )
            .unwrap();

        assert!(report.not_converged == 2);
        assert!(report.max_residual > 1e-3);
        assert!(report.max_iterations == 0);
    }
}
