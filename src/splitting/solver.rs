use crate::{
    advection::NonDegenerateField,
    math::{exp_antisym, logm},
    splitting::{
        AxisOrder, ShearVectors, SplittingReport, SplittingSeed, SplittingSettings,
        seed::{analytic_seed, first_order_seed},
    },
};
use log::trace;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Exact splitting solver for velocity rotations.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ExactSplitting {
    settings: SplittingSettings,
}

impl ExactSplitting {
    /// Create a new solver.
    pub fn new(settings: SplittingSettings) -> Self {
        Self { settings }
    }

    /// Returns a reference to the solver settings.
    pub fn settings(&self) -> &SplittingSettings {
        &self.settings
    }

    /// Split the rotation `exp(dt B̂)` of a classified, non-degenerate field vector.
    pub fn solve(
        &self,
        field: &NonDegenerateField,
        dt: f64,
        order: AxisOrder,
    ) -> (ShearVectors, SplittingReport) {
        self.solve_vector(field.vector(), dt, order)
    }

    /// Split the rotation `exp(dt B̂)` for an arbitrary field vector.
    ///
    /// The field components along `order[1]` and `order[2]` must not vanish, otherwise the
    /// result contains non-finite values.
    pub fn solve_vector(
        &self,
        b: &Vector3<f64>,
        dt: f64,
        order: AxisOrder,
    ) -> (ShearVectors, SplittingReport) {
        if dt == 0.0 {
            return (
                ShearVectors::default(),
                SplittingReport {
                    iterations: 0,
                    residual: 0.0,
                    converged: true,
                    seed: SplittingSeed::Trivial,
                },
            );
        }

        let exact = exp_antisym(b, dt);
        let bhat = b.cross_matrix();

        let (mut vectors, seed) = match self
            .settings
            .analytic_seed
            .then(|| analytic_seed(b, dt, order))
            .flatten()
        {
            Some(vectors) => (vectors, SplittingSeed::Analytic),
            None => {
                trace!("solve_vector: using the first order seed for b = {:?}", b.as_slice());

                (first_order_seed(&bhat, order), SplittingSeed::FirstOrder)
            }
        };

        let mut residual = (exact - vectors.product(dt, order)).norm();
        let mut iterations = 0;

        // The logarithm of the shear product is only the principal one within this range.
        if dt.abs() * b.norm() < PI {
            let [o0, o1, o2] = order.indices();

            let mut ym = vectors.yl + vectors.yr;

            while residual >= self.settings.tolerance && iterations < self.settings.max_iterations
            {
                let g = match logm(&vectors.product(dt, order)) {
                    Some(log) => log / dt,
                    None => break,
                };

                let delta = g - bhat;

                let mut next_ym = ym;
                let mut y2 = vectors.y2;
                let mut y3 = vectors.y3;
                let mut yr = vectors.yr;

                for k in [o1, o2] {
                    next_ym[k] -= delta[(k, o0)];
                }

                for k in [o0, o2] {
                    y2[k] -= delta[(k, o1)];
                }

                for k in [o0, o1] {
                    y3[k] -= delta[(k, o2)];
                }

                yr[o1] -= (g[(o1, o1)] / -bhat[(o0, o1)]) / dt;
                yr[o2] -= (g[(o2, o2)] / -bhat[(o0, o2)]) / dt;

                let candidate = ShearVectors {
                    yl: next_ym - yr,
                    y2,
                    y3,
                    yr,
                };

                let next_residual = (exact - candidate.product(dt, order)).norm();

                iterations += 1;

                if !(next_residual < residual) {
                    break;
                }

                vectors = candidate;
                ym = next_ym;
                residual = next_residual;
            }
        }

        (
            vectors,
            SplittingReport {
                iterations,
                residual,
                converged: residual < self.settings.tolerance,
                seed,
            },
        )
    }
}
