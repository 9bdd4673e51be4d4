use crate::splitting::{Axis, AxisOrder, ExactSplitting, SplittingReport};
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_3, TAU};

/// Largest rotation angle carried out by a single shear sequence.
///
/// Shear coefficients diverge towards a half turn and stay of order one up to this angle.
pub const MAX_SEQUENCE_ANGLE: f64 = FRAC_PI_3;

/// A field vector with at least two components above the zero tolerance.
///
/// Can only be obtained from [`RotationPlan::classify`], which pairs it with an [`AxisOrder`]
/// whose first axis carries the smallest component.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NonDegenerateField(Vector3<f64>);

impl NonDegenerateField {
    /// The field vector.
    pub fn vector(&self) -> &Vector3<f64> {
        &self.0
    }
}

/// The kind of velocity rotation at a single spatial point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RotationPlan {
    /// Two or three field components, split exactly into four shears per sub-rotation.
    ThreeAxis {
        /// The field vector.
        field: NonDegenerateField,
        /// Axes sorted by ascending field magnitude.
        order: AxisOrder,
    },
    /// A planar rotation around a single axis, split into three shears per sub-rotation.
    SingleAxis {
        /// The rotation axis.
        axis: Axis,
        /// The field component along the rotation axis.
        omega: f64,
    },
    /// No field, nothing to do.
    Degenerate,
}

impl RotationPlan {
    /// Classify a field vector by the number of components above `zero_tolerance`.
    pub fn classify(b: &Vector3<f64>, zero_tolerance: f64) -> Self {
        let count = b.iter().filter(|value| value.abs() > zero_tolerance).count();
        let order = AxisOrder::by_magnitude(b);

        match count {
            0 => RotationPlan::Degenerate,
            1 => {
                let axis = order[2];

                RotationPlan::SingleAxis {
                    axis,
                    omega: b[axis.index()],
                }
            }
            _ => RotationPlan::ThreeAxis {
                field: NonDegenerateField(*b),
                order,
            },
        }
    }

    /// Computes the ordered shear steps of the feet map `exp(-dt B̂)`.
    ///
    /// The rotation angle is first reduced to `[-π, π]` and then split into equal sub-rotations of
    /// at most [`MAX_SEQUENCE_ANGLE`], each carried out by its own shear sequence. Steps with two
    /// vanishing coefficients are dropped. The splitting report is only available for
    /// [`RotationPlan::ThreeAxis`] and describes a single sub-rotation.
    pub fn shear_steps(
        &self,
        dt: f64,
        solver: &ExactSplitting,
    ) -> (Vec<ShearStep>, Option<SplittingReport>) {
        let (steps, report) = match self {
            RotationPlan::ThreeAxis { field, order } => {
                let (dt, parts) = reduce_step(dt, field.vector().norm());
                let (vectors, report) = solver.solve(field, dt, *order);

                (
                    [
                        ShearStep::from_vector(order[0], &vectors.yr, dt),
                        ShearStep::from_vector(order[2], &vectors.y3, dt),
                        ShearStep::from_vector(order[1], &vectors.y2, dt),
                        ShearStep::from_vector(order[0], &vectors.yl, dt),
                    ]
                    .repeat(parts),
                    Some(report),
                )
            }
            RotationPlan::SingleAxis { axis, omega } => {
                let (dt, parts) = reduce_step(dt, *omega);
                let theta = dt * omega;

                let p = axis.next();
                let q = p.next();

                let tan = (-0.5 * theta).tan();
                let sin = theta.sin();

                (
                    [
                        ShearStep::along(q, p, tan),
                        ShearStep::along(p, q, sin),
                        ShearStep::along(q, p, tan),
                    ]
                    .repeat(parts),
                    None,
                )
            }
            RotationPlan::Degenerate => (Vec::new(), None),
        };

        (
            steps
                .into_iter()
                .filter(|step| !step.is_identity())
                .collect(),
            report,
        )
    }
}

/// Reduces the time step of a rotation with angular rate `omega` by whole turns and splits it
/// into equal sub-steps of at most [`MAX_SEQUENCE_ANGLE`].
///
/// Returns the sub-step and the number of sub-steps. Without whole turns `dt` is kept exactly.
fn reduce_step(dt: f64, omega: f64) -> (f64, usize) {
    let turns = (dt * omega / TAU).round();
    let dt = dt - turns * TAU / omega;

    let parts = ((dt * omega).abs() / MAX_SEQUENCE_ANGLE).ceil().max(1.0) as usize;

    (dt / parts as f64, parts)
}

/// A single shear of the velocity coordinate `axis`.
///
/// The feet are displaced by `coefs[0] (v_a - u_a) + coefs[1] (v_b - u_b)` where `a < b` are the
/// two other axes.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct ShearStep {
    /// The sheared axis.
    pub axis: Axis,

    /// Shear coefficients of the two other axes, in ascending axis order.
    pub coefs: [f64; 2],
}

impl ShearStep {
    /// A shear along `axis` from the shear vector `y` over the time `dt`.
    pub fn from_vector(axis: Axis, y: &Vector3<f64>, dt: f64) -> Self {
        let [a, b] = axis.others();

        Self {
            axis,
            coefs: [dt * y[a.index()], dt * y[b.index()]],
        }
    }

    /// A shear along `axis` that depends on the single axis `other`.
    pub fn along(axis: Axis, other: Axis, coef: f64) -> Self {
        let [a, _] = axis.others();

        Self {
            axis,
            coefs: if other == a { [coef, 0.0] } else { [0.0, coef] },
        }
    }

    /// Returns `true` if both coefficients are exactly zero.
    pub fn is_identity(&self) -> bool {
        self.coefs == [0.0, 0.0]
    }

    /// The linear feet map `v ↦ v + e_axis (coefs · v)` as a matrix.
    pub fn matrix(&self) -> Matrix3<f64> {
        let [a, b] = self.axis.others();
        let mut matrix = Matrix3::identity();

        matrix[(self.axis.index(), a.index())] = self.coefs[0];
        matrix[(self.axis.index(), b.index())] = self.coefs[1];

        matrix
    }
}
