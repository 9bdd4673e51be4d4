use crate::{
    math::expm1_antisym,
    splitting::{AxisOrder, ShearVectors},
};
use nalgebra::{Matrix3, Vector3};

/// Closed-form factorization of `exp(t B̂)` into four shears.
///
/// In the frame permuted by `order`, the outer shears are fixed by requiring that
/// `(I - t yl e_0ᵀ) R (I - t yr e_0ᵀ)` leaves `e_0` invariant and has a unit `(1, 1)` entry,
/// which leaves a 2×2 linear system for `yr`. The inner shears are then read off the remaining
/// matrix. All entries are computed from `R - I` to avoid cancellation for small rotations.
///
/// Returns `None` if any of the resulting components is not finite, which happens if `R[o0][o1]`
/// or the 2×2 determinant vanishes.
pub(crate) fn analytic_seed(b: &Vector3<f64>, t: f64, order: AxisOrder) -> Option<ShearVectors> {
    let o = order.indices();
    let dm = expm1_antisym(b, t);
    let d = |i: usize, j: usize| dm[(o[i], o[j])];

    let p1 = d(1, 1) / d(0, 1);

    let det = d(0, 1) * d(1, 2) - d(0, 2) * (1.0 + d(1, 1));
    let rhs = (d(0, 0), d(1, 0) - p1);

    let s1 = (rhs.0 * d(1, 2) - d(0, 2) * rhs.1) / det;
    let s2 = (d(0, 1) * rhs.1 - (1.0 + d(1, 1)) * rhs.0) / det;

    let p2 = d(2, 0) - d(2, 1) * s1 - (1.0 + d(2, 2)) * s2;

    let q0 = d(0, 1);
    let q2 = d(2, 1) - p2 * d(0, 1);
    let r1 = d(1, 2) - p1 * d(0, 2);
    let r0 = d(0, 2) - r1 * q0;

    // Back from the permuted frame, undoing the time scaling.
    let unpermute = |v: [f64; 3]| {
        let mut result = Vector3::zeros();

        for k in 0..3 {
            result[o[k]] = v[k] / t;
        }

        result
    };

    let vectors = ShearVectors {
        yl: unpermute([0.0, p1, p2]),
        y2: unpermute([q0, 0.0, q2]),
        y3: unpermute([r0, r1, 0.0]),
        yr: unpermute([0.0, s1, s2]),
    };

    if [vectors.yl, vectors.y2, vectors.y3, vectors.yr]
        .iter()
        .all(|v| v.iter().all(|value| value.is_finite()))
    {
        Some(vectors)
    } else {
        None
    }
}

/// First-order seed built from the columns of the generator `bhat`.
///
/// The inner vectors are the generator columns `o1` and `o2`. The outer column `o0` is split into
/// `yl + yr` such that the diagonal of the second order commutator terms vanishes.
pub(crate) fn first_order_seed(bhat: &Matrix3<f64>, order: AxisOrder) -> ShearVectors {
    let [o0, o1, o2] = order.indices();

    let ym = bhat.column(o0).into_owned();
    let y2 = bhat.column(o1).into_owned();
    let y3 = bhat.column(o2).into_owned();

    let b01 = bhat[(o0, o1)];
    let b02 = bhat[(o0, o2)];
    let b12 = bhat[(o1, o2)];

    let mut yr = Vector3::zeros();

    yr[o1] = (b01 * b01 - b12 * b12) / (2.0 * -b01);
    yr[o2] = (b02 * b02 + b12 * b12) / (2.0 * -b02);

    ShearVectors {
        yl: ym - yr,
        y2,
        y3,
        yr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::exp_antisym;

    #[test]
    fn test_analytic_seed_all_orders() {
        let b = Vector3::new(0.4, -0.7, 0.9);
        let t = 0.6;

        for order in AxisOrder::all() {
            let vectors = analytic_seed(&b, t, order).unwrap();

            assert!(vectors.is_pure(order));
            assert!((vectors.product(t, order) - exp_antisym(&b, t)).norm() < 1e-14);
        }
    }

    #[test]
    fn test_analytic_seed_singular() {
        // Without a field along `order[1]` and `order[2]` there is no such factorization.
        let b = Vector3::new(0.0, 0.0, 0.5);

        assert!(analytic_seed(&b, 0.3, AxisOrder::by_magnitude(&b)).is_none());
    }

    #[test]
    fn test_first_order_seed() {
        let b = Vector3::new(0.3, -0.5, 0.8);
        let order = AxisOrder::by_magnitude(&b);
        let vectors = first_order_seed(&b.cross_matrix(), order);

        assert!(vectors.is_pure(order));

        let err_coarse = (vectors.product(1e-3, order) - exp_antisym(&b, 1e-3)).norm();
        let err_fine = (vectors.product(1e-4, order) - exp_antisym(&b, 1e-4)).norm();

        // The seed is accurate to second order.
        assert!(err_coarse < 1e-6);
        assert!(err_fine < 0.02 * err_coarse);
    }
}
