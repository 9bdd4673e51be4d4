use nalgebra::Matrix3;

/// Maximum number of square roots taken before the logarithm series is evaluated.
const MAX_SQUARE_ROOTS: u32 = 32;

/// Maximum number of Denman–Beavers iterations for a single square root.
const MAX_DB_ITERATIONS: usize = 64;

/// Maximum number of odd terms in the `atanh` series.
const MAX_SERIES_TERMS: usize = 64;

/// Distance to the identity (Frobenius norm) below which the series is evaluated.
const SERIES_RADIUS: f64 = 0.25;

/// Computes the principal square root of a real 3×3 matrix with the Denman–Beavers iteration.
///
/// Returns `None` if one of the intermediate matrices is singular.
pub fn sqrtm(a: &Matrix3<f64>) -> Option<Matrix3<f64>> {
    let mut y = *a;
    let mut z = Matrix3::identity();

    for _ in 0..MAX_DB_ITERATIONS {
        let y_inv = y.try_inverse()?;
        let z_inv = z.try_inverse()?;

        let y_next = (y + z_inv) * 0.5;
        let z_next = (z + y_inv) * 0.5;

        let step = (y_next - y).norm();

        y = y_next;
        z = z_next;

        if step <= 4.0 * f64::EPSILON * y.norm() {
            break;
        }
    }

    Some(y)
}

/// Computes the principal logarithm of a real 3×3 matrix by inverse scaling and squaring.
///
/// The matrix is brought close to the identity by repeated square roots, after which
/// `log(X) = 2 atanh((X - I)(X + I)⁻¹)` is summed as a power series and scaled back.
/// Returns `None` if the matrix has no real principal logarithm that can be reached this way
/// (e.g. eigenvalues on the closed negative real axis).
pub fn logm(a: &Matrix3<f64>) -> Option<Matrix3<f64>> {
    let identity = Matrix3::identity();

    let mut x = *a;
    let mut roots = 0;

    while (x - identity).norm() > SERIES_RADIUS {
        if roots == MAX_SQUARE_ROOTS {
            return None;
        }

        x = sqrtm(&x)?;
        roots += 1;
    }

    let z = (x - identity) * (x + identity).try_inverse()?;
    let z2 = z * z;

    let mut term = z;
    let mut sum = z;

    for n in 1..MAX_SERIES_TERMS {
        term *= z2;

        let next = term / (2 * n + 1) as f64;
        sum += next;

        if next.norm() <= f64::EPSILON * sum.norm() {
            break;
        }
    }

    let result = sum * (2.0 * (1u64 << roots) as f64);

    if result.iter().all(|value| value.is_finite()) {
        Some(result)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::exp_antisym;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_logm_identity() {
        assert!(logm(&Matrix3::identity()).unwrap() == Matrix3::zeros());
    }

    #[test]
    fn test_logm_rotation() {
        for (w, t) in [
            (Vector3::new(0.0, 0.0, 1.0), 0.1),
            (Vector3::new(0.3, -0.4, 1.2), 0.5),
            (Vector3::new(-1.0, 2.0, 0.5), 1.0),
            (Vector3::new(2.0, 1.0, -1.5), -0.9),
        ] {
            let log = logm(&exp_antisym(&w, t)).unwrap();

            assert_relative_eq!(log, w.cross_matrix() * t, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_logm_diagonal() {
        let a = Matrix3::from_diagonal(&Vector3::new(2.0, 0.5, 1.0));
        let log = logm(&a).unwrap();

        assert_relative_eq!(
            log,
            Matrix3::from_diagonal(&Vector3::new(2.0_f64.ln(), 0.5_f64.ln(), 0.0)),
            epsilon = 1e-13
        );
    }

    #[test]
    fn test_logm_negative_eigenvalue() {
        // A half turn has the eigenvalue -1 twice and no real principal logarithm.
        assert!(logm(&Matrix3::from_diagonal(&Vector3::new(-1.0, -1.0, 1.0))).is_none());
    }

    #[test]
    fn test_sqrtm() {
        let a = exp_antisym(&Vector3::new(0.5, 0.2, -0.3), 1.3);
        let root = sqrtm(&a).unwrap();

        assert_relative_eq!(root * root, a, epsilon = 1e-14);
        assert_relative_eq!(root, exp_antisym(&Vector3::new(0.5, 0.2, -0.3), 0.65), epsilon = 1e-14);
    }
}
