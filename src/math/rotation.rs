use nalgebra::{Matrix3, Vector3};

/// Computes `exp(t * [w]ₓ) - I` for the antisymmetric generator `[w]ₓ` of the vector `w`.
///
/// The result is exact up to rounding also for small rotation angles, as `1 - cos(θ)` is
/// evaluated as `2 sin²(θ/2)`.
pub fn expm1_antisym(w: &Vector3<f64>, t: f64) -> Matrix3<f64> {
    let theta = t * w.norm();

    if theta == 0.0 {
        return Matrix3::zeros();
    }

    let k = w.cross_matrix() * t;
    let half_sin = (theta / 2.0).sin();

    k * (theta.sin() / theta) + k * k * (2.0 * half_sin * half_sin / (theta * theta))
}

/// Computes the rotation matrix `exp(t * [w]ₓ)` using the Rodrigues formula.
pub fn exp_antisym(w: &Vector3<f64>, t: f64) -> Matrix3<f64> {
    Matrix3::identity() + expm1_antisym(w, t)
}
