use crate::{advection::ShearStep, interp::Interpolator1D, mesh::VelocityMesh};
use nalgebra::Vector3;
use ndarray::{Array3, ArrayView2, ArrayViewMut3, Axis, Zip};

/// Applies a single shear to the velocity space slice `f` of one species at one spatial point.
///
/// The feet along every line of `step.axis` are written into `feet`, after which
/// [`Interpolator1D::interpolate_batch`] resamples each line in place. Both passes run in
/// parallel over the lines. The boundary derivative buffers are shaped like the batch of lines,
/// i.e. the two other velocity axes in ascending order.
#[allow(clippy::too_many_arguments)]
pub fn apply_shear(
    step: &ShearStep,
    f: ArrayViewMut3<f64>,
    feet: &mut Array3<f64>,
    mesh: &VelocityMesh,
    mean_velocity: &Vector3<f64>,
    interpolator: &dyn Interpolator1D,
    deriv_min: ArrayView2<f64>,
    deriv_max: ArrayView2<f64>,
) {
    let axis = Axis(step.axis.index());
    let [a, b] = step.axis.others();

    let grid = mesh.grid(step.axis);
    let (grid_a, grid_b) = (mesh.grid(a), mesh.grid(b));
    let (mean_a, mean_b) = (mean_velocity[a.index()], mean_velocity[b.index()]);

    Zip::indexed(feet.lanes_mut(axis)).par_for_each(|(ia, ib), mut line| {
        let dv =
            (grid_a.coord(ia) - mean_a) * step.coefs[0] + (grid_b.coord(ib) - mean_b) * step.coefs[1];

        line.indexed_iter_mut()
            .for_each(|(i, foot)| *foot = grid.coord(i) + dv);
    });

    interpolator.interpolate_batch(f, feet.view(), axis, deriv_min, deriv_max);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{interp::SplineInterpolator, mesh::UniformGrid, splitting::Axis as VAxis};
    use approx::assert_relative_eq;
    use ndarray::Array2;

    fn quadratic(v: &Vector3<f64>) -> f64 {
        v[0] * v[0] - 0.5 * v[1] * v[2] + v[2]
    }

    #[test]
    fn test_apply_shear_linear_feet() {
        let grid = UniformGrid::new(-4.0, 4.0, 33).unwrap();
        let mesh = VelocityMesh {
            vx: grid.clone(),
            vy: UniformGrid::new(-1.0, 1.0, 9).unwrap(),
            vz: UniformGrid::new(-1.0, 1.0, 5).unwrap(),
        };

        let interpolator = SplineInterpolator::new(grid.clone()).unwrap();
        let mean = Vector3::new(0.0, 0.25, -0.5);

        let coord = |i: usize, j: usize, k: usize| {
            Vector3::new(mesh.vx.coord(i), mesh.vy.coord(j), mesh.vz.coord(k))
        };

        let mut f = Array3::from_shape_fn((33, 9, 5), |(i, j, k)| quadratic(&coord(i, j, k)));
        let mut feet = Array3::zeros((33, 9, 5));

        // vx' = vx + 0.1 (vy - uy) - 0.2 (vz - uz)
        let step = ShearStep {
            axis: VAxis::X,
            coefs: [0.1, -0.2],
        };

        let dmin = Array2::zeros((9, 5));
        let dmax = Array2::zeros((9, 5));

        apply_shear(
            &step,
            f.view_mut(),
            &mut feet,
            &mesh,
            &mean,
            &interpolator,
            dmin.view(),
            dmax.view(),
        );

        for ((i, j, k), value) in f.indexed_iter() {
            let v = coord(i, j, k);
            let foot = v[0] + 0.1 * (v[1] - mean[1]) - 0.2 * (v[2] - mean[2]);

            assert_relative_eq!(feet[[i, j, k]], foot, epsilon = 1e-14);

            // Away from the clamped boundaries the spline is close to the parabola.
            if foot.abs() < 2.0 {
                assert_relative_eq!(
                    *value,
                    quadratic(&Vector3::new(foot, v[1], v[2])),
                    epsilon = 1e-3
                );
            }
        }
    }
}
