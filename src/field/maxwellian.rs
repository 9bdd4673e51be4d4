use crate::{
    field::{DistributionFunction, FieldError},
    mesh::PhaseSpace,
    species::SpeciesInfo,
};
use log::debug;
use nalgebra::Vector3;
use ndarray::{Axis, Zip, s};
use serde::{Deserialize, Serialize};
use std::{f64::consts::PI, time::Instant};

/// Drifting Maxwellian equilibria, one set of moments per species.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MaxwellianEquilibrium {
    /// Species densities.
    pub density: Vec<f64>,

    /// Species temperatures.
    pub temperature: Vec<f64>,

    /// Species mean velocities.
    pub mean_velocity: Vec<Vector3<f64>>,
}

impl MaxwellianEquilibrium {
    /// Evaluates `n / (2π T / m)^(3/2) exp(-m |v - u|² / (2 T))`.
    pub fn maxwellian(
        density: f64,
        temperature: f64,
        mass: f64,
        mean_velocity: &Vector3<f64>,
        velocity: &Vector3<f64>,
    ) -> f64 {
        let norm = (2.0 * PI * temperature / mass).powf(1.5);

        density / norm * (-mass * (velocity - mean_velocity).norm_squared() / (2.0 * temperature)).exp()
    }

    /// Fill the distribution function with the equilibrium at every spatial point.
    pub fn init(
        &self,
        f: &mut DistributionFunction,
        species: &SpeciesInfo,
        phase_space: &PhaseSpace,
    ) -> Result<(), FieldError> {
        let count = species.len();

        for got in [
            self.density.len(),
            self.temperature.len(),
            self.mean_velocity.len(),
            f.len_of(Axis(0)),
        ] {
            if got != count {
                return Err(FieldError::SpeciesCountMismatch {
                    expected: count,
                    got,
                });
            }
        }

        if let Some((isp, temperature)) = self
            .temperature
            .iter()
            .enumerate()
            .find(|(_, temperature)| !(temperature.is_finite() && **temperature > 0.0))
        {
            return Err(FieldError::InvalidTemperature {
                species: isp,
                temperature: *temperature,
            });
        }

        let start = Instant::now();
        let velocity = &phase_space.velocity;

        for isp in 0..count {
            let mass = species.mass(isp);

            Zip::indexed(f.slice_mut(s![isp, .., .., .., ..])).par_for_each(
                |(_, ivx, ivy, ivz), value| {
                    let v = Vector3::new(
                        velocity.vx.coord(ivx),
                        velocity.vy.coord(ivy),
                        velocity.vz.coord(ivz),
                    );

                    *value = Self::maxwellian(
                        self.density[isp],
                        self.temperature[isp],
                        mass,
                        &self.mean_velocity[isp],
                        &v,
                    );
                },
            );
        }

        debug!(
            "maxwellian_init: {:2.2}M values in {:.2} sec",
            f.len() as f64 / 1e6,
            start.elapsed().as_millis() as f64 / 1e3
        );

        Ok(())
    }
}
