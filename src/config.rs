//! Simulation configuration files (JSON5).

use crate::{
    advection::RotationAdvection,
    field::{DistributionFunction, FieldError, MaxwellianEquilibrium, SpatialVectorField},
    interp::{InterpolatorError, SplineInterpolator},
    mesh::PhaseSpace,
    species::SpeciesInfo,
    splitting::SplittingSettings,
};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::{fs, io::Write, path::Path, str::FromStr};
use thiserror::Error;

/// Errors associated with simulation configurations.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access the configuration file")]
    Io(#[from] std::io::Error),
    #[error("failed to parse the configuration")]
    Json5(#[from] serde_json5::Error),
    #[error("invalid interpolator")]
    Interpolator(#[from] InterpolatorError),
    #[error("invalid initial state")]
    Field(#[from] FieldError),
    #[error("invalid time step {dt}")]
    InvalidTimeStep { dt: f64 },
}

/// The velocity rotation operator with cubic splines along all three axes.
pub type SplineRotationAdvection =
    RotationAdvection<SplineInterpolator, SplineInterpolator, SplineInterpolator>;

/// A gyration simulation in a uniform magnetic field.
///
/// ```
/// # use bslrot::config::SimulationConfig;
/// let config: SimulationConfig = r#"{
///     phase_space: {
///         x: { min: 0.0, max: 1.0, points: 4 },
///         velocity: {
///             vx: { min: -6.0, max: 6.0, points: 32 },
///             vy: { min: -6.0, max: 6.0, points: 32 },
///             vz: { min: -6.0, max: 6.0, points: 32 },
///         },
///     },
///     species: [{ name: "ions", charge: 1.0, mass: 1.0 }],
///     equilibrium: {
///         density: [1.0],
///         temperature: [1.0],
///         mean_velocity: [[1.0, 0.0, 0.0]],
///     },
///     magnetic_field: [0.0, 0.3, 1.0],
///     dt: 0.1,
///     steps: 10,
/// }"#
/// .parse()
/// .unwrap();
///
/// assert!(config.splitting.max_iterations == 500);
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SimulationConfig {
    /// Phase space mesh.
    pub phase_space: PhaseSpace,

    /// Kinetic species.
    pub species: SpeciesInfo,

    /// Initial state.
    pub equilibrium: MaxwellianEquilibrium,

    /// Uniform magnetic field.
    pub magnetic_field: Vector3<f64>,

    /// Time step.
    pub dt: f64,

    /// Number of time steps.
    pub steps: usize,

    /// Exact splitting settings.
    #[serde(default)]
    pub splitting: SplittingSettings,
}

impl SimulationConfig {
    /// Load a configuration from a JSON5 file.
    pub fn from_file<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        fs::read_to_string(path)?.parse()
    }

    /// Serialize the configuration to a JSON5 file.
    pub fn save<P>(&self, path: P) -> Result<(), ConfigError>
    where
        P: AsRef<Path>,
    {
        let mut file = fs::File::create(path)?;

        file.write_all(serde_json5::to_string(&self)?.as_bytes())?;

        Ok(())
    }

    /// Create the rotation operator on the velocity mesh.
    pub fn advection(&self) -> Result<SplineRotationAdvection, ConfigError> {
        let velocity = &self.phase_space.velocity;

        Ok(RotationAdvection::new(
            SplineInterpolator::new(velocity.vx.clone())?,
            SplineInterpolator::new(velocity.vy.clone())?,
            SplineInterpolator::new(velocity.vz.clone())?,
            self.splitting.clone(),
        ))
    }

    /// Create the initial distribution function from the equilibrium.
    pub fn initial_distribution(&self) -> Result<DistributionFunction, ConfigError> {
        let mut f = DistributionFunction::zeros(self.species.len(), &self.phase_space);

        self.equilibrium
            .init(&mut f, &self.species, &self.phase_space)?;

        Ok(f)
    }

    /// The magnetic field on the spatial grid.
    pub fn magnetic_field(&self) -> SpatialVectorField {
        SpatialVectorField::uniform(self.magnetic_field, self.phase_space.x.len())
    }
}

impl FromStr for SimulationConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config = serde_json5::from_str::<SimulationConfig>(s)?;

        if !config.dt.is_finite() {
            return Err(ConfigError::InvalidTimeStep { dt: config.dt });
        }

        Ok(config)
    }
}
