//! Particle species registry.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors associated with the species registry.
#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq)]
pub enum SpeciesError {
    #[error("the species registry is empty")]
    Empty,
    #[error("species {name} has an invalid mass {mass}")]
    InvalidMass { name: String, mass: f64 },
    #[error("species {name} has an invalid charge {charge}")]
    InvalidCharge { name: String, charge: f64 },
}

/// A single kinetic particle species.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Species {
    /// Species name.
    pub name: String,

    /// Charge in units of the elementary charge.
    pub charge: f64,

    /// Mass in normalized units.
    pub mass: f64,
}

impl Species {
    /// Create a new [`Species`].
    pub fn new(name: impl Into<String>, charge: f64, mass: f64) -> Self {
        Self {
            name: name.into(),
            charge,
            mass,
        }
    }
}

/// Validated registry of all kinetic species.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(try_from = "Vec<Species>", into = "Vec<Species>")]
pub struct SpeciesInfo(Vec<Species>);

impl SpeciesInfo {
    /// Create a new registry, all masses must be strictly positive.
    pub fn new(species: Vec<Species>) -> Result<Self, SpeciesError> {
        if species.is_empty() {
            return Err(SpeciesError::Empty);
        }

        for sp in species.iter() {
            if !sp.charge.is_finite() {
                return Err(SpeciesError::InvalidCharge {
                    name: sp.name.clone(),
                    charge: sp.charge,
                });
            }

            if !(sp.mass.is_finite() && sp.mass > 0.0) {
                return Err(SpeciesError::InvalidMass {
                    name: sp.name.clone(),
                    mass: sp.mass,
                });
            }
        }

        Ok(Self(species))
    }

    /// Charge of the species with index `isp`.
    pub fn charge(&self, isp: usize) -> f64 {
        self.0[isp].charge
    }

    /// Returns an iterator over all species.
    pub fn iter(&self) -> impl Iterator<Item = &Species> {
        self.0.iter()
    }

    /// Number of species.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`, a registry contains at least one species.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Mass of the species with index `isp`.
    pub fn mass(&self, isp: usize) -> f64 {
        self.0[isp].mass
    }

    /// Charge to mass ratio of the species with index `isp`.
    pub fn q_over_m(&self, isp: usize) -> f64 {
        self.charge(isp) / self.mass(isp)
    }
}

impl TryFrom<Vec<Species>> for SpeciesInfo {
    type Error = SpeciesError;

    fn try_from(value: Vec<Species>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SpeciesInfo> for Vec<Species> {
    fn from(value: SpeciesInfo) -> Self {
        value.0
    }
}
