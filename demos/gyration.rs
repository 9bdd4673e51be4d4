use bslrot::{
    config::SimulationConfig,
    field::{DistributionFunction, SpatialVectorField},
};
use chrono::Local;
use env_logger::Builder;
use log::{info, warn};
use nalgebra::Vector3;
use std::io::prelude::*;

const DEFAULT_CONFIG: &str = r#"{
    phase_space: {
        x: { min: 0.0, max: 1.0, points: 4 },
        velocity: {
            vx: { min: -6.0, max: 6.0, points: 32 },
            vy: { min: -6.0, max: 6.0, points: 32 },
            vz: { min: -6.0, max: 6.0, points: 32 },
        },
    },
    species: [
        { name: "electrons", charge: -1.0, mass: 1.0 },
        { name: "ions", charge: 1.0, mass: 4.0 },
    ],
    equilibrium: {
        density: [1.0, 1.0],
        temperature: [1.0, 0.5],
        mean_velocity: [[1.5, 0.0, 0.0], [0.0, 1.0, 0.0]],
    },
    magnetic_field: [0.2, 0.5, 1.0],
    dt: 0.1,
    steps: 100,
}"#;

fn main() {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%dT%H:%M:%S.%f"),
                record.level(),
                record.args()
            )
        })
        .filter(None, log::LevelFilter::Info)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::from_file(path).unwrap(),
        None => DEFAULT_CONFIG.parse::<SimulationConfig>().unwrap(),
    };

    let advection = config.advection().unwrap();
    let magnetic_field = config.magnetic_field();
    let mean_velocity = SpatialVectorField::uniform(Vector3::zeros(), config.phase_space.x.len());

    let mut f = config.initial_distribution().unwrap();

    let dv3 = config.phase_space.velocity.vx.step()
        * config.phase_space.velocity.vy.step()
        * config.phase_space.velocity.vz.step();

    let mass = |f: &DistributionFunction| {
        (0..config.species.len())
            .map(|isp| f.slice_point(isp, 0).sum() * dv3)
            .collect::<Vec<f64>>()
    };

    let initial_mass = mass(&f);

    info!(
        "gyration: {} steps of {} for {} species on {:?}",
        config.steps,
        config.dt,
        config.species.len(),
        config.phase_space.shape()
    );

    for step in 0..config.steps {
        let report = advection
            .advect(
                &mut f,
                &config.species,
                &config.phase_space,
                &magnetic_field,
                &mean_velocity,
                config.dt,
            )
            .unwrap();

        if report.not_converged > 0 {
            warn!(
                "gyration: step {} has {} non-converged splittings",
                step, report.not_converged
            );
        }

        if step % 10 == 0 {
            info!(
                "gyration: step {} with {} shears, max residual {:.2e} in {:.2} sec",
                step, report.shears, report.max_residual, report.elapsed
            );
        }
    }

    for (species, (initial, last)) in config
        .species
        .iter()
        .zip(initial_mass.iter().zip(mass(&f).iter()))
    {
        info!(
            "gyration: {} mass {:.6} -> {:.6} (relative change {:.2e})",
            species.name,
            initial,
            last,
            (last - initial) / initial
        );
    }
}
