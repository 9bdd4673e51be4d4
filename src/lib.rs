#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

pub mod advection;
pub mod config;
pub mod field;
pub mod interp;
pub mod math;
pub mod mesh;
pub mod species;
pub mod splitting;
