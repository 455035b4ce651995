// lib.rs - Library exports for the binary and integration tests

pub mod error;
pub mod models;
pub mod config;
pub mod bootstrap;
pub mod chain;
pub mod math;
pub mod engine;
pub mod web;

pub use error::{Error, MathError, Result, SimulationError};
