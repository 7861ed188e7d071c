//! # Chalkboard - physics drawing sandbox host
//!
//! Headless host for `chalkboard-core`: layered configuration, RON
//! scenarios and CPU-rendered PNG snapshots.

#[cfg(not(target_arch = "wasm32"))]
pub mod config;
pub mod headless;
#[cfg(not(target_arch = "wasm32"))]
pub mod scenario;

// Re-export the simulation core for convenience
pub use chalkboard_core as core;
pub use chalkboard_core::{PointerMode, SimConfig, SimEvent, Simulation, UiSpawn};
