//! Simulation core for the Chalkboard sandbox
//!
//! This crate implements:
//! - A rapier2d-backed physics world with a body registry on top
//! - Entity blueprints for balls, humanoids, ladders, clouds, bubbles and props
//! - The freehand stroke pipeline that turns pointer drags into collision geometry
//! - Humanoid locomotion (walking, climbing, hanging, stuck recovery)
//! - Cross-entity world rules, spawning and out-of-bounds cleanup
//! - A deterministic tick scheduler driving all of the above

pub mod collision;
pub mod config;
pub mod entity;
pub mod events;
pub mod humanoid;
pub mod lifecycle;
pub mod physics;
pub mod registry;
pub mod render;
pub mod rng_trait;
pub mod rules;
pub mod scheduler;
pub mod simulation;
pub mod stroke;
pub mod types;

pub use config::SimConfig;
pub use entity::{EntityBlueprint, EntityFactory, EntityKind, KindTag};
pub use events::SimEvent;
pub use humanoid::{HumanoidRecord, LocomotionState};
pub use physics::{Bounds, PhysicsWorld};
pub use registry::{BodyList, BodyRegistry};
pub use render::{BodyRenderData, HumanoidRenderData, RenderShape, RenderStyle, Renderer};
pub use rng_trait::SimRng;
pub use simulation::{SimStats, Simulation, SimulationState, UiSpawn};
pub use stroke::{PointerMode, StrokePipeline};
pub use types::{EntityId, SimError};
