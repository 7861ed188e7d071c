//! Entity kinds, blueprints and spawn placement

mod factory;
mod kind;
mod spawn;

pub use factory::*;
pub use kind::*;
pub use spawn::{SpawnPoint, humanoid_spawn_position, random_spawn_position};
