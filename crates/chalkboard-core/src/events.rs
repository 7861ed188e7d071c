//! Signals emitted to the host (sound cues and UI notifications)

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::KindTag;
use crate::types::EntityId;

/// Something the host may want to react to
///
/// Events accumulate inside the simulation until drained with
/// [`crate::Simulation::drain_events`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// A walking humanoid completed a stride
    Footstep { humanoid: EntityId },
    /// A humanoid jumped (obstacle jump, escape jump or idle hop)
    Jumped { humanoid: EntityId },
    BubbleCaptured { bubble: EntityId, humanoid: EntityId },
    /// A bubble carrying a passenger was removed
    BubblePopped { bubble: EntityId, position: Vec2 },
    CoinPopped { block: EntityId, coin: EntityId },
    RouletteSpin { roulette: EntityId },
    RouletteResult { roulette: EntityId, won: bool },
    /// Clear-all removed every drawn stroke
    SceneCleared { removed: usize },
    EntitySpawned { id: EntityId, kind: KindTag },
}

impl SimEvent {
    /// Short identifier used in logs and scenario verification
    pub fn label(&self) -> &'static str {
        match self {
            SimEvent::Footstep { .. } => "footstep",
            SimEvent::Jumped { .. } => "jumped",
            SimEvent::BubbleCaptured { .. } => "bubble_captured",
            SimEvent::BubblePopped { .. } => "bubble_popped",
            SimEvent::CoinPopped { .. } => "coin_popped",
            SimEvent::RouletteSpin { .. } => "roulette_spin",
            SimEvent::RouletteResult { .. } => "roulette_result",
            SimEvent::SceneCleared { .. } => "scene_cleared",
            SimEvent::EntitySpawned { .. } => "entity_spawned",
        }
    }
}
