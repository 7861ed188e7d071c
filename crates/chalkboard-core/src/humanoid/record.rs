//! Per-humanoid AI record

use serde::{Deserialize, Serialize};

use crate::collision::HumanoidMask;
use crate::types::EntityId;

/// Locomotion state evaluated once per AI tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LocomotionState {
    #[default]
    Walking,
    /// Inside a ladder below its top landing
    Climbing,
    /// Walking across a ladder's top landing
    OnLadderTop,
    /// Holding onto a drawn stroke
    Hanging,
}

/// AI state for one humanoid body
#[derive(Debug, Clone, PartialEq)]
pub struct HumanoidRecord {
    /// Body this record drives
    pub entity: EntityId,

    /// Intended heading, +1 right or -1 left
    pub direction: f32,

    /// Gait phase, grows every walking tick
    pub leg_phase: f32,

    /// Consecutive ticks observed barely moving
    pub stuck_counter: u32,

    pub state: LocomotionState,

    /// Ticks left holding onto a stroke (0 when not hanging)
    pub hanging_counter: u32,

    /// Bubble carrying this humanoid
    pub contained_in: Option<EntityId>,
}

impl HumanoidRecord {
    pub fn new(entity: EntityId, direction: f32) -> Self {
        Self {
            entity,
            direction: if direction < 0.0 { -1.0 } else { 1.0 },
            leg_phase: 0.0,
            stuck_counter: 0,
            state: LocomotionState::Walking,
            hanging_counter: 0,
            contained_in: None,
        }
    }

    pub fn is_climbing(&self) -> bool {
        self.state == LocomotionState::Climbing
    }

    pub fn is_hanging(&self) -> bool {
        self.hanging_counter > 0
    }

    pub fn is_contained(&self) -> bool {
        self.contained_in.is_some()
    }

    /// Collision mask matching the current state
    pub fn mask(&self) -> HumanoidMask {
        if self.is_contained() {
            HumanoidMask::Contained
        } else if self.is_climbing() {
            HumanoidMask::Climbing
        } else {
            HumanoidMask::Default
        }
    }
}
