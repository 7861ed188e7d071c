//! Entity kinds and their per-kind state

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::types::EntityId;

/// Cloud rain timer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CloudState {
    /// Seconds accumulated toward the next rain attempt
    pub rain_timer: f32,
}

/// Bubble payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BubbleState {
    /// Captured humanoid, at most one
    pub contained: Option<EntityId>,
    /// Sway phase offset so bubbles do not move in lockstep
    pub phase: f32,
}

/// Fixed-floating payload (placed bars)
#[derive(Debug, Clone, PartialEq)]
pub struct FixedFloatingState {
    /// Position the body snaps back to when not grabbed
    pub fixed_position: Vec2,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionBlockState {
    /// Simulation time before which hits are ignored
    pub cooldown_until: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoulettePhase {
    Idle,
    Spinning { remaining_steps: u32 },
    Won,
    Lost,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouletteState {
    pub phase: RoulettePhase,
    /// Visual face, flipped periodically while spinning
    pub face_up: bool,
    pub spin_steps: u32,
}

impl Default for RouletteState {
    fn default() -> Self {
        Self {
            phase: RoulettePhase::Idle,
            face_up: true,
            spin_steps: 0,
        }
    }
}

impl RouletteState {
    /// Won and Lost are resting states; a new hit starts another spin
    pub fn is_spinning(&self) -> bool {
        matches!(self.phase, RoulettePhase::Spinning { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawnLineState {
    /// Simulation time the stroke was fused
    pub created_at: f64,
}

/// What a tracked body is, with the state its rules need
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Ground,
    Ball,
    Humanoid,
    Ladder,
    Cloud(CloudState),
    Bubble(BubbleState),
    FloatingBar(FixedFloatingState),
    QuestionBlock(QuestionBlockState),
    Coin,
    Raindrop,
    Roulette(RouletteState),
    /// Static segment laid down while a stroke is in progress
    WallSegment,
    /// Fused stroke compound
    DrawnLine(DrawnLineState),
}

impl EntityKind {
    pub fn tag(&self) -> KindTag {
        match self {
            EntityKind::Ground => KindTag::Ground,
            EntityKind::Ball => KindTag::Ball,
            EntityKind::Humanoid => KindTag::Humanoid,
            EntityKind::Ladder => KindTag::Ladder,
            EntityKind::Cloud(_) => KindTag::Cloud,
            EntityKind::Bubble(_) => KindTag::Bubble,
            EntityKind::FloatingBar(_) => KindTag::FloatingBar,
            EntityKind::QuestionBlock(_) => KindTag::QuestionBlock,
            EntityKind::Coin => KindTag::Coin,
            EntityKind::Raindrop => KindTag::Raindrop,
            EntityKind::Roulette(_) => KindTag::Roulette,
            EntityKind::WallSegment => KindTag::WallSegment,
            EntityKind::DrawnLine(_) => KindTag::DrawnLine,
        }
    }

    /// Floating but not fixed: gravity is cancelled every step
    pub fn is_floating(&self) -> bool {
        matches!(self, EntityKind::Cloud(_) | EntityKind::DrawnLine(_))
    }

    /// Obstacles the humanoid probes look at
    pub fn is_wall(&self) -> bool {
        matches!(self, EntityKind::WallSegment | EntityKind::DrawnLine(_))
    }

    /// Solid bodies a humanoid can stand on. Ladders are excluded since
    /// humanoids pass through them.
    pub fn is_footing(&self) -> bool {
        matches!(
            self,
            EntityKind::Ground
                | EntityKind::Ball
                | EntityKind::FloatingBar(_)
                | EntityKind::QuestionBlock(_)
                | EntityKind::Roulette(_)
        ) || self.is_wall()
    }

    /// Ground and ladders survive the eraser
    pub fn is_erasable(&self) -> bool {
        !matches!(self, EntityKind::Ground | EntityKind::Ladder)
    }

    pub fn as_bubble(&self) -> Option<&BubbleState> {
        match self {
            EntityKind::Bubble(state) => Some(state),
            _ => None,
        }
    }

    pub fn as_bubble_mut(&mut self) -> Option<&mut BubbleState> {
        match self {
            EntityKind::Bubble(state) => Some(state),
            _ => None,
        }
    }
}

/// Flat kind label without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KindTag {
    Ground,
    Ball,
    Humanoid,
    Ladder,
    Cloud,
    Bubble,
    FloatingBar,
    QuestionBlock,
    Coin,
    Raindrop,
    Roulette,
    WallSegment,
    DrawnLine,
}

impl KindTag {
    pub fn name(&self) -> &'static str {
        match self {
            KindTag::Ground => "ground",
            KindTag::Ball => "ball",
            KindTag::Humanoid => "humanoid",
            KindTag::Ladder => "ladder",
            KindTag::Cloud => "cloud",
            KindTag::Bubble => "bubble",
            KindTag::FloatingBar => "floating-bar",
            KindTag::QuestionBlock => "question-block",
            KindTag::Coin => "coin",
            KindTag::Raindrop => "raindrop",
            KindTag::Roulette => "roulette",
            KindTag::WallSegment => "wall-segment",
            KindTag::DrawnLine => "drawn-line",
        }
    }
}

impl std::fmt::Display for KindTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
