//! Collision categories and per-kind interaction groups
//!
//! Categories are orthogonal rapier `Group` bits. Two colliders interact only
//! when each one's membership intersects the other's filter.

use rapier2d::prelude::{Group, InteractionGroups};

/// Ground, walls and drawn strokes
pub const DEFAULT: Group = Group::GROUP_1;
/// Balls and coins
pub const DYNAMIC: Group = Group::GROUP_2;
/// Ladder parts
pub const LADDER: Group = Group::GROUP_3;
/// Humanoid bodies
pub const HUMANOID: Group = Group::GROUP_4;
/// Bars and blocks that climbing humanoids pass through
pub const PLATFORM: Group = Group::GROUP_5;

/// Collision mask variants a humanoid switches between at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HumanoidMask {
    /// DEFAULT + DYNAMIC + PLATFORM, never other humanoids
    Default,
    /// PLATFORM removed so the humanoid can rise through bars and blocks
    Climbing,
    /// Ground only while carried by a bubble
    Contained,
}

impl HumanoidMask {
    pub fn filter(self) -> Group {
        match self {
            HumanoidMask::Default => DEFAULT | DYNAMIC | PLATFORM,
            HumanoidMask::Climbing => DEFAULT | DYNAMIC,
            HumanoidMask::Contained => DEFAULT,
        }
    }

    pub fn groups(self) -> InteractionGroups {
        InteractionGroups::new(HUMANOID, self.filter())
    }
}

/// Static obstacles: ground, stroke segments, fused strokes
pub fn obstacle_groups() -> InteractionGroups {
    InteractionGroups::new(DEFAULT, Group::ALL)
}

pub fn ball_groups() -> InteractionGroups {
    InteractionGroups::new(DYNAMIC, Group::ALL)
}

/// Coins are decorative: they pop out of a block and fall through everything
pub fn coin_groups() -> InteractionGroups {
    InteractionGroups::new(DYNAMIC, Group::NONE)
}

pub fn ladder_groups() -> InteractionGroups {
    InteractionGroups::new(LADDER, DEFAULT)
}

/// Floating props that should not bump humanoids (clouds, bubbles)
pub fn floater_groups() -> InteractionGroups {
    InteractionGroups::new(DYNAMIC, DEFAULT | DYNAMIC)
}

pub fn raindrop_groups() -> InteractionGroups {
    InteractionGroups::new(DYNAMIC, DEFAULT | PLATFORM)
}

pub fn platform_groups() -> InteractionGroups {
    InteractionGroups::new(PLATFORM, Group::ALL)
}
