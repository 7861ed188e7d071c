//! Render data handed to the host renderer
//!
//! The core never draws. It exports one [`BodyRenderData`] per collider part
//! and one [`HumanoidRenderData`] per humanoid; the host decides how to draw.
//! Humanoid bodies carry a transparent style so the sprite pass is their only
//! visible representation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::types::EntityId;

/// Fill and outline colors as packed RGBA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderStyle {
    pub fill: [u8; 4],
    pub stroke: [u8; 4],
}

impl RenderStyle {
    pub const fn solid(fill: [u8; 4]) -> Self {
        Self { fill, stroke: fill }
    }

    pub const fn outlined(fill: [u8; 4], stroke: [u8; 4]) -> Self {
        Self { fill, stroke }
    }

    /// Nothing drawn for the body itself
    pub const fn transparent() -> Self {
        Self {
            fill: [0, 0, 0, 0],
            stroke: [0, 0, 0, 0],
        }
    }

    pub fn is_visible(&self) -> bool {
        self.fill[3] > 0 || self.stroke[3] > 0
    }
}

/// World-space primitive for one collider part
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderShape {
    Circle { center: Vec2, radius: f32 },
    /// Rotated rectangle
    Rect {
        center: Vec2,
        half_extents: Vec2,
        angle: f32,
    },
    /// Segment swept by a radius
    Capsule { a: Vec2, b: Vec2, radius: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodyRenderData {
    pub id: EntityId,
    pub shapes: Vec<RenderShape>,
    pub style: RenderStyle,
}

/// Sprite parameters for a humanoid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HumanoidRenderData {
    pub id: EntityId,
    pub position: Vec2,
    pub leg_phase: f32,
    /// +1 facing right, -1 facing left
    pub facing: f32,
    pub climbing: bool,
}

/// Renderer collaborator
///
/// `draw_body` is called for every tracked body first, then `draw_humanoid`
/// for every humanoid record.
pub trait Renderer {
    fn draw_body(&mut self, body: &BodyRenderData);

    fn draw_humanoid(&mut self, humanoid: &HumanoidRenderData);
}

/// Shared palette
pub mod palette {
    pub const CHALK: [u8; 4] = [235, 235, 225, 255];
    pub const GROUND: [u8; 4] = [90, 75, 60, 255];
    pub const LADDER: [u8; 4] = [170, 120, 60, 255];
    pub const CLOUD: [u8; 4] = [245, 245, 250, 230];
    pub const BUBBLE: [u8; 4] = [150, 210, 255, 90];
    pub const BUBBLE_RIM: [u8; 4] = [200, 235, 255, 255];
    pub const BAR: [u8; 4] = [120, 180, 120, 255];
    pub const BLOCK: [u8; 4] = [230, 170, 40, 255];
    pub const COIN: [u8; 4] = [255, 215, 0, 255];
    pub const RAIN: [u8; 4] = [110, 160, 255, 200];
    pub const ROULETTE: [u8; 4] = [200, 60, 60, 255];
    pub const ROULETTE_RIM: [u8; 4] = [250, 250, 250, 255];
    pub const BALLS: [[u8; 4]; 5] = [
        [240, 100, 100, 255],
        [100, 200, 240, 255],
        [250, 200, 80, 255],
        [140, 220, 120, 255],
        [200, 130, 230, 255],
    ];
}
