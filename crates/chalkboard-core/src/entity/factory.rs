//! Entity blueprints
//!
//! Every constructor here is pure: it builds the rigid body, its colliders,
//! the kind payload and a render style. Callers insert the blueprint through
//! [`crate::BodyRegistry`] so the world and the registry never disagree.

use glam::Vec2;
use rapier2d::prelude::*;

use super::kind::*;
use crate::collision::{self, HumanoidMask};
use crate::physics::to_vector;
use crate::render::{RenderStyle, palette};

/// Humanoid capsule: half segment length plus radius gives the half height
pub const HUMANOID_HALF_SEGMENT: f32 = 12.0;
pub const HUMANOID_RADIUS: f32 = 8.0;
pub const HUMANOID_HALF_HEIGHT: f32 = HUMANOID_HALF_SEGMENT + HUMANOID_RADIUS;
pub const HUMANOID_HALF_WIDTH: f32 = HUMANOID_RADIUS;

pub const LADDER_HALF_WIDTH: f32 = 15.0;
pub const LADDER_HALF_HEIGHT: f32 = 80.0;
const LADDER_RUNG_SPACING: f32 = 20.0;

pub const BUBBLE_RADIUS: f32 = 25.0;
pub const BAR_HALF_EXTENTS: Vec2 = Vec2::new(30.0, 3.0);
pub const QUESTION_BLOCK_HALF: f32 = 8.0;
pub const COIN_RADIUS: f32 = 8.0;
pub const RAINDROP_RADIUS: f32 = 2.0;
pub const ROULETTE_RADIUS: f32 = 24.0;
const CLOUD_PUFFS: [(f32, f32, f32); 3] = [(-22.0, 4.0, 16.0), (0.0, -6.0, 22.0), (22.0, 4.0, 16.0)];

/// Everything needed to register one body
pub struct EntityBlueprint {
    pub body: RigidBody,
    pub colliders: Vec<Collider>,
    pub kind: EntityKind,
    pub style: RenderStyle,
}

impl EntityBlueprint {
    fn new(body: RigidBody, colliders: Vec<Collider>, kind: EntityKind, style: RenderStyle) -> Self {
        Self {
            body,
            colliders,
            kind,
            style,
        }
    }

    /// Give the body an initial linear velocity
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.body.set_linvel(to_vector(velocity), true);
        self
    }
}

impl std::fmt::Debug for EntityBlueprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityBlueprint")
            .field("kind", &self.kind.tag())
            .field("translation", self.body.translation())
            .field("colliders", &self.colliders.len())
            .finish()
    }
}

/// Factory for every kind of tracked body
pub struct EntityFactory;

impl EntityFactory {
    /// Light, bouncy ball
    pub fn create_ball(position: Vec2, radius: f32) -> EntityBlueprint {
        let body = RigidBodyBuilder::dynamic()
            .translation(to_vector(position))
            .build();
        let collider = ColliderBuilder::ball(radius)
            .density(0.5)
            .restitution(0.7)
            .friction(0.3)
            .collision_groups(collision::ball_groups())
            .build();
        let color = palette::BALLS[(radius.max(0.0) as usize) % palette::BALLS.len()];
        EntityBlueprint::new(body, vec![collider], EntityKind::Ball, RenderStyle::solid(color))
    }

    /// Heavy upright capsule. Rotation is locked so no balance controller is needed.
    pub fn create_humanoid(position: Vec2) -> EntityBlueprint {
        let body = RigidBodyBuilder::dynamic()
            .translation(to_vector(position))
            .lock_rotations()
            .build();
        let collider = ColliderBuilder::capsule_y(HUMANOID_HALF_SEGMENT, HUMANOID_RADIUS)
            .density(3.0)
            .restitution(0.0)
            .friction(0.0)
            .friction_combine_rule(CoefficientCombineRule::Min)
            .collision_groups(HumanoidMask::Default.groups())
            .build();
        EntityBlueprint::new(
            body,
            vec![collider],
            EntityKind::Humanoid,
            RenderStyle::transparent(),
        )
    }

    /// Two rails and evenly spaced rungs. Stands on the ground and ignores everything else.
    pub fn create_ladder(position: Vec2) -> EntityBlueprint {
        let body = RigidBodyBuilder::dynamic()
            .translation(to_vector(position))
            .lock_rotations()
            .build();

        let rail = |x: f32| {
            ColliderBuilder::cuboid(2.0, LADDER_HALF_HEIGHT)
                .translation(vector![x, 0.0])
                .density(1.0)
                .friction(0.9)
                .collision_groups(collision::ladder_groups())
                .build()
        };
        let mut colliders = vec![
            rail(-LADDER_HALF_WIDTH + 2.0),
            rail(LADDER_HALF_WIDTH - 2.0),
        ];

        let mut y = -LADDER_HALF_HEIGHT + LADDER_RUNG_SPACING / 2.0;
        while y < LADDER_HALF_HEIGHT {
            colliders.push(
                ColliderBuilder::cuboid(LADDER_HALF_WIDTH - 2.0, 1.5)
                    .translation(vector![0.0, y])
                    .density(1.0)
                    .collision_groups(collision::ladder_groups())
                    .build(),
            );
            y += LADDER_RUNG_SPACING;
        }

        EntityBlueprint::new(
            body,
            colliders,
            EntityKind::Ladder,
            RenderStyle::solid(palette::LADDER),
        )
    }

    /// Three overlapping puffs, kept aloft by the anti-gravity rule
    pub fn create_cloud(position: Vec2) -> EntityBlueprint {
        let body = RigidBodyBuilder::dynamic()
            .translation(to_vector(position))
            .lock_rotations()
            .linear_damping(1.0)
            .build();
        let colliders = CLOUD_PUFFS
            .iter()
            .map(|&(x, y, r)| {
                ColliderBuilder::ball(r)
                    .translation(vector![x, y])
                    .density(0.1)
                    .collision_groups(collision::floater_groups())
                    .build()
            })
            .collect();
        EntityBlueprint::new(
            body,
            colliders,
            EntityKind::Cloud(CloudState::default()),
            RenderStyle::solid(palette::CLOUD),
        )
    }

    /// Empty bubble. `phase` offsets the sway so bubbles drift independently.
    pub fn create_bubble(position: Vec2, phase: f32) -> EntityBlueprint {
        let body = RigidBodyBuilder::dynamic()
            .translation(to_vector(position))
            .lock_rotations()
            .linear_damping(0.5)
            .build();
        let collider = ColliderBuilder::ball(BUBBLE_RADIUS)
            .density(0.05)
            .restitution(0.5)
            .collision_groups(collision::floater_groups())
            .build();
        EntityBlueprint::new(
            body,
            vec![collider],
            EntityKind::Bubble(BubbleState {
                contained: None,
                phase,
            }),
            RenderStyle::outlined(palette::BUBBLE, palette::BUBBLE_RIM),
        )
    }

    /// Plank that holds its place until dragged
    pub fn create_floating_bar(position: Vec2) -> EntityBlueprint {
        let body = RigidBodyBuilder::dynamic()
            .translation(to_vector(position))
            .lock_rotations()
            .build();
        let collider = ColliderBuilder::cuboid(BAR_HALF_EXTENTS.x, BAR_HALF_EXTENTS.y)
            .density(1.0)
            .friction(0.8)
            .collision_groups(collision::platform_groups())
            .build();
        EntityBlueprint::new(
            body,
            vec![collider],
            EntityKind::FloatingBar(FixedFloatingState {
                fixed_position: position,
            }),
            RenderStyle::solid(palette::BAR),
        )
    }

    pub fn create_question_block(position: Vec2) -> EntityBlueprint {
        let body = RigidBodyBuilder::fixed()
            .translation(to_vector(position))
            .build();
        let collider = ColliderBuilder::cuboid(QUESTION_BLOCK_HALF, QUESTION_BLOCK_HALF)
            .friction(0.8)
            .collision_groups(collision::platform_groups())
            .build();
        EntityBlueprint::new(
            body,
            vec![collider],
            EntityKind::QuestionBlock(QuestionBlockState::default()),
            RenderStyle::solid(palette::BLOCK),
        )
    }

    /// Decorative coin, passes through everything
    pub fn create_coin(position: Vec2) -> EntityBlueprint {
        let body = RigidBodyBuilder::dynamic()
            .translation(to_vector(position))
            .build();
        let collider = ColliderBuilder::ball(COIN_RADIUS)
            .density(0.5)
            .collision_groups(collision::coin_groups())
            .build();
        EntityBlueprint::new(body, vec![collider], EntityKind::Coin, RenderStyle::solid(palette::COIN))
    }

    pub fn create_raindrop(position: Vec2) -> EntityBlueprint {
        let body = RigidBodyBuilder::dynamic()
            .translation(to_vector(position))
            .build();
        let collider = ColliderBuilder::ball(RAINDROP_RADIUS)
            .density(0.2)
            .restitution(0.0)
            .collision_groups(collision::raindrop_groups())
            .build();
        EntityBlueprint::new(
            body,
            vec![collider],
            EntityKind::Raindrop,
            RenderStyle::solid(palette::RAIN),
        )
    }

    /// Static wheel that reports the contacts starting a spin
    pub fn create_roulette(position: Vec2) -> EntityBlueprint {
        let body = RigidBodyBuilder::fixed()
            .translation(to_vector(position))
            .build();
        let collider = ColliderBuilder::ball(ROULETTE_RADIUS)
            .restitution(0.6)
            .collision_groups(collision::obstacle_groups())
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        EntityBlueprint::new(
            body,
            vec![collider],
            EntityKind::Roulette(RouletteState::default()),
            RenderStyle::outlined(palette::ROULETTE, palette::ROULETTE_RIM),
        )
    }

    /// Slab spanning the canvas width whose top sits `thickness` above the bottom edge
    pub fn create_ground(width: f32, height: f32, thickness: f32) -> EntityBlueprint {
        let body = RigidBodyBuilder::fixed()
            .translation(vector![width / 2.0, height - thickness / 2.0])
            .build();
        let collider = ColliderBuilder::cuboid(width / 2.0, thickness / 2.0)
            .friction(0.8)
            .restitution(0.1)
            .collision_groups(collision::obstacle_groups())
            .build();
        EntityBlueprint::new(body, vec![collider], EntityKind::Ground, RenderStyle::solid(palette::GROUND))
    }

    /// One static chalk dot laid down while drawing
    pub fn create_wall_segment(position: Vec2, radius: f32) -> EntityBlueprint {
        let body = RigidBodyBuilder::fixed()
            .translation(to_vector(position))
            .build();
        let collider = ColliderBuilder::ball(radius)
            .friction(0.8)
            .collision_groups(collision::obstacle_groups())
            .build();
        EntityBlueprint::new(
            body,
            vec![collider],
            EntityKind::WallSegment,
            RenderStyle::solid(palette::CHALK),
        )
    }

    /// Fuse stroke points into one dynamic compound centered on their centroid.
    ///
    /// Returns `None` for an empty stroke.
    pub fn create_drawn_line(points: &[Vec2], radius: f32, created_at: f64) -> Option<EntityBlueprint> {
        if points.is_empty() {
            return None;
        }

        let centroid = points.iter().copied().sum::<Vec2>() / points.len() as f32;
        let body = RigidBodyBuilder::dynamic()
            .translation(to_vector(centroid))
            .angular_damping(2.0)
            .linear_damping(0.5)
            .build();
        let colliders = points
            .iter()
            .map(|p| {
                ColliderBuilder::ball(radius)
                    .translation(to_vector(*p - centroid))
                    .density(1.0)
                    .friction(0.8)
                    .collision_groups(collision::obstacle_groups())
                    .build()
            })
            .collect();

        Some(EntityBlueprint::new(
            body,
            colliders,
            EntityKind::DrawnLine(DrawnLineState { created_at }),
            RenderStyle::solid(palette::CHALK),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{HUMANOID, LADDER};

    #[test]
    fn test_humanoid_is_upright_and_transparent() {
        let bp = EntityFactory::create_humanoid(Vec2::new(10.0, 20.0));
        assert!(bp.body.locked_axes().contains(LockedAxes::ROTATION_LOCKED));
        assert!(!bp.style.is_visible());
        assert_eq!(bp.kind, EntityKind::Humanoid);
        assert_eq!(bp.colliders[0].collision_groups().memberships, HUMANOID);
    }

    #[test]
    fn test_ladder_has_rails_and_rungs() {
        let bp = EntityFactory::create_ladder(Vec2::ZERO);
        assert!(bp.colliders.len() > 2);
        assert!(
            bp.colliders
                .iter()
                .all(|c| c.collision_groups().memberships == LADDER)
        );
    }

    #[test]
    fn test_static_props() {
        assert!(EntityFactory::create_question_block(Vec2::ZERO).body.is_fixed());
        assert!(EntityFactory::create_roulette(Vec2::ZERO).body.is_fixed());
        assert!(EntityFactory::create_wall_segment(Vec2::ZERO, 3.0).body.is_fixed());
        assert!(EntityFactory::create_ground(800.0, 600.0, 20.0).body.is_fixed());
        assert!(EntityFactory::create_ball(Vec2::ZERO, 12.0).body.is_dynamic());
    }

    #[test]
    fn test_floating_bar_remembers_spawn_position() {
        let pos = Vec2::new(120.0, 80.0);
        match EntityFactory::create_floating_bar(pos).kind {
            EntityKind::FloatingBar(state) => assert_eq!(state.fixed_position, pos),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_empty_stroke_produces_nothing() {
        assert!(EntityFactory::create_drawn_line(&[], 3.0, 0.0).is_none());
    }

    #[test]
    fn test_drawn_line_parts_keep_world_positions() {
        let points = [Vec2::new(50.0, 50.0), Vec2::new(50.0, 150.0)];
        let bp = EntityFactory::create_drawn_line(&points, 3.0, 1.5).unwrap();
        assert!(bp.body.is_dynamic());
        assert_eq!(bp.colliders.len(), 2);

        let center = Vec2::new(bp.body.translation().x, bp.body.translation().y);
        assert_eq!(center, Vec2::new(50.0, 100.0));
        let offsets: Vec<f32> = bp
            .colliders
            .iter()
            .map(|c| c.position().translation.y)
            .collect();
        assert_eq!(offsets, vec![-50.0, 50.0]);
    }

    #[test]
    fn test_with_velocity() {
        let bp = EntityFactory::create_coin(Vec2::ZERO).with_velocity(Vec2::new(0.0, -300.0));
        assert_eq!(bp.body.linvel().y, -300.0);
    }
}
