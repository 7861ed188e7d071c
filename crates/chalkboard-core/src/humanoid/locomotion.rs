//! Humanoid locomotion decisions
//!
//! One AI tick is split into three phases:
//! - [`sense`] reads the world into a [`Surroundings`] snapshot using probe
//!   points against walls and footing, and bounding-box overlap against ladders
//! - [`decide`] is a pure state machine over the record and the snapshot
//! - [`apply`] writes the resulting velocity, orientation and collision mask
//!
//! Keeping `decide` pure lets the state machine be tested tick by tick
//! without a physics world.

use glam::Vec2;
use rapier2d::prelude::RigidBodyHandle;

use super::record::{HumanoidRecord, LocomotionState};
use crate::collision::HumanoidMask;
use crate::config::LocomotionConfig;
use crate::entity::{EntityKind, HUMANOID_HALF_HEIGHT, HUMANOID_HALF_WIDTH};
use crate::physics::PhysicsWorld;
use crate::registry::BodyRegistry;
use crate::rng_trait::SimRng;
use crate::types::EntityId;

/// Ladder the humanoid currently overlaps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LadderContact {
    pub center_x: f32,
    /// Y of the ladder's top edge
    pub top: f32,
}

/// What a humanoid perceives at the start of its tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Surroundings {
    pub position: Vec2,
    /// Velocity as integrated by the last physics step
    pub velocity: Vec2,
    pub ladder: Option<LadderContact>,
    /// A stroke sits just above the head
    pub head_blocked: bool,
    /// A stroke sits just ahead at knee height
    pub wall_ahead: bool,
    /// A stroke sits within reach of the hands
    pub grip_ahead: bool,
    /// Something solid sits just below the feet
    pub supported: bool,
}

/// Effects to write back to the body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocomotionDecision {
    /// Replacement velocity, `None` keeps the current one
    pub velocity: Option<Vec2>,
    /// Velocity change added on top of the replacement
    pub impulse: Vec2,
    pub pin_upright: bool,
    pub mask: HumanoidMask,
    pub footstep: bool,
    pub jumped: bool,
}

impl LocomotionDecision {
    fn new(mask: HumanoidMask) -> Self {
        Self {
            velocity: None,
            impulse: Vec2::ZERO,
            pin_upright: true,
            mask,
            footstep: false,
            jumped: false,
        }
    }

    /// Velocity the body ends up with given the one it had
    pub fn resolve_velocity(&self, current: Vec2) -> Vec2 {
        self.velocity.unwrap_or(current) + self.impulse
    }
}

/// Advance one humanoid by one AI tick
pub fn decide<R: SimRng + ?Sized>(
    record: &mut HumanoidRecord,
    env: &Surroundings,
    cfg: &LocomotionConfig,
    rng: &mut R,
) -> LocomotionDecision {
    let v = env.velocity;

    // Ladder check
    let mut on_ladder_top = false;
    if let Some(ladder) = env.ladder {
        let feet = env.position.y + HUMANOID_HALF_HEIGHT;
        if feet <= ladder.top + cfg.ladder_top_margin {
            on_ladder_top = true;
            if record.state != LocomotionState::OnLadderTop {
                log::trace!("Humanoid {} reached a ladder top", record.entity);
            }
            record.state = LocomotionState::OnLadderTop;
        } else {
            if record.state != LocomotionState::Climbing {
                log::debug!("Humanoid {} started climbing", record.entity);
            }
            record.state = LocomotionState::Climbing;
            record.hanging_counter = 0;
            record.stuck_counter = 0;

            let vx = (ladder.center_x - env.position.x) * cfg.ladder_attraction;
            let vy = if env.head_blocked {
                cfg.descend_speed
            } else {
                -cfg.climb_speed
            };
            let mut decision = LocomotionDecision::new(HumanoidMask::Climbing);
            decision.velocity = Some(Vec2::new(vx, vy));
            return decision;
        }
    }

    // Off the ladder (or on its top landing) the default mask applies
    let mut decision = LocomotionDecision::new(HumanoidMask::Default);

    // Hanging
    if record.hanging_counter > 0 {
        record.hanging_counter -= 1;
        record.state = if record.hanging_counter > 0 {
            LocomotionState::Hanging
        } else {
            log::debug!("Humanoid {} let go", record.entity);
            LocomotionState::Walking
        };
        decision.velocity = Some(Vec2::ZERO);
        return decision;
    }
    if !on_ladder_top && v.y.abs() > cfg.airborne_speed && env.grip_ahead && rng.chance(cfg.hang_chance) {
        record.hanging_counter = rng.range_u32(cfg.hang_ticks_min, cfg.hang_ticks_max).max(1);
        record.state = LocomotionState::Hanging;
        record.stuck_counter = 0;
        log::debug!(
            "Humanoid {} grabbed a stroke for {} ticks",
            record.entity,
            record.hanging_counter
        );
        decision.velocity = Some(Vec2::ZERO);
        return decision;
    }

    // Walking
    if !on_ladder_top {
        record.state = LocomotionState::Walking;
    }
    let vy = if on_ladder_top { v.y * cfg.ladder_top_damping } else { v.y };
    decision.velocity = Some(Vec2::new(record.direction * cfg.walk_speed, vy));

    let previous_phase = record.leg_phase;
    record.leg_phase += cfg.leg_phase_step;
    decision.footstep = record.leg_phase.floor() != previous_phase.floor() && v.x.abs() > cfg.footstep_speed;

    // Stuck detection
    if v.x.abs() < cfg.stuck_speed && v.y.abs() < cfg.stuck_speed {
        record.stuck_counter += 1;

        if record.stuck_counter == cfg.escape_jump_ticks {
            decision.impulse.y -= cfg.escape_jump_speed;
            decision.jumped = true;
            log::trace!("Humanoid {} escape jump", record.entity);
        }

        if record.stuck_counter >= cfg.turnaround_ticks {
            record.direction = -record.direction;
            record.stuck_counter = 0;
            decision.velocity = Some(Vec2::new(record.direction * cfg.walk_speed, vy));
            decision.impulse += Vec2::new(record.direction * cfg.turnaround_push, -cfg.turnaround_hop);
            decision.jumped = true;
            log::debug!(
                "Humanoid {} stuck, turning around to {}",
                record.entity,
                record.direction
            );
        }
    } else if v.x.abs() >= cfg.stuck_speed {
        record.stuck_counter = 0;
    }
    // Blocked sideways while rising or falling keeps the count across jumps

    // Obstacle jump or idle hop, both only from the ground. Slow vertical
    // speed alone also matches the apex of a jump.
    let grounded = env.supported && v.y.abs() < cfg.grounded_speed;
    if grounded && !decision.jumped {
        if env.wall_ahead {
            decision.impulse += Vec2::new(
                record.direction * cfg.obstacle_jump_forward,
                -cfg.obstacle_jump_speed,
            );
            record.leg_phase = 0.0;
            decision.jumped = true;
        } else if rng.chance(cfg.idle_hop_chance) {
            decision.impulse.y -= cfg.idle_hop_speed;
            decision.jumped = true;
        }
    }

    decision
}

/// Probe the world around one humanoid. Returns `None` if its body is gone.
pub fn sense(
    physics: &PhysicsWorld,
    registry: &BodyRegistry,
    record: &HumanoidRecord,
    cfg: &LocomotionConfig,
) -> Option<Surroundings> {
    let handle = registry.handle(record.entity)?;
    let position = physics.position(handle)?;
    let velocity = physics.velocity(handle)?;
    let mut bounds = physics.bounds(handle)?;
    // Keep the ladder in reach while the feet rise past its top, so the
    // landing is caught even when a climb stride oversteps the top edge
    if matches!(record.state, LocomotionState::Climbing | LocomotionState::OnLadderTop) {
        bounds.max.y += cfg.ladder_top_margin;
    }

    let ladder = registry
        .entities()
        .iter()
        .filter(|id| matches!(registry.kind(**id), Some(EntityKind::Ladder)))
        .filter_map(|id| registry.handle(*id))
        .filter_map(|h| physics.bounds(h))
        .find(|lb| lb.overlaps(&bounds))
        .map(|lb| LadderContact {
            center_x: lb.center().x,
            top: lb.min.y,
        });

    let dir = record.direction;
    let head = Vec2::new(position.x, position.y - HUMANOID_HALF_HEIGHT - cfg.head_probe_distance);
    let knee = Vec2::new(
        position.x + dir * (HUMANOID_HALF_WIDTH + cfg.forward_probe_distance),
        position.y + cfg.forward_probe_drop,
    );
    let hand = Vec2::new(
        position.x + dir * (HUMANOID_HALF_WIDTH + cfg.grip_probe_distance),
        position.y - HUMANOID_HALF_HEIGHT * 0.5,
    );
    let foot = Vec2::new(position.x, position.y + HUMANOID_HALF_HEIGHT + cfg.foot_probe_distance);

    Some(Surroundings {
        position,
        velocity,
        ladder,
        head_blocked: probe(physics, registry, registry.walls(), EntityKind::is_wall, head, cfg.probe_radius),
        wall_ahead: probe(physics, registry, registry.walls(), EntityKind::is_wall, knee, cfg.probe_radius),
        grip_ahead: probe(physics, registry, registry.walls(), EntityKind::is_wall, hand, cfg.probe_radius),
        supported: probe(
            physics,
            registry,
            &registry.all_ids(),
            EntityKind::is_footing,
            foot,
            cfg.probe_radius,
        ),
    })
}

/// Any body among `ids` of a matching kind within `radius` of the point
fn probe(
    physics: &PhysicsWorld,
    registry: &BodyRegistry,
    ids: &[EntityId],
    accept: fn(&EntityKind) -> bool,
    point: Vec2,
    radius: f32,
) -> bool {
    ids.iter()
        .filter(|id| registry.kind(**id).is_some_and(accept))
        .filter_map(|id| registry.handle(*id))
        .filter_map(|h| physics.distance_to_point(h, point))
        .any(|d| d <= radius)
}

/// Write a decision to the humanoid's body
pub fn apply(physics: &mut PhysicsWorld, handle: RigidBodyHandle, decision: &LocomotionDecision) {
    let Some(current) = physics.velocity(handle) else {
        return;
    };
    physics.set_velocity(handle, decision.resolve_velocity(current));
    if decision.pin_upright {
        physics.pin_upright(handle);
    }
    physics.set_collision_groups(handle, decision.mask.groups());
}
