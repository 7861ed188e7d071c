//! Bubble capture, carry and sway

use glam::Vec2;

use crate::collision::HumanoidMask;
use crate::config::RulesConfig;
use crate::entity::EntityKind;
use crate::events::SimEvent;
use crate::humanoid::LocomotionState;
use crate::simulation::SimulationState;
use crate::types::EntityId;

fn bubble_ids(state: &SimulationState) -> Vec<EntityId> {
    state
        .registry
        .entities()
        .iter()
        .copied()
        .filter(|id| matches!(state.registry.kind(*id), Some(EntityKind::Bubble(_))))
        .collect()
}

fn is_empty_bubble(state: &SimulationState, id: EntityId) -> bool {
    state
        .registry
        .kind(id)
        .and_then(|k| k.as_bubble())
        .is_some_and(|b| b.contained.is_none())
}

/// Each free humanoid is captured by the first empty bubble in range
pub fn capture(state: &mut SimulationState, cfg: &RulesConfig) {
    let bubbles = bubble_ids(state);
    if bubbles.is_empty() {
        return;
    }

    let free: Vec<EntityId> = state
        .registry
        .humanoids()
        .iter()
        .filter(|h| !h.is_contained())
        .map(|h| h.entity)
        .collect();

    for humanoid in free {
        let Some(h_pos) = state
            .registry
            .handle(humanoid)
            .and_then(|h| state.physics.position(h))
        else {
            continue;
        };

        let target = bubbles.iter().copied().find(|bubble| {
            is_empty_bubble(state, *bubble)
                && state
                    .registry
                    .handle(*bubble)
                    .and_then(|h| state.physics.position(h))
                    .is_some_and(|b_pos| b_pos.distance(h_pos) < cfg.capture_radius)
        });
        let Some(bubble) = target else {
            continue;
        };

        if let Some(slot) = state.registry.kind_mut(bubble).and_then(|k| k.as_bubble_mut()) {
            slot.contained = Some(humanoid);
        }
        if let Some(record) = state.registry.humanoid_mut(humanoid) {
            record.contained_in = Some(bubble);
            record.state = LocomotionState::Walking;
            record.hanging_counter = 0;
            record.stuck_counter = 0;
        }
        if let Some(handle) = state.registry.handle(humanoid) {
            state
                .physics
                .set_collision_groups(handle, HumanoidMask::Contained.groups());
        }

        log::debug!("Bubble {} captured {}", bubble, humanoid);
        state.events.push(SimEvent::BubbleCaptured { bubble, humanoid });
    }
}

/// Passengers follow their bubble exactly
pub fn carry(state: &mut SimulationState) {
    for bubble in bubble_ids(state) {
        let Some(passenger) = state
            .registry
            .kind(bubble)
            .and_then(|k| k.as_bubble())
            .and_then(|b| b.contained)
        else {
            continue;
        };

        let passenger_handle = state.registry.handle(passenger);
        let bubble_handle = state.registry.handle(bubble);
        let (Some(ph), Some(bh)) = (passenger_handle, bubble_handle) else {
            // Passenger vanished without going through despawn
            if let Some(slot) = state.registry.kind_mut(bubble).and_then(|k| k.as_bubble_mut()) {
                slot.contained = None;
            }
            continue;
        };

        if let (Some(pos), Some(vel)) = (state.physics.position(bh), state.physics.velocity(bh)) {
            state.physics.set_position(ph, pos);
            state.physics.set_velocity(ph, vel);
            state.physics.pin_upright(ph);
        }
    }
}

/// Sideways sine sway, constant drift and a little lift on every bubble.
///
/// Adds to forces already accumulated this step, so it must run after the
/// anti-gravity pass.
pub fn sway(state: &mut SimulationState, cfg: &RulesConfig) {
    let time = state.time as f32;
    for bubble in bubble_ids(state) {
        let phase = state
            .registry
            .kind(bubble)
            .and_then(|k| k.as_bubble())
            .map(|b| b.phase)
            .unwrap_or_default();
        let Some(handle) = state.registry.handle(bubble) else {
            continue;
        };
        let Some(mass) = state.physics.mass(handle) else {
            continue;
        };

        let accel = Vec2::new(
            (time * cfg.sway_frequency + phase).sin() * cfg.sway_accel + cfg.drift_accel,
            -cfg.lift_accel,
        );
        state.physics.add_force(handle, accel * mass);
    }
}
