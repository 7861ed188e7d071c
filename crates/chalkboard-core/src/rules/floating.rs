//! Anti-gravity and the fixed-floating lock

use glam::Vec2;
use rapier2d::prelude::RigidBodyHandle;

use crate::entity::EntityKind;
use crate::humanoid::LocomotionState;
use crate::physics::PhysicsWorld;
use crate::simulation::SimulationState;
use crate::types::EntityId;

fn cancel_gravity(physics: &mut PhysicsWorld, handle: RigidBodyHandle) {
    let Some(mass) = physics.mass(handle) else {
        return;
    };
    let gravity = physics.gravity();
    physics.add_force(handle, -gravity * mass);
}

fn is_grabbed(state: &SimulationState, id: EntityId) -> bool {
    state.grab.as_ref().is_some_and(|g| g.entity == id)
}

/// Reset last step's forces, then cancel gravity on everything that floats.
///
/// Floating bodies (clouds, fused strokes), bubbles, grabbed bars and
/// humanoids that are contained, climbing, on a ladder top or hanging are
/// all weightless for the coming step.
pub fn apply_anti_gravity(state: &mut SimulationState) {
    state.physics.reset_forces();

    let mut weightless: Vec<RigidBodyHandle> = Vec::new();
    for id in state.registry.all_ids() {
        let Some(body) = state.registry.get(id) else {
            continue;
        };
        let floats = match &body.kind {
            EntityKind::Bubble(_) => true,
            EntityKind::FloatingBar(_) => is_grabbed(state, id),
            kind => kind.is_floating(),
        };
        if floats {
            weightless.push(body.handle);
        }
    }

    for record in state.registry.humanoids() {
        let suspended = record.is_contained()
            || record.is_hanging()
            || matches!(
                record.state,
                LocomotionState::Climbing | LocomotionState::OnLadderTop | LocomotionState::Hanging
            );
        if suspended {
            if let Some(handle) = state.registry.handle(record.entity) {
                weightless.push(handle);
            }
        }
    }

    for handle in weightless {
        cancel_gravity(&mut state.physics, handle);
    }
}

/// Pin fixed-floating bodies to their recorded position unless grabbed.
/// A grabbed body instead drags its recorded position along.
pub fn lock_fixed(state: &mut SimulationState) {
    let bars: Vec<EntityId> = state
        .registry
        .entities()
        .iter()
        .copied()
        .filter(|id| matches!(state.registry.kind(*id), Some(EntityKind::FloatingBar(_))))
        .collect();

    for id in bars {
        let Some(handle) = state.registry.handle(id) else {
            continue;
        };
        let grabbed = is_grabbed(state, id);
        let current = state.physics.position(handle);

        let Some(EntityKind::FloatingBar(fixed)) = state.registry.kind_mut(id) else {
            continue;
        };
        if grabbed {
            if let Some(current) = current {
                fixed.fixed_position = current;
            }
        } else {
            let target = fixed.fixed_position;
            state.physics.set_position(handle, target);
            state.physics.set_velocity(handle, Vec2::ZERO);
            state.physics.set_angular_velocity(handle, 0.0);
        }
    }
}
