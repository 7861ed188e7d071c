//! Spawning, removal and out-of-bounds cleanup

use glam::Vec2;

use crate::collision::HumanoidMask;
use crate::config::SimConfig;
use crate::entity::{EntityBlueprint, EntityFactory, humanoid_spawn_position, random_spawn_position};
use crate::events::SimEvent;
use crate::humanoid::LocomotionState;
use crate::registry::{BodyList, RemovedBody};
use crate::rng_trait::SimRng;
use crate::simulation::SimulationState;
use crate::types::EntityId;

/// Register a non-humanoid entity and announce it
pub fn spawn_entity(state: &mut SimulationState, blueprint: EntityBlueprint) -> EntityId {
    let kind = blueprint.kind.tag();
    let id = state.registry.insert(&mut state.physics, blueprint, BodyList::Entity);
    state.events.push(SimEvent::EntitySpawned { id, kind });
    id
}

/// Register a humanoid with its AI record and announce it
pub fn spawn_humanoid(state: &mut SimulationState, position: Vec2, direction: f32) -> EntityId {
    let blueprint = EntityFactory::create_humanoid(position);
    let kind = blueprint.kind.tag();
    let id = state
        .registry
        .insert_humanoid(&mut state.physics, blueprint, direction);
    state.events.push(SimEvent::EntitySpawned { id, kind });
    id
}

/// Remove a body from the world and every list, keeping bubble
/// containment consistent on both sides.
///
/// A bubble with a passenger pops: the event goes out first and the
/// passenger is released with its default collision mask. A removed
/// passenger frees its bubble. Returns `None` for unknown ids.
pub fn despawn(state: &mut SimulationState, id: EntityId) -> Option<RemovedBody> {
    let passenger = state
        .registry
        .kind(id)
        .and_then(|k| k.as_bubble())
        .and_then(|b| b.contained);
    if passenger.is_some() {
        let position = state
            .registry
            .handle(id)
            .and_then(|h| state.physics.position(h))
            .unwrap_or_default();
        state.events.push(SimEvent::BubblePopped {
            bubble: id,
            position,
        });
    }

    let removed = state.registry.remove(&mut state.physics, id)?;

    if let Some(passenger) = passenger {
        release_passenger(state, passenger);
        log::debug!("Bubble {} popped, released {}", id, passenger);
    }

    if let Some(bubble) = removed.humanoid.as_ref().and_then(|h| h.contained_in) {
        if let Some(slot) = state.registry.kind_mut(bubble).and_then(|k| k.as_bubble_mut()) {
            if slot.contained == Some(id) {
                slot.contained = None;
            }
        }
    }

    if state.grab.is_some_and(|g| g.entity == id) {
        state.grab = None;
    }

    Some(removed)
}

fn release_passenger(state: &mut SimulationState, passenger: EntityId) {
    if let Some(record) = state.registry.humanoid_mut(passenger) {
        record.contained_in = None;
        record.state = LocomotionState::Walking;
        record.stuck_counter = 0;
    }
    if let Some(handle) = state.registry.handle(passenger) {
        state
            .physics
            .set_collision_groups(handle, HumanoidMask::Default.groups());
    }
}

/// One spawner tick. Returns the spawned entity, if any.
pub fn spawn_tick(state: &mut SimulationState, config: &SimConfig) -> Option<EntityId> {
    if state.paused {
        return None;
    }
    let spawner = &config.spawner;
    if state.registry.entities().len() >= spawner.max_entities {
        log::trace!("Spawner: population cap {} reached", spawner.max_entities);
        return None;
    }
    if !state.rng.chance(spawner.spawn_chance) {
        return None;
    }

    let (w, h) = (state.canvas.x, state.canvas.y);
    let id = if state.rng.chance(spawner.humanoid_share) {
        let point = humanoid_spawn_position(w, h, &mut state.rng);
        spawn_humanoid(state, point.position, point.direction)
    } else {
        let point = random_spawn_position(w, h, &mut state.rng);
        let radius = state
            .rng
            .range(spawner.ball_radius_min, spawner.ball_radius_max);
        spawn_entity(
            state,
            EntityFactory::create_ball(point.position, radius).with_velocity(point.velocity),
        )
    };

    log::info!(
        "Spawned {} {}",
        state
            .registry
            .kind(id)
            .map(|k| k.tag().name())
            .unwrap_or("entity"),
        id
    );
    Some(id)
}

/// Remove every entity whose center left the canvas by more than `margin`.
///
/// Returns the number of removed entities.
pub fn cleanup_tick(state: &mut SimulationState, margin: f32) -> usize {
    let (w, h) = (state.canvas.x, state.canvas.y);
    let outside = |p: Vec2| p.x < -margin || p.x > w + margin || p.y < -margin || p.y > h + margin;

    let snapshot: Vec<EntityId> = state.registry.entities().to_vec();
    let doomed: Vec<EntityId> = snapshot
        .into_iter()
        .filter(|id| {
            state
                .registry
                .handle(*id)
                .and_then(|h| state.physics.position(h))
                .is_some_and(&outside)
        })
        .collect();

    let mut removed = 0;
    for id in doomed {
        if let Some(body) = despawn(state, id) {
            removed += 1;
            log::debug!("Cleanup: removed {} {}", body.kind.tag(), id);
        }
    }
    if removed > 0 {
        log::info!("Cleanup removed {} entities", removed);
    }
    removed
}
