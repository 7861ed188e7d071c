//! Pointer grab: a spring that drags one body toward the pointer

use glam::Vec2;

use crate::simulation::SimulationState;
use crate::types::EntityId;

/// Body currently held by the pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerGrab {
    pub entity: EntityId,
    /// Latest pointer position
    pub target: Vec2,
}

/// Topmost dynamic entity under the point, if any. Entities spawned later win.
pub fn pick(state: &SimulationState, point: Vec2) -> Option<EntityId> {
    state
        .registry
        .entities()
        .iter()
        .rev()
        .chain(state.registry.walls().iter().rev())
        .copied()
        .find(|id| {
            state.registry.handle(*id).is_some_and(|h| {
                state.physics.is_dynamic(h) && state.physics.contains_point(h, point)
            })
        })
}

/// Pull the grabbed body toward the pointer. Drops the grab if the body is gone.
pub fn drive(state: &mut SimulationState, stiffness: f32) {
    let Some(grab) = state.grab else {
        return;
    };
    let Some(handle) = state.registry.handle(grab.entity) else {
        state.grab = None;
        return;
    };
    let Some(position) = state.physics.position(handle) else {
        state.grab = None;
        return;
    };

    state
        .physics
        .set_velocity(handle, (grab.target - position) * stiffness);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::entity::EntityFactory;
    use crate::registry::BodyList;

    fn state() -> SimulationState {
        SimulationState::new(&SimConfig::default(), Vec2::new(800.0, 600.0), 5)
    }

    #[test]
    fn test_pick_ignores_static_bodies() {
        let mut state = state();
        state.registry.insert(
            &mut state.physics,
            EntityFactory::create_question_block(Vec2::new(100.0, 100.0)),
            BodyList::Entity,
        );
        assert_eq!(pick(&state, Vec2::new(100.0, 100.0)), None);

        let ball = state.registry.insert(
            &mut state.physics,
            EntityFactory::create_ball(Vec2::new(100.0, 100.0), 12.0),
            BodyList::Entity,
        );
        assert_eq!(pick(&state, Vec2::new(105.0, 100.0)), Some(ball));
        // Ground is static
        assert_eq!(pick(&state, Vec2::new(400.0, 590.0)), None);
    }

    #[test]
    fn test_drive_pulls_toward_target() {
        let mut state = state();
        let ball = state.registry.insert(
            &mut state.physics,
            EntityFactory::create_ball(Vec2::new(100.0, 100.0), 12.0),
            BodyList::Entity,
        );
        state.grab = Some(PointerGrab {
            entity: ball,
            target: Vec2::new(200.0, 100.0),
        });

        drive(&mut state, 10.0);
        let handle = state.registry.handle(ball).unwrap();
        assert_eq!(state.physics.velocity(handle), Some(Vec2::new(1000.0, 0.0)));
    }

    #[test]
    fn test_drive_drops_missing_body() {
        let mut state = state();
        state.grab = Some(PointerGrab {
            entity: EntityId::new(),
            target: Vec2::ZERO,
        });
        drive(&mut state, 10.0);
        assert!(state.grab.is_none());
    }
}
