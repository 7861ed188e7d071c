//! Stroke aging, raindrop and coin removal

use crate::entity::EntityKind;
use crate::lifecycle;
use crate::simulation::SimulationState;
use crate::types::EntityId;

/// Remove fused strokes older than `lifetime` seconds
pub fn age_strokes(state: &mut SimulationState, lifetime: f64) -> usize {
    let now = state.time;
    let expired: Vec<EntityId> = state
        .registry
        .walls()
        .iter()
        .copied()
        .filter(|id| match state.registry.kind(*id) {
            Some(EntityKind::DrawnLine(line)) => now - line.created_at > lifetime,
            _ => false,
        })
        .collect();

    let removed = expired
        .into_iter()
        .filter(|id| lifecycle::despawn(state, *id).is_some())
        .count();
    if removed > 0 {
        log::debug!("Aged out {} strokes", removed);
    }
    removed
}

/// Remove entities of a kind whose center lies below `floor_y`
fn remove_below(state: &mut SimulationState, floor_y: f32, matches: fn(&EntityKind) -> bool) -> usize {
    let doomed: Vec<EntityId> = state
        .registry
        .entities()
        .iter()
        .copied()
        .filter(|id| state.registry.kind(*id).is_some_and(matches))
        .filter(|id| {
            state
                .registry
                .handle(*id)
                .and_then(|h| state.physics.position(h))
                .is_some_and(|p| p.y > floor_y)
        })
        .collect();

    doomed
        .into_iter()
        .filter(|id| lifecycle::despawn(state, *id).is_some())
        .count()
}

/// Raindrops vanish once they reach the ground
pub fn despawn_rain(state: &mut SimulationState, ground_top: f32, margin: f32) -> usize {
    remove_below(state, ground_top - margin, |k| matches!(k, EntityKind::Raindrop))
}

/// Coins fall through everything and are dropped below the canvas
pub fn despawn_fallen_coins(state: &mut SimulationState) -> usize {
    let bottom = state.canvas.y;
    remove_below(state, bottom, |k| matches!(k, EntityKind::Coin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::entity::EntityFactory;
    use crate::registry::BodyList;
    use glam::Vec2;

    fn state() -> SimulationState {
        SimulationState::new(&SimConfig::default(), Vec2::new(800.0, 600.0), 5)
    }

    #[test]
    fn test_stroke_ages_out_after_lifetime() {
        let mut state = state();
        let points = [Vec2::new(100.0, 100.0), Vec2::new(104.0, 100.0)];
        let line = state.registry.insert(
            &mut state.physics,
            EntityFactory::create_drawn_line(&points, 3.0, 0.0).unwrap(),
            BodyList::Wall,
        );

        state.time = 59.0;
        assert_eq!(age_strokes(&mut state, 60.0), 0);
        state.time = 60.5;
        assert_eq!(age_strokes(&mut state, 60.0), 1);
        assert!(!state.registry.contains(line));
        assert!(state.registry.walls().is_empty());
    }

    #[test]
    fn test_rain_removed_near_ground_only() {
        let mut state = state();
        let high = state.registry.insert(
            &mut state.physics,
            EntityFactory::create_raindrop(Vec2::new(100.0, 100.0)),
            BodyList::Entity,
        );
        let low = state.registry.insert(
            &mut state.physics,
            EntityFactory::create_raindrop(Vec2::new(100.0, 578.0)),
            BodyList::Entity,
        );

        assert_eq!(despawn_rain(&mut state, 580.0, 8.0), 1);
        assert!(state.registry.contains(high));
        assert!(!state.registry.contains(low));
    }

    #[test]
    fn test_coin_below_canvas_removed() {
        let mut state = state();
        state.registry.insert(
            &mut state.physics,
            EntityFactory::create_coin(Vec2::new(100.0, 650.0)),
            BodyList::Entity,
        );
        assert_eq!(despawn_fallen_coins(&mut state), 1);
        assert_eq!(despawn_fallen_coins(&mut state), 0);
    }
}
