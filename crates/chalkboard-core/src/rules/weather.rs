//! Cloud rain

use glam::Vec2;

use crate::config::RulesConfig;
use crate::entity::{EntityFactory, EntityKind};
use crate::lifecycle;
use crate::rng_trait::SimRng;
use crate::simulation::SimulationState;
use crate::types::EntityId;

/// Each cloud tries to drop one raindrop every `rain_interval_secs`
pub fn rain(state: &mut SimulationState, cfg: &RulesConfig, dt: f32) {
    let clouds: Vec<EntityId> = state
        .registry
        .entities()
        .iter()
        .copied()
        .filter(|id| matches!(state.registry.kind(*id), Some(EntityKind::Cloud(_))))
        .collect();

    let mut drops = Vec::new();
    for cloud in clouds {
        let Some(EntityKind::Cloud(weather)) = state.registry.kind_mut(cloud) else {
            continue;
        };
        weather.rain_timer += dt;
        if weather.rain_timer < cfg.rain_interval_secs {
            continue;
        }
        weather.rain_timer -= cfg.rain_interval_secs;

        if !state.rng.chance(cfg.rain_chance) {
            continue;
        }
        let Some(center) = state
            .registry
            .handle(cloud)
            .and_then(|h| state.physics.position(h))
        else {
            continue;
        };
        let offset = Vec2::new(state.rng.range(-28.0, 28.0), 24.0);
        drops.push(center + offset);
    }

    for at in drops {
        lifecycle::spawn_entity(
            state,
            EntityFactory::create_raindrop(at).with_velocity(Vec2::new(0.0, 60.0)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::registry::BodyList;

    #[test]
    fn test_cloud_rains_on_interval() {
        let mut state = SimulationState::new(&SimConfig::default(), Vec2::new(800.0, 600.0), 5);
        let cfg = RulesConfig {
            rain_interval_secs: 0.5,
            rain_chance: 1.0,
            ..Default::default()
        };
        state.registry.insert(
            &mut state.physics,
            EntityFactory::create_cloud(Vec2::new(400.0, 80.0)),
            BodyList::Entity,
        );

        let drops = |state: &SimulationState| {
            state
                .registry
                .ids_where(|k| matches!(k, EntityKind::Raindrop))
                .len()
        };

        for _ in 0..29 {
            rain(&mut state, &cfg, 1.0 / 60.0);
        }
        assert_eq!(drops(&state), 0);

        for _ in 0..36 {
            rain(&mut state, &cfg, 1.0 / 60.0);
        }
        assert_eq!(drops(&state), 2);
    }
}
