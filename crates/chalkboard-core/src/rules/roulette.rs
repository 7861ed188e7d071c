//! Roulette spin and payout

use glam::Vec2;

use crate::config::{RulesConfig, SpawnerConfig};
use crate::entity::{EntityFactory, EntityKind, ROULETTE_RADIUS, RoulettePhase};
use crate::events::SimEvent;
use crate::lifecycle;
use crate::rng_trait::SimRng;
use crate::simulation::SimulationState;
use crate::types::EntityId;

/// Start spins for roulettes hit during the previous step.
///
/// Only dynamic bodies count, and raindrops never trigger a spin. A roulette
/// that is already spinning ignores further hits.
pub fn trigger_from_collisions(state: &mut SimulationState, cfg: &RulesConfig) {
    let pairs = std::mem::take(&mut state.collisions);

    for (a, b) in pairs {
        for (wheel, other) in [(a, b), (b, a)] {
            let Some(roulette) = state.registry.id_for_handle(wheel) else {
                continue;
            };
            if !matches!(state.registry.kind(roulette), Some(EntityKind::Roulette(_))) {
                continue;
            }
            if !state.physics.is_dynamic(other) {
                continue;
            }
            let other_kind = state
                .registry
                .id_for_handle(other)
                .and_then(|id| state.registry.kind(id));
            if matches!(other_kind, Some(EntityKind::Raindrop)) {
                continue;
            }

            let Some(EntityKind::Roulette(wheel_state)) = state.registry.kind_mut(roulette) else {
                continue;
            };
            if wheel_state.is_spinning() {
                continue;
            }
            wheel_state.phase = RoulettePhase::Spinning {
                remaining_steps: cfg.roulette_spin_steps,
            };
            wheel_state.spin_steps = 0;

            log::debug!("Roulette {} spinning", roulette);
            state.events.push(SimEvent::RouletteSpin { roulette });
        }
    }
}

/// Advance spinning roulettes by one step and resolve finished spins
pub fn spin(state: &mut SimulationState, cfg: &RulesConfig, spawner: &SpawnerConfig) {
    let wheels: Vec<EntityId> = state
        .registry
        .entities()
        .iter()
        .copied()
        .filter(|id| matches!(state.registry.kind(*id), Some(EntityKind::Roulette(_))))
        .collect();

    for roulette in wheels {
        let Some(EntityKind::Roulette(wheel)) = state.registry.kind_mut(roulette) else {
            continue;
        };
        let RoulettePhase::Spinning { remaining_steps } = wheel.phase else {
            continue;
        };

        wheel.spin_steps += 1;
        if cfg.roulette_flip_interval > 0 && wheel.spin_steps % cfg.roulette_flip_interval == 0 {
            wheel.face_up = !wheel.face_up;
        }

        let remaining = remaining_steps.saturating_sub(1);
        if remaining > 0 {
            wheel.phase = RoulettePhase::Spinning {
                remaining_steps: remaining,
            };
            continue;
        }

        let won = state.rng.chance(cfg.roulette_win_chance);
        wheel.phase = if won {
            RoulettePhase::Won
        } else {
            RoulettePhase::Lost
        };
        wheel.face_up = true;

        log::debug!("Roulette {} {}", roulette, if won { "won" } else { "lost" });
        state.events.push(SimEvent::RouletteResult { roulette, won });

        if won {
            pay_out(state, roulette, cfg, spawner);
        }
    }
}

/// Burst of balls above the wheel
fn pay_out(state: &mut SimulationState, roulette: EntityId, cfg: &RulesConfig, spawner: &SpawnerConfig) {
    let Some(center) = state
        .registry
        .handle(roulette)
        .and_then(|h| state.physics.position(h))
    else {
        return;
    };

    for _ in 0..cfg.roulette_payout {
        let radius = state
            .rng
            .range(spawner.ball_radius_min, spawner.ball_radius_max);
        let position = center
            + Vec2::new(
                state.rng.range(-ROULETTE_RADIUS, ROULETTE_RADIUS),
                -ROULETTE_RADIUS - radius - 4.0,
            );
        let velocity = Vec2::new(
            state
                .rng
                .range(-cfg.roulette_payout_spread, cfg.roulette_payout_spread),
            -state.rng.range(120.0, 300.0),
        );
        lifecycle::spawn_entity(
            state,
            EntityFactory::create_ball(position, radius).with_velocity(velocity),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::entity::RouletteState;
    use crate::registry::BodyList;

    fn state() -> SimulationState {
        SimulationState::new(&SimConfig::default(), Vec2::new(800.0, 600.0), 5)
    }

    fn wheel_state(state: &SimulationState, id: EntityId) -> RouletteState {
        match state.registry.kind(id) {
            Some(EntityKind::Roulette(wheel)) => wheel.clone(),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_ball_hit_starts_single_spin() {
        let mut state = state();
        let cfg = RulesConfig::default();
        let roulette = state.registry.insert(
            &mut state.physics,
            EntityFactory::create_roulette(Vec2::new(400.0, 300.0)),
            BodyList::Entity,
        );
        let ball = state.registry.insert(
            &mut state.physics,
            EntityFactory::create_ball(Vec2::new(400.0, 200.0), 10.0),
            BodyList::Entity,
        );
        let rh = state.registry.handle(roulette).unwrap();
        let bh = state.registry.handle(ball).unwrap();

        state.collisions = vec![(rh, bh)];
        trigger_from_collisions(&mut state, &cfg);
        assert!(wheel_state(&state, roulette).is_spinning());

        // A second hit while spinning is ignored
        state.collisions = vec![(bh, rh)];
        trigger_from_collisions(&mut state, &cfg);
        let spins = state
            .events
            .iter()
            .filter(|e| matches!(e, SimEvent::RouletteSpin { .. }))
            .count();
        assert_eq!(spins, 1);
    }

    #[test]
    fn test_raindrop_does_not_trigger() {
        let mut state = state();
        let roulette = state.registry.insert(
            &mut state.physics,
            EntityFactory::create_roulette(Vec2::new(400.0, 300.0)),
            BodyList::Entity,
        );
        let drop = state.registry.insert(
            &mut state.physics,
            EntityFactory::create_raindrop(Vec2::new(400.0, 270.0)),
            BodyList::Entity,
        );
        let rh = state.registry.handle(roulette).unwrap();
        let dh = state.registry.handle(drop).unwrap();

        state.collisions = vec![(dh, rh)];
        trigger_from_collisions(&mut state, &RulesConfig::default());
        assert!(!wheel_state(&state, roulette).is_spinning());
    }

    #[test]
    fn test_spin_resolves_with_payout() {
        let mut state = state();
        let cfg = RulesConfig {
            roulette_spin_steps: 5,
            roulette_win_chance: 1.0,
            roulette_payout: 3,
            ..Default::default()
        };
        let roulette = state.registry.insert(
            &mut state.physics,
            EntityFactory::create_roulette(Vec2::new(400.0, 300.0)),
            BodyList::Entity,
        );
        if let Some(EntityKind::Roulette(wheel)) = state.registry.kind_mut(roulette) {
            wheel.phase = RoulettePhase::Spinning { remaining_steps: 5 };
        }

        for _ in 0..4 {
            spin(&mut state, &cfg, &SpawnerConfig::default());
            assert!(wheel_state(&state, roulette).is_spinning());
        }
        spin(&mut state, &cfg, &SpawnerConfig::default());

        assert_eq!(wheel_state(&state, roulette).phase, RoulettePhase::Won);
        let balls = state
            .registry
            .ids_where(|k| matches!(k, EntityKind::Ball))
            .len();
        assert_eq!(balls, 3);
        assert!(state.events.contains(&SimEvent::RouletteResult {
            roulette,
            won: true
        }));
    }
}
