//! Question blocks pop a coin when hit from below

use glam::Vec2;

use crate::config::RulesConfig;
use crate::entity::{COIN_RADIUS, EntityFactory, EntityKind, QUESTION_BLOCK_HALF};
use crate::events::SimEvent;
use crate::lifecycle;
use crate::simulation::SimulationState;
use crate::types::EntityId;

/// Bodies that can hit a block: dynamic, and not blocks, coins or bubbles
fn hitters(state: &SimulationState) -> Vec<(Vec2, Vec2)> {
    state
        .registry
        .entities()
        .iter()
        .filter(|id| {
            !matches!(
                state.registry.kind(**id),
                Some(EntityKind::QuestionBlock(_) | EntityKind::Coin | EntityKind::Bubble(_)) | None
            )
        })
        .filter_map(|id| state.registry.handle(*id))
        .filter(|h| state.physics.is_dynamic(*h))
        .filter_map(|h| Some((state.physics.position(h)?, state.physics.velocity(h)?)))
        .collect()
}

pub fn hit(state: &mut SimulationState, cfg: &RulesConfig) {
    let blocks: Vec<EntityId> = state
        .registry
        .entities()
        .iter()
        .copied()
        .filter(|id| matches!(state.registry.kind(*id), Some(EntityKind::QuestionBlock(_))))
        .collect();
    if blocks.is_empty() {
        return;
    }

    let hitters = hitters(state);
    let now = state.time;

    for block in blocks {
        let cooling = match state.registry.kind(block) {
            Some(EntityKind::QuestionBlock(qb)) => now < qb.cooldown_until,
            _ => true,
        };
        if cooling {
            continue;
        }
        let Some(center) = state
            .registry
            .handle(block)
            .and_then(|h| state.physics.position(h))
        else {
            continue;
        };

        let struck = hitters.iter().any(|(pos, vel)| {
            let below = pos.y > center.y && pos.y - center.y <= cfg.question_block_reach;
            let rising = vel.y < -cfg.question_block_hit_speed;
            let aligned = (pos.x - center.x).abs() <= QUESTION_BLOCK_HALF + cfg.question_block_tolerance;
            below && rising && aligned
        });
        if !struck {
            continue;
        }

        if let Some(EntityKind::QuestionBlock(qb)) = state.registry.kind_mut(block) {
            qb.cooldown_until = now + cfg.question_block_cooldown_secs;
        }

        let spawn_at = center - Vec2::new(0.0, QUESTION_BLOCK_HALF + COIN_RADIUS + 2.0);
        let coin = lifecycle::spawn_entity(
            state,
            EntityFactory::create_coin(spawn_at).with_velocity(Vec2::new(0.0, -cfg.coin_pop_speed)),
        );
        log::debug!("Question block {} popped coin {}", block, coin);
        state.events.push(SimEvent::CoinPopped { block, coin });
    }
}
