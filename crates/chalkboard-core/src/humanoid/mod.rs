//! Humanoid AI: records, locomotion state machine and the per-tick driver

mod locomotion;
mod record;

pub use locomotion::{LadderContact, LocomotionDecision, Surroundings, apply, decide, sense};
pub use record::{HumanoidRecord, LocomotionState};

use crate::config::LocomotionConfig;
use crate::events::SimEvent;
use crate::simulation::SimulationState;

/// Run one AI tick over every humanoid record.
///
/// Contained humanoids are passengers and are skipped, as are records whose
/// body disappeared since the last tick. Bodies are read as left by the
/// last physics step.
pub fn run_ai_tick(state: &mut SimulationState, cfg: &LocomotionConfig) {
    let records = state.registry.humanoids().to_vec();

    for mut record in records {
        if record.is_contained() {
            continue;
        }

        let Some(env) = sense(&state.physics, &state.registry, &record, cfg) else {
            log::trace!("AI: skipping {} without a body", record.entity);
            continue;
        };

        let decision = decide(&mut record, &env, cfg, &mut state.rng);

        if let Some(handle) = state.registry.handle(record.entity) {
            apply(&mut state.physics, handle, &decision);
        }
        if decision.footstep {
            state.events.push(SimEvent::Footstep {
                humanoid: record.entity,
            });
        }
        if decision.jumped {
            state.events.push(SimEvent::Jumped {
                humanoid: record.entity,
            });
        }

        if let Some(slot) = state.registry.humanoid_mut(record.entity) {
            *slot = record;
        }
    }

    state.ai_ticks += 1;
}
