//! World interaction rules
//!
//! Run once per physics step, before integration, so every force and
//! position override they produce is consumed by the same step.

pub mod bubbles;
pub mod despawn;
pub mod floating;
pub mod grab;
pub mod question_block;
pub mod roulette;
pub mod weather;

pub use grab::PointerGrab;

use crate::config::SimConfig;
use crate::simulation::SimulationState;

/// One full rules pass
pub fn run(state: &mut SimulationState, config: &SimConfig) {
    let rules = &config.rules;
    let dt = config.physics_dt();

    // Contacts from the previous step
    roulette::trigger_from_collisions(state, rules);

    bubbles::capture(state, rules);
    bubbles::carry(state);

    grab::drive(state, rules.grab_stiffness);

    floating::apply_anti_gravity(state);
    bubbles::sway(state, rules);
    floating::lock_fixed(state);

    despawn::age_strokes(state, config.stroke.lifetime_secs);

    let ground_top = state.canvas.y - config.physics.ground_thickness;
    despawn::despawn_rain(state, ground_top, rules.rain_floor_margin);
    weather::rain(state, rules, dt);

    roulette::spin(state, rules, &config.spawner);
    question_block::hit(state, rules);
    despawn::despawn_fallen_coins(state);

    state.physics.clamp_velocities(config.physics.max_speed);
}
