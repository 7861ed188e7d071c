//! End-to-end simulation tests
//!
//! These drive the full controller (rules, rapier stepping, AI ticks,
//! pointer gestures) the way a host would.

use chalkboard_core::collision::HumanoidMask;
use chalkboard_core::entity::{EntityKind, HUMANOID_HALF_HEIGHT};
use chalkboard_core::{LocomotionState, PointerMode, SimConfig, SimEvent, Simulation};
use glam::Vec2;

const WIDTH: f32 = 800.0;
const HEIGHT: f32 = 600.0;

fn quiet_config() -> SimConfig {
    let mut config = SimConfig::default();
    config.locomotion.idle_hop_chance = 0.0;
    config.locomotion.hang_chance = 0.0;
    config
}

fn sim_with(config: SimConfig) -> Simulation {
    Simulation::new(config, WIDTH, HEIGHT, 42).unwrap()
}

fn steps(sim: &mut Simulation, n: usize) {
    for _ in 0..n {
        sim.step();
    }
}

/// One AI tick followed by the physics steps of one AI period
fn ai_period(sim: &mut Simulation) {
    sim.run_ai_tick();
    steps(sim, 6);
}

// ============================================================================
// Physics
// ============================================================================

#[test]
fn test_ball_accelerates_downward_until_contact() {
    let mut sim = sim_with(quiet_config());
    let ball = sim.spawn_ball(Vec2::new(100.0, 100.0));
    assert_eq!(sim.velocity(ball), Some(Vec2::ZERO));

    let mut last_vy = 0.0;
    for _ in 0..30 {
        sim.step();
        let vy = sim.velocity(ball).unwrap().y;
        assert!(vy > last_vy, "vy should increase: {} -> {}", last_vy, vy);
        last_vy = vy;
    }

    // Eventually the ground stops it
    steps(&mut sim, 240);
    let rest = sim.position(ball).unwrap();
    assert!(rest.y < sim.state().ground_top());
}

// ============================================================================
// Strokes
// ============================================================================

fn draw_vertical_stroke(sim: &mut Simulation) -> chalkboard_core::EntityId {
    sim.set_mode(PointerMode::Draw);
    sim.pointer_down(Vec2::new(50.0, 50.0));
    for y in (60..=150).step_by(10) {
        sim.pointer_move(Vec2::new(50.0, y as f32));
    }
    sim.pointer_up().expect("stroke should fuse")
}

#[test]
fn test_stroke_fuses_into_single_compound() {
    let mut sim = sim_with(quiet_config());
    let line = draw_vertical_stroke(&mut sim);

    let state = sim.state();
    assert_eq!(state.registry.walls(), &[line]);
    assert!(matches!(sim.kind(line), Some(EntityKind::DrawnLine(_))));
    // ground + compound, no leftover segments
    assert_eq!(state.physics.body_count(), 2);
    assert!(
        state
            .registry
            .ids_where(|k| matches!(k, EntityKind::WallSegment))
            .is_empty()
    );
    assert!(state.registry.is_consistent(&state.physics));
}

#[test]
fn test_erase_removes_compound_and_is_idempotent() {
    let mut sim = sim_with(quiet_config());
    draw_vertical_stroke(&mut sim);

    sim.set_mode(PointerMode::Erase);
    sim.pointer_down(Vec2::new(50.0, 100.0));
    sim.pointer_up();

    assert!(sim.state().registry.walls().is_empty());
    assert_eq!(sim.state().physics.body_count(), 1);

    let bodies = sim.state().physics.body_count();
    assert_eq!(sim.erase_at(Vec2::new(50.0, 100.0)), 0);
    assert_eq!(sim.state().physics.body_count(), bodies);
}

#[test]
fn test_fused_stroke_floats() {
    let mut sim = sim_with(quiet_config());
    let line = draw_vertical_stroke(&mut sim);
    let start = sim.position(line).unwrap();

    steps(&mut sim, 60);

    let end = sim.position(line).unwrap();
    assert!((end.y - start.y).abs() < 2.0, "stroke fell from {} to {}", start.y, end.y);
}

#[test]
fn test_stroke_ages_out() {
    let mut config = quiet_config();
    config.stroke.lifetime_secs = 0.5;
    let mut sim = sim_with(config);
    let line = draw_vertical_stroke(&mut sim);

    steps(&mut sim, 45);
    assert!(sim.kind(line).is_none());
    assert!(sim.state().registry.walls().is_empty());
}

// ============================================================================
// Humanoid locomotion
// ============================================================================

#[test]
fn test_stuck_against_wall_turns_around_at_threshold() {
    let mut config = quiet_config();
    config.locomotion.escape_jump_speed = 0.0;
    config.locomotion.obstacle_jump_speed = 0.0;
    config.locomotion.obstacle_jump_forward = 0.0;
    let threshold = config.locomotion.turnaround_ticks;
    let mut sim = sim_with(config);

    let ground_top = sim.state().ground_top();
    let humanoid = sim.spawn_humanoid(Vec2::new(250.0, ground_top - HUMANOID_HALF_HEIGHT - 0.5), 1.0);

    // Static wall of unfused segments directly ahead
    sim.set_mode(PointerMode::Draw);
    sim.pointer_down(Vec2::new(300.0, ground_top - 70.0));
    sim.pointer_move(Vec2::new(300.0, ground_top - 2.0));

    let mut previous_counter = 0;
    let mut flipped = false;
    for _ in 0..200 {
        ai_period(&mut sim);
        let record = sim.humanoid(humanoid).unwrap();
        if record.direction < 0.0 {
            assert_eq!(previous_counter, threshold - 1);
            assert_eq!(record.stuck_counter, 0);
            flipped = true;
            break;
        }
        previous_counter = record.stuck_counter;
    }

    assert!(flipped, "humanoid never turned around");
    assert!(sim.position(humanoid).unwrap().x < 300.0);
}

#[test]
fn test_tall_wall_turns_around_with_default_jumps() {
    let config = quiet_config();
    let threshold = config.locomotion.turnaround_ticks;
    let mut sim = sim_with(config);

    let ground_top = sim.state().ground_top();
    let humanoid = sim.spawn_humanoid(Vec2::new(250.0, ground_top - HUMANOID_HALF_HEIGHT - 0.5), 1.0);

    // Far taller than any jump
    sim.set_mode(PointerMode::Draw);
    sim.pointer_down(Vec2::new(300.0, ground_top - 300.0));
    sim.pointer_move(Vec2::new(300.0, ground_top - 2.0));

    let mut previous_counter = 0;
    let mut jumps = 0;
    let mut flipped = false;
    for _ in 0..600 {
        ai_period(&mut sim);
        jumps += sim
            .drain_events()
            .iter()
            .filter(|e| matches!(e, SimEvent::Jumped { .. }))
            .count();
        assert!(sim.position(humanoid).unwrap().x < 300.0, "humanoid got over the wall");

        let record = sim.humanoid(humanoid).unwrap();
        if record.direction < 0.0 {
            assert_eq!(previous_counter, threshold - 1);
            assert_eq!(record.stuck_counter, 0);
            flipped = true;
            break;
        }
        previous_counter = record.stuck_counter;
    }

    assert!(jumps > 1, "obstacle jumps should have been tried first");
    assert!(flipped, "humanoid never turned around");
}

#[test]
fn test_climber_reaches_ladder_top_landing() {
    let mut sim = sim_with(quiet_config());
    let margin = sim.config().locomotion.ladder_top_margin;
    let ground_top = sim.state().ground_top();
    let ladder = sim.spawn_ladder(Vec2::new(400.0, ground_top - 81.0));
    steps(&mut sim, 30);

    let humanoid = sim.spawn_humanoid(Vec2::new(400.0, ground_top - HUMANOID_HALF_HEIGHT - 0.5), 1.0);
    steps(&mut sim, 2);

    let mut climbed = false;
    let mut landed = false;
    for _ in 0..60 {
        ai_period(&mut sim);
        let record = sim.humanoid(humanoid).unwrap();
        match record.state {
            LocomotionState::Climbing => climbed = true,
            LocomotionState::OnLadderTop => {
                let state = sim.state();
                let ladder_handle = state.registry.handle(ladder).unwrap();
                let top = state.physics.bounds(ladder_handle).unwrap().min.y;
                let feet = sim.position(humanoid).unwrap().y + HUMANOID_HALF_HEIGHT;
                assert!((feet - top).abs() <= margin + 1.0, "feet {} vs top {}", feet, top);

                let handle = state.registry.handle(humanoid).unwrap();
                assert_eq!(
                    state.physics.collision_groups(handle),
                    Some(HumanoidMask::Default.groups())
                );
                landed = true;
                break;
            }
            _ => {}
        }
    }

    assert!(climbed, "humanoid never climbed");
    assert!(landed, "humanoid never reached the ladder top");
}

#[test]
fn test_hanging_humanoid_holds_still() {
    let mut config = quiet_config();
    config.locomotion.hang_chance = 1.0;
    let mut sim = sim_with(config);

    // Static stroke right at the hands of a falling humanoid
    sim.set_mode(PointerMode::Draw);
    sim.pointer_down(Vec2::new(262.0, 240.0));
    sim.pointer_move(Vec2::new(262.0, 360.0));
    let humanoid = sim.spawn_humanoid(Vec2::new(249.0, 300.0), 1.0);

    steps(&mut sim, 5);
    assert!(sim.velocity(humanoid).unwrap().y > 30.0);

    sim.run_ai_tick();
    let record = sim.humanoid(humanoid).unwrap();
    assert_eq!(record.state, LocomotionState::Hanging);
    assert!(record.hanging_counter >= sim.config().locomotion.hang_ticks_min);

    let held_at = sim.position(humanoid).unwrap();
    steps(&mut sim, 6);
    for _ in 0..5 {
        ai_period(&mut sim);
        assert!(sim.humanoid(humanoid).unwrap().is_hanging());
    }
    let now = sim.position(humanoid).unwrap();
    assert!(now.distance(held_at) < 1.0, "drifted from {:?} to {:?}", held_at, now);
}

#[test]
fn test_ladder_climb_and_head_blocked_descent() {
    let mut sim = sim_with(quiet_config());
    let ground_top = sim.state().ground_top();
    sim.spawn_ladder(Vec2::new(400.0, ground_top - 81.0));
    steps(&mut sim, 30);

    let humanoid = sim.spawn_humanoid(Vec2::new(395.0, ground_top - HUMANOID_HALF_HEIGHT - 0.5), 1.0);
    steps(&mut sim, 2);

    sim.run_ai_tick();
    let record = sim.humanoid(humanoid).unwrap();
    assert_eq!(record.state, LocomotionState::Climbing);
    let v = sim.velocity(humanoid).unwrap();
    assert!((v.y + 90.0).abs() < 1e-3, "expected ascend, got {}", v.y);
    assert!(v.x > 0.0, "should be pulled toward the ladder center");

    // Ceiling just above the head
    let head = sim.position(humanoid).unwrap().y - HUMANOID_HALF_HEIGHT - 6.0;
    sim.pointer_down(Vec2::new(385.0, head));
    sim.pointer_move(Vec2::new(415.0, head));

    sim.run_ai_tick();
    let v = sim.velocity(humanoid).unwrap();
    assert!((v.y - 120.0).abs() < 1e-3, "expected descend, got {}", v.y);
    assert!(sim.humanoid(humanoid).unwrap().is_climbing());
}

#[test]
fn test_humanoids_stay_upright_in_free_run() {
    let mut config = SimConfig::default();
    config.spawner.spawn_chance = 1.0;
    config.timing.spawn_interval_secs = 0.5;
    let mut sim = sim_with(config);
    sim.spawn_ladder(Vec2::new(400.0, 499.0));
    draw_vertical_stroke(&mut sim);

    for _ in 0..(60 * 15) {
        sim.advance(1.0 / 60.0);
        let state = sim.state();
        for record in state.registry.humanoids() {
            let handle = state.registry.handle(record.entity).unwrap();
            assert_eq!(state.physics.angle(handle), Some(0.0));
        }
        assert!(state.registry.is_consistent(&state.physics));
    }

    let stats = sim.stats();
    assert!(stats.entities > 0);
    assert!(stats.entities <= sim.config().spawner.max_entities);
}

// ============================================================================
// World rules
// ============================================================================

#[test]
fn test_two_bubbles_capture_once() {
    let mut sim = sim_with(quiet_config());
    let b1 = sim.spawn_bubble(Vec2::new(200.0, 300.0));
    let b2 = sim.spawn_bubble(Vec2::new(215.0, 300.0));
    let humanoid = sim.spawn_humanoid(Vec2::new(207.0, 300.0), 1.0);

    sim.step();

    let contained: Vec<_> = [b1, b2]
        .iter()
        .filter_map(|b| sim.kind(*b).and_then(|k| k.as_bubble()).and_then(|s| s.contained))
        .collect();
    assert_eq!(contained, vec![humanoid]);
    assert_eq!(sim.stats().contained_humanoids, 1);

    // Passenger rides along
    steps(&mut sim, 30);
    let bubble = sim.humanoid(humanoid).unwrap().contained_in.unwrap();
    let bp = sim.position(bubble).unwrap();
    let hp = sim.position(humanoid).unwrap();
    assert!(bp.distance(hp) < 10.0);

    let captures = sim
        .drain_events()
        .iter()
        .filter(|e| matches!(e, SimEvent::BubbleCaptured { .. }))
        .count();
    assert_eq!(captures, 1);
}

#[test]
fn test_one_bubble_never_holds_two_humanoids() {
    let mut sim = sim_with(quiet_config());
    let bubble = sim.spawn_bubble(Vec2::new(300.0, 300.0));
    let h1 = sim.spawn_humanoid(Vec2::new(294.0, 300.0), 1.0);
    let h2 = sim.spawn_humanoid(Vec2::new(306.0, 300.0), -1.0);

    for _ in 0..20 {
        sim.step();
        let captured: Vec<_> = [h1, h2]
            .into_iter()
            .filter(|h| sim.humanoid(*h).unwrap().is_contained())
            .collect();
        assert_eq!(captured.len(), 1);
        let passenger = sim.kind(bubble).and_then(|k| k.as_bubble()).and_then(|b| b.contained);
        assert_eq!(passenger, Some(captured[0]));
    }

    let passenger = sim.kind(bubble).and_then(|k| k.as_bubble()).and_then(|b| b.contained);
    let other = if passenger == Some(h1) { h2 } else { h1 };
    let state = sim.state();
    let handle = state.registry.handle(other).unwrap();
    assert_eq!(
        state.physics.collision_groups(handle),
        Some(HumanoidMask::Default.groups())
    );
    assert_eq!(sim.stats().contained_humanoids, 1);
}

#[test]
fn test_erasing_bubble_releases_passenger() {
    let mut sim = sim_with(quiet_config());
    let bubble = sim.spawn_bubble(Vec2::new(600.0, 300.0));
    let humanoid = sim.spawn_humanoid(Vec2::new(600.0, 310.0), -1.0);
    sim.step();
    assert!(sim.humanoid(humanoid).unwrap().is_contained());

    sim.step();

    // Just above the bubble rim, out of reach of the passenger's head
    let at = sim.position(bubble).unwrap() - Vec2::new(0.0, 44.0);
    assert_eq!(sim.erase_at(at), 1);
    assert!(sim.kind(bubble).is_none());
    assert!(!sim.humanoid(humanoid).unwrap().is_contained());
    assert!(
        sim.drain_events()
            .iter()
            .any(|e| matches!(e, SimEvent::BubblePopped { .. }))
    );
}

#[test]
fn test_question_block_pops_coin_for_jumping_ball() {
    let mut sim = sim_with(quiet_config());
    let block = sim.spawn_question_block(Vec2::new(400.0, 300.0));
    let ball = sim.spawn_ball(Vec2::new(400.0, 400.0));
    let handle = sim.state().registry.handle(ball).unwrap();
    sim.state_mut()
        .physics
        .set_velocity(handle, Vec2::new(0.0, -500.0));

    let mut popped = false;
    for _ in 0..20 {
        sim.step();
        if sim
            .drain_events()
            .iter()
            .any(|e| matches!(e, SimEvent::CoinPopped { block: b, .. } if *b == block))
        {
            popped = true;
            break;
        }
    }
    assert!(popped);
}

#[test]
fn test_floating_bar_holds_position() {
    let mut sim = sim_with(quiet_config());
    let bar = sim.spawn_floating_bar(Vec2::new(300.0, 250.0));
    steps(&mut sim, 120);
    let p = sim.position(bar).unwrap();
    assert!((p - Vec2::new(300.0, 250.0)).length() < 1.0);
}

// ============================================================================
// Controller
// ============================================================================

#[test]
fn test_pause_blocks_spawner_and_resume_has_no_backlog() {
    let mut config = quiet_config();
    config.spawner.spawn_chance = 1.0;
    let mut sim = sim_with(config);

    sim.pause();
    for _ in 0..600 {
        sim.advance(1.0 / 60.0);
    }
    assert_eq!(sim.stats().entities, 0);
    assert_eq!(sim.stats().steps, 0);

    sim.resume();
    sim.advance(1.0 / 60.0);
    assert_eq!(sim.stats().steps, 1);
    assert_eq!(sim.stats().entities, 0);
}

#[test]
fn test_clear_all_keeps_ladders_and_notifies() {
    let mut sim = sim_with(quiet_config());
    let ladder = sim.spawn_ladder(Vec2::new(600.0, 499.0));
    draw_vertical_stroke(&mut sim);

    assert_eq!(sim.clear_all(), 1);
    assert!(sim.kind(ladder).is_some());
    assert!(
        sim.drain_events()
            .contains(&SimEvent::SceneCleared { removed: 1 })
    );
}
