//! Simulation controller
//!
//! [`SimulationState`] holds everything the subsystems read and write.
//! [`Simulation`] owns it together with the configuration, the stroke
//! pipeline and the tick scheduler, and exposes the host-facing operations.
//! One physics step is always: rules pass, then integration. AI ticks read
//! the bodies as the last integration left them.

use glam::Vec2;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use rapier2d::prelude::RigidBodyHandle;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::entity::{EntityFactory, EntityKind, LADDER_HALF_HEIGHT};
use crate::events::SimEvent;
use crate::humanoid::{self, HumanoidRecord};
use crate::lifecycle;
use crate::physics::PhysicsWorld;
use crate::registry::{BodyList, BodyRegistry};
use crate::render::{BodyRenderData, HumanoidRenderData, RenderShape, Renderer};
use crate::rng_trait::SimRng;
use crate::rules::{self, PointerGrab};
use crate::scheduler::{Activity, TickScheduler};
use crate::stroke::{PointerMode, StrokePipeline};
use crate::types::{EntityId, SimError};

/// All mutable simulation data
pub struct SimulationState {
    pub physics: PhysicsWorld,
    pub registry: BodyRegistry,
    /// Canvas size in pixels
    pub canvas: Vec2,
    /// Simulated seconds, advanced by physics steps
    pub time: f64,
    pub paused: bool,
    pub rng: Xoshiro256StarStar,
    /// Pending events for the host
    pub events: Vec<SimEvent>,
    pub grab: Option<PointerGrab>,
    /// Contacts that began during the last physics step
    pub collisions: Vec<(RigidBodyHandle, RigidBodyHandle)>,
    pub ground: Option<EntityId>,
    pub step_count: u64,
    pub ai_ticks: u64,
    ground_thickness: f32,
}

impl SimulationState {
    /// Empty world with a ground slab along the bottom of the canvas
    pub fn new(config: &SimConfig, canvas: Vec2, seed: u64) -> Self {
        let mut state = Self {
            physics: PhysicsWorld::new(Vec2::new(0.0, config.physics.gravity), config.physics_dt()),
            registry: BodyRegistry::new(),
            canvas,
            time: 0.0,
            paused: false,
            rng: Xoshiro256StarStar::seed_from_u64(seed),
            events: Vec::new(),
            grab: None,
            collisions: Vec::new(),
            ground: None,
            step_count: 0,
            ai_ticks: 0,
            ground_thickness: config.physics.ground_thickness,
        };
        state.rebuild_ground();
        state
    }

    /// Y of the ground's top surface
    pub fn ground_top(&self) -> f32 {
        self.canvas.y - self.ground_thickness
    }

    /// Replace the ground slab to fit the current canvas
    pub fn rebuild_ground(&mut self) {
        if let Some(old) = self.ground.take() {
            self.registry.remove(&mut self.physics, old);
        }
        let blueprint = EntityFactory::create_ground(self.canvas.x, self.canvas.y, self.ground_thickness);
        self.ground = Some(
            self.registry
                .insert(&mut self.physics, blueprint, BodyList::Unlisted),
        );
    }

    /// Rules pass followed by one integration step
    pub fn step_physics(&mut self, config: &SimConfig) {
        rules::run(self, config);
        self.collisions = self.physics.step();
        self.time += config.physics_dt() as f64;
        self.step_count += 1;
    }
}

/// Buttons the host UI offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiSpawn {
    Ball,
    Humanoid,
    Ladder,
    Cloud,
    Bubble,
    FloatingBar,
    QuestionBlock,
    Roulette,
}

/// Population counters for the HUD and scenario checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SimStats {
    pub walls: usize,
    pub entities: usize,
    pub humanoids: usize,
    pub contained_humanoids: usize,
    pub climbing_humanoids: usize,
    pub bodies_in_world: usize,
    pub steps: u64,
    pub ai_ticks: u64,
}

/// Sandbox controller
pub struct Simulation {
    state: SimulationState,
    config: SimConfig,
    stroke: StrokePipeline,
    mode: PointerMode,
    scheduler: TickScheduler,
}

impl Simulation {
    pub fn new(config: SimConfig, width: f32, height: f32, seed: u64) -> Result<Self, SimError> {
        config.validate()?;
        if !(width > 0.0 && height > 0.0) {
            return Err(SimError::InvalidCanvas { width, height });
        }

        let state = SimulationState::new(&config, Vec2::new(width, height), seed);
        let scheduler = TickScheduler::from_config(&config);
        log::info!("Simulation started on a {}x{} canvas (seed {})", width, height, seed);

        Ok(Self {
            state,
            config,
            stroke: StrokePipeline::new(),
            mode: PointerMode::Draw,
            scheduler,
        })
    }

    /// Advance wall-clock time. Does nothing while paused, so resuming never
    /// replays skipped ticks.
    pub fn advance(&mut self, dt: f64) {
        if self.state.paused {
            return;
        }

        for due in self.scheduler.advance(dt) {
            match due.activity {
                Activity::PhysicsStep => self.state.step_physics(&self.config),
                Activity::AiTick => humanoid::run_ai_tick(&mut self.state, &self.config.locomotion),
                Activity::Spawn => {
                    lifecycle::spawn_tick(&mut self.state, &self.config);
                }
                Activity::Cleanup => {
                    lifecycle::cleanup_tick(&mut self.state, self.config.spawner.cleanup_margin);
                }
            }
        }
    }

    /// Run exactly one physics step (rules, then integration)
    pub fn step(&mut self) {
        self.state.step_physics(&self.config);
    }

    /// Run exactly one AI tick
    pub fn run_ai_tick(&mut self) {
        humanoid::run_ai_tick(&mut self.state, &self.config.locomotion);
    }

    /// Run one spawner tick, subject to pause and the population cap
    pub fn spawn_tick(&mut self) -> Option<EntityId> {
        lifecycle::spawn_tick(&mut self.state, &self.config)
    }

    /// Remove entities that left the canvas
    pub fn cleanup(&mut self) -> usize {
        lifecycle::cleanup_tick(&mut self.state, self.config.spawner.cleanup_margin)
    }

    pub fn spawn_ball(&mut self, position: Vec2) -> EntityId {
        let spawner = &self.config.spawner;
        let radius = self
            .state
            .rng
            .range(spawner.ball_radius_min, spawner.ball_radius_max);
        lifecycle::spawn_entity(&mut self.state, EntityFactory::create_ball(position, radius))
    }

    pub fn spawn_humanoid(&mut self, position: Vec2, direction: f32) -> EntityId {
        lifecycle::spawn_humanoid(&mut self.state, position, direction)
    }

    pub fn spawn_ladder(&mut self, position: Vec2) -> EntityId {
        lifecycle::spawn_entity(&mut self.state, EntityFactory::create_ladder(position))
    }

    pub fn spawn_cloud(&mut self, position: Vec2) -> EntityId {
        lifecycle::spawn_entity(&mut self.state, EntityFactory::create_cloud(position))
    }

    pub fn spawn_bubble(&mut self, position: Vec2) -> EntityId {
        let phase = self.state.rng.range(0.0, std::f32::consts::TAU);
        lifecycle::spawn_entity(&mut self.state, EntityFactory::create_bubble(position, phase))
    }

    pub fn spawn_floating_bar(&mut self, position: Vec2) -> EntityId {
        lifecycle::spawn_entity(&mut self.state, EntityFactory::create_floating_bar(position))
    }

    pub fn spawn_question_block(&mut self, position: Vec2) -> EntityId {
        lifecycle::spawn_entity(&mut self.state, EntityFactory::create_question_block(position))
    }

    pub fn spawn_roulette(&mut self, position: Vec2) -> EntityId {
        lifecycle::spawn_entity(&mut self.state, EntityFactory::create_roulette(position))
    }

    /// Spawn from a UI button with the placement that button uses
    pub fn spawn_from_ui(&mut self, what: UiSpawn) -> EntityId {
        let Vec2 { x: w, y: h } = self.state.canvas;
        let ground_top = self.state.ground_top();
        let rng = &mut self.state.rng;

        match what {
            UiSpawn::Ball => {
                let at = Vec2::new(rng.range(0.2, 0.8) * w, rng.range(0.05, 0.2) * h);
                self.spawn_ball(at)
            }
            UiSpawn::Humanoid => {
                let point = crate::entity::humanoid_spawn_position(w, h, rng);
                self.spawn_humanoid(point.position, point.direction)
            }
            UiSpawn::Ladder => {
                let at = Vec2::new(rng.range(0.15, 0.85) * w, ground_top - LADDER_HALF_HEIGHT - 1.0);
                self.spawn_ladder(at)
            }
            UiSpawn::Cloud => {
                let at = Vec2::new(rng.range(0.1, 0.9) * w, rng.range(0.08, 0.18) * h);
                self.spawn_cloud(at)
            }
            UiSpawn::Bubble => {
                let at = Vec2::new(rng.range(0.1, 0.9) * w, ground_top - rng.range(30.0, 60.0));
                self.spawn_bubble(at)
            }
            UiSpawn::FloatingBar => {
                let at = Vec2::new(rng.range(0.2, 0.8) * w, rng.range(0.4, 0.7) * h);
                self.spawn_floating_bar(at)
            }
            UiSpawn::QuestionBlock => {
                let at = Vec2::new(rng.range(0.2, 0.8) * w, rng.range(0.45, 0.7) * h);
                self.spawn_question_block(at)
            }
            UiSpawn::Roulette => {
                let at = Vec2::new(rng.range(0.2, 0.8) * w, rng.range(0.3, 0.6) * h);
                self.spawn_roulette(at)
            }
        }
    }

    /// Remove every drawn stroke and notify the host
    pub fn clear_all(&mut self) -> usize {
        self.stroke.clear_all(&mut self.state)
    }

    /// Switch pointer mode. Any gesture in progress is finished first.
    pub fn set_mode(&mut self, mode: PointerMode) {
        if mode == self.mode {
            return;
        }
        self.pointer_up();
        log::debug!("Pointer mode {:?}", mode);
        self.mode = mode;
    }

    pub fn mode(&self) -> PointerMode {
        self.mode
    }

    pub fn pause(&mut self) {
        if !self.state.paused {
            log::info!("Simulation paused");
        }
        self.state.paused = true;
    }

    pub fn resume(&mut self) {
        if self.state.paused {
            log::info!("Simulation resumed");
        }
        self.state.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    pub fn pointer_down(&mut self, point: Vec2) {
        if self.mode == PointerMode::Grab {
            self.state.grab = rules::grab::pick(&self.state, point).map(|entity| {
                log::debug!("Grabbed {}", entity);
                PointerGrab {
                    entity,
                    target: point,
                }
            });
            return;
        }
        self.stroke
            .pointer_down(&mut self.state, self.mode, point, &self.config.stroke);
    }

    pub fn pointer_move(&mut self, point: Vec2) {
        if let Some(grab) = self.state.grab.as_mut() {
            grab.target = point;
            return;
        }
        self.stroke
            .pointer_move(&mut self.state, point, &self.config.stroke);
    }

    /// Finish the current gesture. Returns the fused stroke, if one was drawn.
    pub fn pointer_up(&mut self) -> Option<EntityId> {
        if self.state.grab.take().is_some() {
            return None;
        }
        self.stroke.pointer_up(&mut self.state, &self.config.stroke)
    }

    /// Erase around a point regardless of the current mode
    pub fn erase_at(&mut self, point: Vec2) -> usize {
        let radius = self.config.stroke.erase_radius;
        self.stroke.erase_at(&mut self.state, point, radius)
    }

    /// Apply a new canvas size between ticks. Non-positive sizes are ignored.
    pub fn resize(&mut self, width: f32, height: f32) {
        if !(width > 0.0 && height > 0.0) {
            log::warn!("Ignoring resize to {}x{}", width, height);
            return;
        }
        self.state.canvas = Vec2::new(width, height);
        self.state.rebuild_ground();
        log::info!("Canvas resized to {}x{}", width, height);
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.state.events)
    }

    pub fn stats(&self) -> SimStats {
        let humanoids = self.state.registry.humanoids();
        SimStats {
            walls: self.state.registry.walls().len(),
            entities: self.state.registry.entities().len(),
            humanoids: humanoids.len(),
            contained_humanoids: humanoids.iter().filter(|h| h.is_contained()).count(),
            climbing_humanoids: humanoids.iter().filter(|h| h.is_climbing()).count(),
            bodies_in_world: self.state.physics.body_count(),
            steps: self.state.step_count,
            ai_ticks: self.state.ai_ticks,
        }
    }

    /// Draw every tracked body, then every humanoid sprite
    pub fn render(&self, renderer: &mut impl Renderer) {
        let state = &self.state;
        for id in state.registry.all_ids() {
            let Some(body) = state.registry.get(id) else {
                continue;
            };
            let shapes: Vec<RenderShape> = state
                .physics
                .collider_poses(body.handle)
                .iter()
                .filter_map(|(pose, collider)| to_render_shape(pose, collider))
                .collect();
            renderer.draw_body(&BodyRenderData {
                id,
                shapes,
                style: body.style,
            });
        }

        for record in state.registry.humanoids() {
            let Some(position) = state
                .registry
                .handle(record.entity)
                .and_then(|h| state.physics.position(h))
            else {
                continue;
            };
            renderer.draw_humanoid(&HumanoidRenderData {
                id: record.entity,
                position,
                leg_phase: record.leg_phase,
                facing: record.direction,
                climbing: record.is_climbing(),
            });
        }
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn canvas(&self) -> Vec2 {
        self.state.canvas
    }

    pub fn time(&self) -> f64 {
        self.state.time
    }

    pub fn stroke(&self) -> &StrokePipeline {
        &self.stroke
    }

    pub fn humanoid(&self, id: EntityId) -> Option<&HumanoidRecord> {
        self.state.registry.humanoid(id)
    }

    pub fn kind(&self, id: EntityId) -> Option<&EntityKind> {
        self.state.registry.kind(id)
    }

    pub fn position(&self, id: EntityId) -> Option<Vec2> {
        self.state
            .registry
            .handle(id)
            .and_then(|h| self.state.physics.position(h))
    }

    pub fn velocity(&self, id: EntityId) -> Option<Vec2> {
        self.state
            .registry
            .handle(id)
            .and_then(|h| self.state.physics.velocity(h))
    }
}

fn to_render_shape(
    pose: &rapier2d::prelude::Isometry<f32>,
    collider: &rapier2d::prelude::Collider,
) -> Option<RenderShape> {
    let shape = collider.shape();
    let center = Vec2::new(pose.translation.x, pose.translation.y);

    if let Some(ball) = shape.as_ball() {
        return Some(RenderShape::Circle {
            center,
            radius: ball.radius,
        });
    }
    if let Some(cuboid) = shape.as_cuboid() {
        return Some(RenderShape::Rect {
            center,
            half_extents: Vec2::new(cuboid.half_extents.x, cuboid.half_extents.y),
            angle: pose.rotation.angle(),
        });
    }
    if let Some(capsule) = shape.as_capsule() {
        let a = pose * capsule.segment.a;
        let b = pose * capsule.segment.b;
        return Some(RenderShape::Capsule {
            a: Vec2::new(a.x, a.y),
            b: Vec2::new(b.x, b.y),
            radius: capsule.radius,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim() -> Simulation {
        Simulation::new(SimConfig::default(), 800.0, 600.0, 1).unwrap()
    }

    #[derive(Default)]
    struct Recorder {
        bodies: usize,
        humanoids: Vec<HumanoidRenderData>,
        invisible: usize,
    }

    impl Renderer for Recorder {
        fn draw_body(&mut self, body: &BodyRenderData) {
            self.bodies += 1;
            if !body.style.is_visible() {
                self.invisible += 1;
            }
        }

        fn draw_humanoid(&mut self, humanoid: &HumanoidRenderData) {
            self.humanoids.push(*humanoid);
        }
    }

    #[test]
    fn test_rejects_invalid_canvas() {
        assert!(matches!(
            Simulation::new(SimConfig::default(), 0.0, 600.0, 1),
            Err(SimError::InvalidCanvas { .. })
        ));
    }

    #[test]
    fn test_paused_advance_is_noop() {
        let mut sim = sim();
        sim.pause();
        sim.advance(5.0);
        assert_eq!(sim.stats().steps, 0);
        sim.resume();
        sim.advance(1.0 / 60.0);
        assert_eq!(sim.stats().steps, 1);
    }

    #[test]
    fn test_resize_rebuilds_ground_and_ignores_bad_size() {
        let mut sim = sim();
        let before = sim.state().ground;
        sim.resize(1024.0, 768.0);
        assert_ne!(sim.state().ground, before);
        assert_eq!(sim.canvas(), Vec2::new(1024.0, 768.0));
        assert_eq!(sim.state().physics.body_count(), 1);

        sim.resize(-1.0, 768.0);
        assert_eq!(sim.canvas(), Vec2::new(1024.0, 768.0));
    }

    #[test]
    fn test_render_hides_humanoid_bodies() {
        let mut sim = sim();
        let id = sim.spawn_humanoid(Vec2::new(100.0, 100.0), -1.0);
        sim.spawn_ball(Vec2::new(300.0, 100.0));

        let mut recorder = Recorder::default();
        sim.render(&mut recorder);

        // ground, humanoid, ball
        assert_eq!(recorder.bodies, 3);
        assert_eq!(recorder.invisible, 1);
        assert_eq!(recorder.humanoids.len(), 1);
        assert_eq!(recorder.humanoids[0].id, id);
        assert_eq!(recorder.humanoids[0].facing, -1.0);
    }

    #[test]
    fn test_ui_spawns_land_inside_canvas() {
        let mut sim = sim();
        for what in [
            UiSpawn::Ball,
            UiSpawn::Humanoid,
            UiSpawn::Ladder,
            UiSpawn::Cloud,
            UiSpawn::Bubble,
            UiSpawn::FloatingBar,
            UiSpawn::QuestionBlock,
            UiSpawn::Roulette,
        ] {
            let id = sim.spawn_from_ui(what);
            let p = sim.position(id).unwrap();
            assert!(p.x > 0.0 && p.x < 800.0 && p.y > 0.0 && p.y < 600.0, "{:?} at {:?}", what, p);
        }
        assert_eq!(sim.stats().entities, 8);
        assert_eq!(sim.stats().humanoids, 1);
    }

    #[test]
    fn test_grab_mode_drags_body() {
        let mut sim = sim();
        let ball = sim.spawn_ball(Vec2::new(400.0, 300.0));
        sim.set_mode(PointerMode::Grab);
        sim.pointer_down(Vec2::new(400.0, 300.0));
        assert!(sim.state().grab.is_some());

        sim.pointer_move(Vec2::new(500.0, 300.0));
        for _ in 0..30 {
            sim.step();
        }
        assert!(sim.position(ball).unwrap().x > 450.0);

        sim.pointer_up();
        assert!(sim.state().grab.is_none());
        assert_eq!(sim.stats().walls, 0);
    }
}
