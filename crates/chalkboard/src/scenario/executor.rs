//! Scenario execution engine

use anyhow::{Result, anyhow, bail};
use chalkboard_core::{EntityId, Simulation, UiSpawn};
use glam::Vec2;
use web_time::Instant;

use super::actions::ScenarioAction;
use super::definition::ScenarioDefinition;
use super::results::{EventTally, ExecutionReport};
use super::verification::VerificationCondition;
use crate::config::AppConfig;

/// Configuration for scenario executor
#[derive(Debug, Clone)]
pub struct ScenarioExecutorConfig {
    /// Write PNG files for snapshot actions
    pub capture_snapshots: bool,

    /// Snapshot output directory
    pub snapshot_dir: String,

    /// Log every action as it runs
    pub verbose: bool,

    /// Host frames per simulated second
    pub frame_rate: f64,
}

impl Default for ScenarioExecutorConfig {
    fn default() -> Self {
        Self {
            capture_snapshots: false,
            snapshot_dir: "snapshots".to_string(),
            verbose: false,
            frame_rate: 60.0,
        }
    }
}

/// Executes scenario actions against a simulation
pub struct ScenarioExecutor {
    config: ScenarioExecutorConfig,

    /// Host frames advanced so far
    frame_count: usize,

    /// Action execution log
    log: Vec<String>,

    snapshots: Vec<String>,

    /// Events drained from the simulation, by label
    events: EventTally,

    /// Frame timings (milliseconds)
    frame_times: Vec<f64>,
}

impl ScenarioExecutor {
    pub fn new() -> Self {
        Self::with_config(ScenarioExecutorConfig::default())
    }

    pub fn with_config(config: ScenarioExecutorConfig) -> Self {
        Self {
            config,
            frame_count: 0,
            log: Vec::new(),
            snapshots: Vec::new(),
            events: EventTally::default(),
            frame_times: Vec::new(),
        }
    }

    /// Build the simulation a scenario runs in, applying its overrides on
    /// top of the host configuration
    pub fn build_simulation(scenario: &ScenarioDefinition, app: &AppConfig) -> Result<Simulation> {
        let (width, height) = scenario
            .canvas
            .unwrap_or((app.canvas.width as f32, app.canvas.height as f32));
        let seed = scenario.seed.unwrap_or(app.run.seed);
        let sim_config = scenario.sim.clone().unwrap_or_else(|| app.sim.clone());

        Simulation::new(sim_config, width, height, seed)
            .map_err(|e| anyhow!("Failed to create simulation for '{}': {}", scenario.name, e))
    }

    /// Execute a complete scenario
    pub fn execute_scenario(
        &mut self,
        scenario: &ScenarioDefinition,
        sim: &mut Simulation,
    ) -> Result<ExecutionReport> {
        let start_time = Instant::now();
        let mut report = ExecutionReport::new(scenario.name.clone());

        self.log.clear();
        self.snapshots.clear();
        self.frame_count = 0;
        self.events = EventTally::default();
        self.frame_times.clear();

        self.log(&format!("Starting scenario: {}", scenario.name));
        self.log(&format!("Description: {}", scenario.description));

        // Execute setup actions
        let setup_start = Instant::now();
        if !scenario.setup.is_empty() {
            self.log(&format!("Running {} setup actions", scenario.setup.len()));
            for (idx, action) in scenario.setup.iter().enumerate() {
                if let Err(e) = self.execute_action(action, sim) {
                    let msg = format!("Setup action {} failed: {}", idx, e);
                    self.log(&msg);
                    report.log = self.log.clone();
                    return Err(anyhow!(msg));
                }
            }
        }
        report.performance.setup_duration_ms = setup_start.elapsed().as_secs_f64() * 1000.0;

        // Execute main actions
        let action_start = Instant::now();
        self.log(&format!("Running {} main actions", scenario.actions.len()));
        for (idx, action) in scenario.actions.iter().enumerate() {
            if let Err(e) = self.execute_action(action, sim) {
                let msg = format!("Action {} failed: {}", idx, e);
                self.log(&msg);
                report.log = self.log.clone();
                return Err(anyhow!(msg));
            }
        }
        report.performance.action_duration_ms = action_start.elapsed().as_secs_f64() * 1000.0;
        report.actions_executed = scenario.setup.len() + scenario.actions.len();

        // Run verifications
        let verify_start = Instant::now();
        if !scenario.verify.is_empty() {
            self.log(&format!("Running {} verifications", scenario.verify.len()));
            for condition in &scenario.verify {
                let result = condition.evaluate(sim, &self.events);
                self.log(&format!(
                    "  {} {}",
                    if result.passed { "PASS" } else { "FAIL" },
                    result.message
                ));

                if !result.passed {
                    report.verification_failures.push(result);
                }
            }
        }
        report.performance.verification_duration_ms = verify_start.elapsed().as_secs_f64() * 1000.0;

        // Cleanup actions (always run)
        if !scenario.cleanup.is_empty() {
            self.log(&format!("Running {} cleanup actions", scenario.cleanup.len()));
            for (idx, action) in scenario.cleanup.iter().enumerate() {
                if let Err(e) = self.execute_action(action, sim) {
                    self.log(&format!("Warning: Cleanup action {} failed: {}", idx, e));
                }
            }
        }

        // Finalize report
        report.frames_executed = self.frame_count;
        report.simulated_seconds = sim.time();
        report.final_stats = sim.stats();
        report.events = self.events.clone();
        report.snapshots = self.snapshots.clone();
        report.passed = report.verification_failures.is_empty();

        report.performance.total_duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;
        if !self.frame_times.is_empty() {
            let total_frame_time: f64 = self.frame_times.iter().sum();
            report.performance.avg_frame_time_ms = total_frame_time / self.frame_times.len() as f64;
            report.performance.peak_frame_time_ms =
                self.frame_times.iter().copied().fold(0.0, f64::max);
        }

        self.log(&format!(
            "Scenario complete: {} ({} frames, {:.1}ms)",
            if report.passed { "PASSED" } else { "FAILED" },
            self.frame_count,
            report.performance.total_duration_ms
        ));
        self.log(&format!("  Performance: {}", report.performance.summary()));
        report.log = self.log.clone();

        Ok(report)
    }

    /// Execute a single action
    fn execute_action(&mut self, action: &ScenarioAction, sim: &mut Simulation) -> Result<()> {
        if self.config.verbose {
            self.log(&format!("[Frame {}] {:?}", self.frame_count, action));
        }

        match action {
            ScenarioAction::Spawn {
                kind,
                x,
                y,
                direction,
            } => {
                let id = spawn_at(sim, *kind, Vec2::new(*x, *y), direction.unwrap_or(1.0));
                self.log(&format!("  Spawned {:?} {} at ({}, {})", kind, id, x, y));
            }

            ScenarioAction::SpawnFromUi { kind } => {
                let id = sim.spawn_from_ui(*kind);
                self.log(&format!("  Spawned {:?} {} from UI", kind, id));
            }

            ScenarioAction::SpawnTick => match sim.spawn_tick() {
                Some(id) => self.log(&format!("  Spawner created {}", id)),
                None => self.log("  Spawner created nothing"),
            },

            ScenarioAction::SetMode { mode } => {
                sim.set_mode(*mode);
                self.log(&format!("  Pointer mode {:?}", mode));
            }

            ScenarioAction::PointerDown { x, y } => sim.pointer_down(Vec2::new(*x, *y)),

            ScenarioAction::PointerMove { x, y } => sim.pointer_move(Vec2::new(*x, *y)),

            ScenarioAction::PointerUp => {
                if let Some(id) = sim.pointer_up() {
                    self.log(&format!("  Stroke {} fused", id));
                }
            }

            ScenarioAction::Stroke { points } => {
                let Some((&(x, y), rest)) = points.split_first() else {
                    bail!("Stroke needs at least one point");
                };
                sim.pointer_down(Vec2::new(x, y));
                for &(x, y) in rest {
                    sim.pointer_move(Vec2::new(x, y));
                }
                let fused = sim.pointer_up();
                self.log(&format!(
                    "  Stroke through {} points ({})",
                    points.len(),
                    fused.map(|id| format!("fused into {}", id)).unwrap_or_else(|| "no geometry".to_string())
                ));
            }

            ScenarioAction::Erase { x, y } => {
                let removed = sim.erase_at(Vec2::new(*x, *y));
                self.log(&format!("  Erased {} bodies at ({}, {})", removed, x, y));
            }

            ScenarioAction::ClearAll => {
                let removed = sim.clear_all();
                self.log(&format!("  Cleared {} strokes", removed));
            }

            ScenarioAction::Pause => sim.pause(),

            ScenarioAction::Resume => sim.resume(),

            ScenarioAction::Resize { width, height } => sim.resize(*width, *height),

            ScenarioAction::WaitFrames { frames } => {
                self.simulate_frames(sim, *frames);
                self.log(&format!("  Waited {} frames", frames));
            }

            ScenarioAction::WaitSeconds { seconds } => {
                let frames = (seconds * self.config.frame_rate).round().max(0.0) as usize;
                self.simulate_frames(sim, frames);
                self.log(&format!("  Waited {:.2}s ({} frames)", seconds, frames));
            }

            ScenarioAction::WaitUntil {
                condition,
                timeout_frames,
            } => {
                self.wait_until(sim, condition, *timeout_frames)?;
            }

            ScenarioAction::Snapshot { filename } => {
                if self.config.capture_snapshots {
                    let path = format!("{}/{}", self.config.snapshot_dir, filename);
                    crate::headless::save_snapshot(sim, &path)?;
                    self.log(&format!("  Snapshot saved: {}", path));
                    self.snapshots.push(path);
                } else {
                    self.log(&format!("  Snapshot capture disabled: {}", filename));
                }
            }

            ScenarioAction::Log { message } => {
                self.log(&format!("  [USER] {}", message));
            }

            ScenarioAction::Sequence { actions } => {
                self.log(&format!("  Sequence: {} actions", actions.len()));
                for action in actions {
                    self.execute_action(action, sim)?;
                }
            }
        }

        self.collect_events(sim);
        Ok(())
    }

    /// Advance the simulation by whole host frames
    fn simulate_frames(&mut self, sim: &mut Simulation, frames: usize) {
        let dt = 1.0 / self.config.frame_rate;
        for _ in 0..frames {
            let frame_start = Instant::now();
            sim.advance(dt);
            self.frame_times
                .push(frame_start.elapsed().as_secs_f64() * 1000.0);
            self.frame_count += 1;
            self.collect_events(sim);
        }
    }

    fn wait_until(
        &mut self,
        sim: &mut Simulation,
        condition: &VerificationCondition,
        timeout_frames: usize,
    ) -> Result<()> {
        for frame in 0..=timeout_frames {
            if condition.evaluate(sim, &self.events).passed {
                self.log(&format!("  Condition met after {} frames", frame));
                return Ok(());
            }
            if frame < timeout_frames {
                self.simulate_frames(sim, 1);
            }
        }

        let last = condition.evaluate(sim, &self.events);
        bail!(
            "Condition not met within {} frames: {}",
            timeout_frames,
            last.message
        )
    }

    fn collect_events(&mut self, sim: &mut Simulation) {
        let events = sim.drain_events();
        self.events.extend(&events);
    }

    fn log(&mut self, message: &str) {
        log::info!("{}", message);
        self.log.push(message.to_string());
    }
}

impl Default for ScenarioExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn a kind at an exact position
fn spawn_at(sim: &mut Simulation, kind: UiSpawn, position: Vec2, direction: f32) -> EntityId {
    match kind {
        UiSpawn::Ball => sim.spawn_ball(position),
        UiSpawn::Humanoid => sim.spawn_humanoid(position, direction.signum()),
        UiSpawn::Ladder => sim.spawn_ladder(position),
        UiSpawn::Cloud => sim.spawn_cloud(position),
        UiSpawn::Bubble => sim.spawn_bubble(position),
        UiSpawn::FloatingBar => sim.spawn_floating_bar(position),
        UiSpawn::QuestionBlock => sim.spawn_question_block(position),
        UiSpawn::Roulette => sim.spawn_roulette(position),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chalkboard_core::{KindTag, PointerMode, SimConfig};

    fn quiet_sim() -> Simulation {
        let mut config = SimConfig::default();
        config.spawner.spawn_chance = 0.0;
        Simulation::new(config, 800.0, 600.0, 5).unwrap()
    }

    #[test]
    fn test_executor_spawn_and_stroke() {
        let mut sim = quiet_sim();
        let mut executor = ScenarioExecutor::new();

        executor
            .execute_action(
                &ScenarioAction::Spawn {
                    kind: UiSpawn::Humanoid,
                    x: 100.0,
                    y: 200.0,
                    direction: Some(-3.0),
                },
                &mut sim,
            )
            .unwrap();
        assert_eq!(sim.state().registry.humanoids()[0].direction, -1.0);
        assert_eq!(executor.events.count("entity_spawned"), 1);

        executor
            .execute_action(
                &ScenarioAction::Stroke {
                    points: vec![(300.0, 100.0), (300.0, 200.0)],
                },
                &mut sim,
            )
            .unwrap();
        assert_eq!(sim.stats().walls, 1);
        assert!(!sim.stroke().is_drawing());
    }

    #[test]
    fn test_empty_stroke_is_error() {
        let mut sim = quiet_sim();
        let mut executor = ScenarioExecutor::new();
        assert!(
            executor
                .execute_action(&ScenarioAction::Stroke { points: vec![] }, &mut sim)
                .is_err()
        );
    }

    #[test]
    fn test_wait_seconds_uses_frame_rate() {
        let mut sim = quiet_sim();
        let mut executor = ScenarioExecutor::new();
        executor
            .execute_action(&ScenarioAction::WaitSeconds { seconds: 0.5 }, &mut sim)
            .unwrap();
        assert_eq!(executor.frame_count, 30);
        assert_eq!(sim.stats().steps, 30);
    }

    #[test]
    fn test_wait_until_timeout_fails() {
        let mut sim = quiet_sim();
        let mut executor = ScenarioExecutor::new();
        let never = ScenarioAction::WaitUntil {
            condition: VerificationCondition::Paused { expected: true },
            timeout_frames: 5,
        };
        assert!(executor.execute_action(&never, &mut sim).is_err());
        assert_eq!(executor.frame_count, 5);
    }

    #[test]
    fn test_full_scenario_report() {
        let scenario = ScenarioDefinition {
            name: "Draw and erase".to_string(),
            description: "A stroke is drawn, then erased".to_string(),
            canvas: None,
            seed: None,
            sim: None,
            setup: vec![ScenarioAction::SetMode {
                mode: PointerMode::Draw,
            }],
            actions: vec![
                ScenarioAction::Stroke {
                    points: vec![(50.0, 50.0), (50.0, 100.0), (50.0, 150.0)],
                },
                ScenarioAction::WaitFrames { frames: 10 },
                ScenarioAction::SetMode {
                    mode: PointerMode::Erase,
                },
                ScenarioAction::Stroke {
                    points: vec![(50.0, 60.0), (50.0, 100.0), (50.0, 140.0)],
                },
            ],
            verify: vec![
                VerificationCondition::WallCount { expected: 0 },
                VerificationCondition::EntityCount {
                    kind: KindTag::DrawnLine,
                    expected: 0,
                    tolerance: None,
                },
                VerificationCondition::RegistryConsistent,
            ],
            cleanup: vec![],
        };

        let mut sim = quiet_sim();
        let mut executor = ScenarioExecutor::new();
        let report = executor.execute_scenario(&scenario, &mut sim).unwrap();

        assert!(report.passed, "failures: {:?}", report.verification_failures);
        assert_eq!(report.frames_executed, 10);
        assert_eq!(report.actions_executed, 5);
        assert_eq!(report.final_stats.walls, 0);
        assert!(report.log.iter().any(|l| l.contains("PASSED")));
    }

    #[test]
    fn test_failed_verification_is_reported() {
        let scenario = ScenarioDefinition {
            name: "Expect a ball".to_string(),
            description: "Nothing spawns a ball".to_string(),
            canvas: Some((400.0, 300.0)),
            seed: Some(1),
            sim: None,
            setup: vec![],
            actions: vec![ScenarioAction::Pause, ScenarioAction::WaitFrames { frames: 3 }],
            verify: vec![
                VerificationCondition::EntityCount {
                    kind: KindTag::Ball,
                    expected: 1,
                    tolerance: None,
                },
                VerificationCondition::Paused { expected: true },
            ],
            cleanup: vec![ScenarioAction::Resume],
        };

        let mut sim = ScenarioExecutor::build_simulation(&scenario, &AppConfig::default()).unwrap();
        assert_eq!(sim.canvas(), Vec2::new(400.0, 300.0));

        let mut executor = ScenarioExecutor::new();
        let report = executor.execute_scenario(&scenario, &mut sim).unwrap();
        assert!(!report.passed);
        assert_eq!(report.verification_failures.len(), 1);
        assert_eq!(report.final_stats.steps, 0);
        assert!(!sim.is_paused());
    }
}
