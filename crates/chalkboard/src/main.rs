use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chalkboard::config::AppConfig;
use chalkboard::scenario::{EventTally, ScenarioDefinition, ScenarioExecutor, ScenarioExecutorConfig};
use chalkboard::{Simulation, UiSpawn};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (RON) instead of ./config.ron
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run a RON scenario instead of a free run
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Simulated seconds for a free run (default from config)
    #[arg(long)]
    seconds: Option<f64>,

    /// RNG seed (default from config)
    #[arg(long)]
    seed: Option<u64>,

    /// Add a ladder, a cloud and a bubble before a free run
    #[arg(long)]
    props: bool,

    /// Save a PNG of the final frame
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Write scenario snapshots into this directory
    #[arg(long, default_value = "snapshots")]
    snapshot_dir: String,

    /// Save the scenario execution report as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// Debug-level logging
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load_from(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.run.seed = seed;
    }

    let verbose = args.verbose || config.debug.verbose_logging;
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if verbose { "debug" } else { "info" }),
    )
    .init();

    match &args.scenario {
        Some(path) => run_scenario(&args, &config, path),
        None => free_run(&args, &config),
    }
}

fn run_scenario(args: &Args, config: &AppConfig, path: &Path) -> Result<()> {
    let scenario = ScenarioDefinition::from_file(path)?;
    log::info!("Running scenario '{}' from {}", scenario.name, path.display());

    let mut sim = ScenarioExecutor::build_simulation(&scenario, config)?;
    let mut executor = ScenarioExecutor::with_config(ScenarioExecutorConfig {
        capture_snapshots: true,
        snapshot_dir: args.snapshot_dir.clone(),
        verbose: args.verbose,
        frame_rate: config.run.frame_rate,
    });
    let report = executor.execute_scenario(&scenario, &mut sim)?;

    for failure in &report.verification_failures {
        log::error!("Verification failed: {}", failure.message);
    }
    if let Some(path) = &args.report {
        report.save_json(path)?;
        log::info!("Report written to {}", path.display());
    }
    if let Some(path) = &args.snapshot {
        chalkboard::headless::save_snapshot(&sim, path)?;
    }

    if !report.passed {
        anyhow::bail!(
            "Scenario '{}' failed {} verification(s)",
            report.scenario_name,
            report.verification_failures.len()
        );
    }
    log::info!("Scenario '{}' passed", report.scenario_name);
    Ok(())
}

fn free_run(args: &Args, config: &AppConfig) -> Result<()> {
    let seconds = args.seconds.unwrap_or(config.run.seconds);
    let mut sim = Simulation::new(
        config.sim.clone(),
        config.canvas.width as f32,
        config.canvas.height as f32,
        config.run.seed,
    )
    .context("Failed to create simulation")?;

    if args.props {
        for what in [UiSpawn::Ladder, UiSpawn::Cloud, UiSpawn::Bubble] {
            sim.spawn_from_ui(what);
        }
    }

    let frame_rate = config.run.frame_rate;
    let frames = (seconds * frame_rate).round() as u64;
    let mut events = EventTally::default();
    log::info!("Free run: {:.1}s at {} fps", seconds, frame_rate);

    for frame in 1..=frames {
        sim.advance(1.0 / frame_rate);
        events.extend(&sim.drain_events());

        if frame % frame_rate.round().max(1.0) as u64 == 0 {
            let stats = sim.stats();
            log::debug!(
                "t={:.1}s entities={} humanoids={} contained={} climbing={} walls={}",
                sim.time(),
                stats.entities,
                stats.humanoids,
                stats.contained_humanoids,
                stats.climbing_humanoids,
                stats.walls
            );
        }
    }

    let stats = sim.stats();
    log::info!(
        "Finished after {:.1}s: {} entities ({} humanoids), {} physics steps, {} AI ticks, {} events",
        sim.time(),
        stats.entities,
        stats.humanoids,
        stats.steps,
        stats.ai_ticks,
        events.total()
    );

    if let Some(path) = &args.snapshot {
        chalkboard::headless::save_snapshot(&sim, path)?;
    }
    Ok(())
}
