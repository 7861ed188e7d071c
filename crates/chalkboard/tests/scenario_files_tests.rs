//! Runs every bundled RON scenario headless and expects it to pass

use std::path::PathBuf;

use chalkboard::config::AppConfig;
use chalkboard::scenario::{ScenarioDefinition, ScenarioExecutor, ScenarioExecutorConfig};

fn scenario_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios")
}

fn run(name: &str) -> chalkboard::scenario::ExecutionReport {
    let path = scenario_dir().join(name);
    let scenario = ScenarioDefinition::from_file(&path).unwrap();
    let mut sim = ScenarioExecutor::build_simulation(&scenario, &AppConfig::default()).unwrap();
    let mut executor = ScenarioExecutor::new();
    let report = executor.execute_scenario(&scenario, &mut sim).unwrap();
    assert!(
        report.passed,
        "{} failed: {:#?}\n{}",
        name,
        report.verification_failures,
        report.log.join("\n")
    );
    report
}

// ============================================================================
// Bundled scenarios
// ============================================================================

#[test]
fn test_all_scenario_files_parse() {
    let mut count = 0;
    for entry in std::fs::read_dir(scenario_dir()).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().is_some_and(|e| e == "ron") {
            ScenarioDefinition::from_file(&path)
                .unwrap_or_else(|e| panic!("{}: {:#}", path.display(), e));
            count += 1;
        }
    }
    assert!(count >= 4);
}

#[test]
fn test_stroke_and_erase_scenario() {
    let report = run("stroke_and_erase.ron");
    assert_eq!(report.final_stats.walls, 0);
    // Snapshots are off by default
    assert!(report.snapshots.is_empty());
}

#[test]
fn test_bubble_capture_scenario() {
    let report = run("bubble_capture.ron");
    assert_eq!(report.events.count("bubble_captured"), 1);
}

#[test]
fn test_ladder_climb_scenario() {
    let report = run("ladder_climb.ron");
    assert!(report.final_stats.climbing_humanoids >= 1);
}

#[test]
fn test_free_spawn_scenario() {
    let report = run("free_spawn.ron");
    // 12s running, then 5s paused
    assert_eq!(report.final_stats.steps, 720);
    assert!(report.events.count("entity_spawned") >= 6);
}

// ============================================================================
// Snapshots
// ============================================================================

#[test]
fn test_scenario_snapshot_written() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = ScenarioDefinition::from_file(scenario_dir().join("ladder_climb.ron")).unwrap();
    let mut sim = ScenarioExecutor::build_simulation(&scenario, &AppConfig::default()).unwrap();
    let mut executor = ScenarioExecutor::with_config(ScenarioExecutorConfig {
        capture_snapshots: true,
        snapshot_dir: dir.path().display().to_string(),
        ..ScenarioExecutorConfig::default()
    });

    let report = executor.execute_scenario(&scenario, &mut sim).unwrap();
    assert_eq!(report.snapshots.len(), 1);

    let image = image::open(&report.snapshots[0]).unwrap().to_rgba8();
    assert_eq!(image.dimensions(), (800, 600));
}
