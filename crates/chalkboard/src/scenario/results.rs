//! Execution results and reporting

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chalkboard_core::{SimEvent, SimStats};
use serde::{Deserialize, Serialize};

use super::verification::VerificationResult;

/// Running count of emitted events by label
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTally {
    counts: BTreeMap<String, usize>,
}

impl EventTally {
    pub fn record(&mut self, label: &str) {
        *self.counts.entry(label.to_string()).or_default() += 1;
    }

    pub fn extend<'a>(&mut self, events: impl IntoIterator<Item = &'a SimEvent>) {
        for event in events {
            self.record(event.label());
        }
    }

    pub fn count(&self, label: &str) -> usize {
        self.counts.get(label).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Performance metrics for a scenario execution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Total wall-clock time (milliseconds)
    pub total_duration_ms: f64,

    /// Setup phase duration (milliseconds)
    pub setup_duration_ms: f64,

    /// Main action phase duration (milliseconds)
    pub action_duration_ms: f64,

    /// Verification phase duration (milliseconds)
    pub verification_duration_ms: f64,

    /// Average time per host frame (milliseconds)
    pub avg_frame_time_ms: f64,

    /// Peak frame time (milliseconds)
    pub peak_frame_time_ms: f64,
}

impl PerformanceMetrics {
    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Total: {:.1}ms | Avg frame: {:.2}ms | Peak: {:.2}ms",
            self.total_duration_ms, self.avg_frame_time_ms, self.peak_frame_time_ms
        )
    }
}

/// Report from scenario execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Scenario name
    pub scenario_name: String,

    /// Timestamp (RFC 3339)
    pub timestamp: String,

    /// Overall pass/fail status
    pub passed: bool,

    /// Host frames advanced
    pub frames_executed: usize,

    /// Simulated seconds at the end of the run
    pub simulated_seconds: f64,

    /// Number of actions executed
    pub actions_executed: usize,

    /// Verification failures (empty if all passed)
    pub verification_failures: Vec<VerificationResult>,

    /// Simulation counters at the end of the run
    pub final_stats: SimStats,

    /// Events emitted during the run, by label
    pub events: EventTally,

    /// Execution log messages
    pub log: Vec<String>,

    /// Snapshot file paths
    pub snapshots: Vec<String>,

    pub performance: PerformanceMetrics,
}

impl ExecutionReport {
    pub fn new(scenario_name: String) -> Self {
        Self {
            scenario_name,
            timestamp: chrono::Utc::now().to_rfc3339(),
            passed: false,
            frames_executed: 0,
            simulated_seconds: 0.0,
            actions_executed: 0,
            verification_failures: Vec::new(),
            final_stats: SimStats::default(),
            events: EventTally::default(),
            log: Vec::new(),
            snapshots: Vec::new(),
            performance: PerformanceMetrics::default(),
        }
    }

    /// Check if all verifications passed
    pub fn success(&self) -> bool {
        self.verification_failures.is_empty()
    }

    /// Save report to JSON file
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize execution report to JSON")?;

        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path.as_ref(), json).with_context(|| {
            format!(
                "Failed to write execution report: {}",
                path.as_ref().display()
            )
        })?;

        Ok(())
    }

    /// Load report from JSON file
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read report file: {}", path.as_ref().display()))?;

        let report = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON report: {}", path.as_ref().display()))?;

        Ok(report)
    }
}
