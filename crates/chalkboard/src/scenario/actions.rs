//! Scripted actions a scenario can perform

use chalkboard_core::{PointerMode, UiSpawn};
use serde::{Deserialize, Serialize};

use super::verification::VerificationCondition;

/// One scripted step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScenarioAction {
    // === SPAWNING ===
    /// Spawn a kind at an exact position
    Spawn {
        kind: UiSpawn,
        x: f32,
        y: f32,
        /// Humanoid walking direction (+1 right, -1 left)
        #[serde(default)]
        direction: Option<f32>,
    },

    /// Spawn a kind with the placement its UI button uses
    SpawnFromUi { kind: UiSpawn },

    /// Run the random spawner once
    SpawnTick,

    // === POINTER ===
    SetMode { mode: PointerMode },

    PointerDown { x: f32, y: f32 },

    PointerMove { x: f32, y: f32 },

    PointerUp,

    /// Full gesture through the given points in the current mode
    Stroke { points: Vec<(f32, f32)> },

    /// Erase around a point regardless of mode
    Erase { x: f32, y: f32 },

    ClearAll,

    // === CONTROLLER ===
    Pause,

    Resume,

    Resize { width: f32, height: f32 },

    // === CONTROL FLOW ===
    /// Advance by a number of host frames
    WaitFrames { frames: usize },

    /// Advance by simulated seconds
    WaitSeconds { seconds: f64 },

    /// Advance frame by frame until the condition holds
    WaitUntil {
        condition: VerificationCondition,
        timeout_frames: usize,
    },

    /// Render the canvas to a PNG
    Snapshot { filename: String },

    Log { message: String },

    Sequence { actions: Vec<ScenarioAction> },
}
