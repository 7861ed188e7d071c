//! Host configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `config.ron` file (if exists), or the file passed with `--config`
//! 3. Environment variables prefixed with `CHALKBOARD_`
//!
//! Example environment variable: `CHALKBOARD_SIM__LOCOMOTION__WALK_SPEED=80`

use std::path::Path;

use anyhow::{Context, Result};
use chalkboard_core::SimConfig;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

/// Main host configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub canvas: CanvasConfig,

    #[serde(default)]
    pub run: RunConfig,

    #[serde(default)]
    pub debug: DebugConfig,

    /// Simulation tuning handed to the core
    #[serde(default)]
    pub sim: SimConfig,
}

/// Canvas size in pixels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Free-run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Seed for the simulation RNG
    pub seed: u64,
    /// Simulated seconds for a free run
    pub seconds: f64,
    /// Host frames per simulated second
    pub frame_rate: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            seconds: 30.0,
            frame_rate: 60.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DebugConfig {
    /// Enable verbose logging
    pub verbose_logging: bool,
}

impl AppConfig {
    /// Load configuration with layered priority, reading `config.ron` from
    /// the working directory when present
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Same as [`AppConfig::load`] but with an explicit config file, which
    /// must exist
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Ron).required(true),
            None => File::with_name("config").format(FileFormat::Ron).required(false),
        };

        let builder = Config::builder()
            // Layer 1: Compiled defaults
            .set_default("canvas.width", 800_i64)?
            .set_default("canvas.height", 600_i64)?
            .set_default("run.seed", 42_i64)?
            .set_default("run.seconds", 30.0)?
            .set_default("run.frame_rate", 60.0)?
            .set_default("debug.verbose_logging", false)?
            // Layer 2: Config file
            .add_source(file)
            // Layer 3: Environment variables (CHALKBOARD_RUN__SEED, etc.)
            .add_source(
                Environment::with_prefix("CHALKBOARD")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build().context("Failed to build configuration")?;

        let app: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        app.sim
            .validate()
            .context("Invalid simulation configuration")?;
        Ok(app)
    }
}
