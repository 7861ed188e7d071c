//! Simulation tuning
//!
//! Units are pixels and seconds, y pointing down. Speeds that read more
//! naturally per frame are stored per second at 60 frames per second
//! (e.g. a walk of 2 px/frame becomes 120 px/s).

use serde::{Deserialize, Serialize};

use crate::types::SimError;

/// Complete tuning tree for one simulation
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SimConfig {
    #[serde(default)]
    pub physics: PhysicsConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub locomotion: LocomotionConfig,

    #[serde(default)]
    pub stroke: StrokeConfig,

    #[serde(default)]
    pub rules: RulesConfig,

    #[serde(default)]
    pub spawner: SpawnerConfig,
}

/// Physics world settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward gravity in pixels/sec^2
    pub gravity: f32,
    /// Physics steps per simulated second
    pub steps_per_second: f32,
    /// Linear speed clamp applied after every rules pass (pixels/sec)
    pub max_speed: f32,
    /// Height of the ground slab above the canvas bottom
    pub ground_thickness: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 980.0,
            steps_per_second: 60.0,
            max_speed: 2400.0,
            ground_thickness: 20.0,
        }
    }
}

/// Cadence of the independent periodic activities
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Humanoid AI period in seconds
    pub ai_tick_secs: f64,
    /// Random spawner period in seconds
    pub spawn_interval_secs: f64,
    /// Out-of-bounds sweep period in seconds
    pub cleanup_interval_secs: f64,
    /// Maximum physics steps run to catch up in a single advance
    pub max_catch_up_steps: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            ai_tick_secs: 0.1,
            spawn_interval_secs: 2.0,
            cleanup_interval_secs: 4.0,
            max_catch_up_steps: 8,
        }
    }
}

/// Humanoid locomotion tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Horizontal walking speed (px/s)
    pub walk_speed: f32,
    /// Ladder ascend speed (px/s, applied upward)
    pub climb_speed: f32,
    /// Ladder descend speed when the head is blocked (px/s, applied downward)
    pub descend_speed: f32,
    /// Horizontal pull toward the ladder center (1/s)
    pub ladder_attraction: f32,
    /// Feet within this distance of the ladder top count as on top. Must cover
    /// one climb stride (`climb_speed * ai_tick_secs`) so a climber cannot
    /// step over the landing.
    pub ladder_top_margin: f32,
    /// Vertical velocity multiplier while walking across a ladder top
    pub ladder_top_damping: f32,

    /// |vy| above this means airborne (hang check)
    pub airborne_speed: f32,
    /// |vy| below this, with footing under the feet, means grounded (jumps)
    pub grounded_speed: f32,
    /// Both |vx| and |vy| below this counts as a stuck tick
    pub stuck_speed: f32,
    /// Stuck ticks before the escape jump
    pub escape_jump_ticks: u32,
    /// Stuck ticks before turning around
    pub turnaround_ticks: u32,
    pub escape_jump_speed: f32,
    /// Horizontal push in the new direction after turning around
    pub turnaround_push: f32,
    pub turnaround_hop: f32,

    pub obstacle_jump_speed: f32,
    pub obstacle_jump_forward: f32,
    /// Per-tick chance of a small hop while grounded
    pub idle_hop_chance: f32,
    pub idle_hop_speed: f32,

    /// Chance to grab a stroke while airborne next to it
    pub hang_chance: f32,
    pub hang_ticks_min: u32,
    pub hang_ticks_max: u32,

    /// Gait phase advance per AI tick
    pub leg_phase_step: f32,
    /// Minimum |vx| for a footstep cue
    pub footstep_speed: f32,

    /// Forward obstacle probe, measured from the body edge
    pub forward_probe_distance: f32,
    /// Forward probe offset below the body center
    pub forward_probe_drop: f32,
    /// Ceiling probe above the head while climbing
    pub head_probe_distance: f32,
    /// Footing probe below the feet
    pub foot_probe_distance: f32,
    /// Hand probe distance for hanging, measured from the body edge
    pub grip_probe_distance: f32,
    /// Probe tolerance around each probe point
    pub probe_radius: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            walk_speed: 120.0,
            climb_speed: 90.0,
            descend_speed: 120.0,
            ladder_attraction: 9.0,
            ladder_top_margin: 12.0,
            ladder_top_damping: 0.2,

            airborne_speed: 30.0,
            grounded_speed: 30.0,
            stuck_speed: 12.0,
            escape_jump_ticks: 15,
            turnaround_ticks: 30,
            escape_jump_speed: 300.0,
            turnaround_push: 60.0,
            turnaround_hop: 120.0,

            obstacle_jump_speed: 360.0,
            obstacle_jump_forward: 60.0,
            idle_hop_chance: 0.02,
            idle_hop_speed: 180.0,

            hang_chance: 0.2,
            hang_ticks_min: 30,
            hang_ticks_max: 60,

            leg_phase_step: 0.35,
            footstep_speed: 20.0,

            forward_probe_distance: 6.0,
            forward_probe_drop: 8.0,
            head_probe_distance: 6.0,
            foot_probe_distance: 2.0,
            grip_probe_distance: 4.0,
            probe_radius: 1.5,
        }
    }
}

/// Freehand stroke and eraser settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeConfig {
    /// Distance between interpolated samples along a drag
    pub sample_step: f32,
    /// Radius of each chalk segment
    pub segment_radius: f32,
    /// Maximum positional jitter per segment
    pub jitter: f32,
    pub erase_radius: f32,
    /// Fused strokes are removed after this many seconds
    pub lifetime_secs: f64,
}

impl Default for StrokeConfig {
    fn default() -> Self {
        Self {
            sample_step: 2.0,
            segment_radius: 3.0,
            jitter: 1.0,
            erase_radius: 20.0,
            lifetime_secs: 60.0,
        }
    }
}

/// World interaction rule tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Bubble captures a humanoid whose center is closer than this
    pub capture_radius: f32,
    /// Peak sideways sway acceleration (px/s^2)
    pub sway_accel: f32,
    /// Sway oscillation in radians per second
    pub sway_frequency: f32,
    /// Constant horizontal drift acceleration
    pub drift_accel: f32,
    /// Net upward acceleration on top of cancelled gravity
    pub lift_accel: f32,

    pub roulette_spin_steps: u32,
    /// Visual face flips every N spinning steps
    pub roulette_flip_interval: u32,
    pub roulette_win_chance: f32,
    /// Balls spawned on a win
    pub roulette_payout: u32,
    /// Max horizontal speed of payout balls
    pub roulette_payout_spread: f32,

    pub question_block_cooldown_secs: f64,
    /// Minimum upward speed of a hitting body
    pub question_block_hit_speed: f32,
    /// Extra horizontal tolerance beyond the block's half width
    pub question_block_tolerance: f32,
    /// Maximum distance below the block center to count as a hit
    pub question_block_reach: f32,
    pub coin_pop_speed: f32,

    /// Seconds between rain attempts per cloud
    pub rain_interval_secs: f32,
    pub rain_chance: f32,
    /// Raindrops are removed once within this distance of the ground top
    pub rain_floor_margin: f32,

    /// Spring gain pulling a grabbed body toward the pointer (1/s)
    pub grab_stiffness: f32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            capture_radius: 30.0,
            sway_accel: 60.0,
            sway_frequency: 1.5,
            drift_accel: 8.0,
            lift_accel: 15.0,

            roulette_spin_steps: 180,
            roulette_flip_interval: 10,
            roulette_win_chance: 0.2,
            roulette_payout: 5,
            roulette_payout_spread: 90.0,

            question_block_cooldown_secs: 0.5,
            question_block_hit_speed: 30.0,
            question_block_tolerance: 6.0,
            question_block_reach: 48.0,
            coin_pop_speed: 360.0,

            rain_interval_secs: 0.5,
            rain_chance: 0.6,
            rain_floor_margin: 8.0,

            grab_stiffness: 12.0,
        }
    }
}

/// Random spawner and cleanup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    /// Chance that a spawn tick creates anything
    pub spawn_chance: f32,
    /// Share of spawns that are humanoids (rest are balls)
    pub humanoid_share: f32,
    /// Spawner stops while the entity list holds this many bodies
    pub max_entities: usize,
    /// Bodies further than this outside the canvas are removed
    pub cleanup_margin: f32,
    pub ball_radius_min: f32,
    pub ball_radius_max: f32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            spawn_chance: 0.5,
            humanoid_share: 0.5,
            max_entities: 60,
            cleanup_margin: 100.0,
            ball_radius_min: 10.0,
            ball_radius_max: 20.0,
        }
    }
}

impl SimConfig {
    /// Length of one physics step in seconds
    pub fn physics_dt(&self) -> f32 {
        1.0 / self.physics.steps_per_second
    }

    /// Reject values that would stall the scheduler or break random ranges
    pub fn validate(&self) -> Result<(), SimError> {
        fn fail(msg: &str) -> Result<(), SimError> {
            Err(SimError::InvalidConfig(msg.to_string()))
        }

        if !(self.physics.steps_per_second > 0.0) {
            return fail("physics.steps_per_second must be positive");
        }
        if self.timing.ai_tick_secs <= 0.0
            || self.timing.spawn_interval_secs <= 0.0
            || self.timing.cleanup_interval_secs <= 0.0
        {
            return fail("timing periods must be positive");
        }
        if self.timing.max_catch_up_steps == 0 {
            return fail("timing.max_catch_up_steps must be at least 1");
        }
        if self.stroke.sample_step <= 0.0 || self.stroke.segment_radius <= 0.0 {
            return fail("stroke.sample_step and stroke.segment_radius must be positive");
        }
        if self.locomotion.hang_ticks_min > self.locomotion.hang_ticks_max {
            return fail("locomotion.hang_ticks_min exceeds hang_ticks_max");
        }
        let climb_stride = self.locomotion.climb_speed as f64 * self.timing.ai_tick_secs;
        if (self.locomotion.ladder_top_margin as f64) < climb_stride {
            return fail("locomotion.ladder_top_margin must cover one climb stride");
        }
        if self.locomotion.escape_jump_ticks == 0 || self.locomotion.turnaround_ticks == 0 {
            return fail("stuck thresholds must be at least 1");
        }
        if self.spawner.ball_radius_min > self.spawner.ball_radius_max
            || self.spawner.ball_radius_min <= 0.0
        {
            return fail("spawner ball radius range is invalid");
        }

        let probabilities = [
            self.locomotion.idle_hop_chance,
            self.locomotion.hang_chance,
            self.rules.roulette_win_chance,
            self.rules.rain_chance,
            self.spawner.spawn_chance,
            self.spawner.humanoid_share,
        ];
        if probabilities.iter().any(|p| !(0.0..=1.0).contains(p)) {
            return fail("probabilities must lie in [0, 1]");
        }

        Ok(())
    }
}
