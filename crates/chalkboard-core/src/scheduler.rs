//! Deterministic tick scheduler
//!
//! Each periodic activity keeps its own next-due timestamp on a virtual
//! clock that only moves when [`TickScheduler::advance`] is called. Physics
//! may run a bounded number of catch-up steps per advance; every other
//! activity runs at most once. Backlog beyond that is dropped so a slow
//! frame never turns into a burst of stale ticks.

use crate::config::SimConfig;

const EPSILON: f64 = 1e-9;

/// Periodic activities, in tie-break order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Activity {
    PhysicsStep,
    AiTick,
    Spawn,
    Cleanup,
}

/// One activity occurrence produced by an advance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Due {
    pub activity: Activity,
    /// Virtual time the occurrence was scheduled for
    pub at: f64,
}

#[derive(Debug, Clone)]
struct Slot {
    activity: Activity,
    period: f64,
    next_due: f64,
}

#[derive(Debug, Clone)]
pub struct TickScheduler {
    now: f64,
    slots: Vec<Slot>,
    max_catch_up: u32,
}

impl TickScheduler {
    pub fn new(physics_dt: f64, ai_tick: f64, spawn: f64, cleanup: f64, max_catch_up: u32) -> Self {
        let slot = |activity, period: f64| Slot {
            activity,
            period,
            next_due: period,
        };
        Self {
            now: 0.0,
            slots: vec![
                slot(Activity::PhysicsStep, physics_dt),
                slot(Activity::AiTick, ai_tick),
                slot(Activity::Spawn, spawn),
                slot(Activity::Cleanup, cleanup),
            ],
            max_catch_up: max_catch_up.max(1),
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        // Period computed in f64 so host frames of 1/rate line up with steps
        Self::new(
            1.0 / config.physics.steps_per_second as f64,
            config.timing.ai_tick_secs,
            config.timing.spawn_interval_secs,
            config.timing.cleanup_interval_secs,
            config.timing.max_catch_up_steps,
        )
    }

    /// Current virtual time
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Move the clock forward and return everything that fell due, in time
    /// order with ties broken by [`Activity`] order.
    pub fn advance(&mut self, dt: f64) -> Vec<Due> {
        if !(dt > 0.0) {
            return Vec::new();
        }
        let end = self.now + dt;
        let mut due = Vec::new();

        for slot in &mut self.slots {
            let limit = match slot.activity {
                Activity::PhysicsStep => self.max_catch_up,
                _ => 1,
            };

            let mut fired = 0;
            while slot.next_due <= end + EPSILON && fired < limit {
                due.push(Due {
                    activity: slot.activity,
                    at: slot.next_due,
                });
                slot.next_due += slot.period;
                fired += 1;
            }

            if slot.next_due <= end + EPSILON {
                // Drop the backlog but keep the slot on its original phase
                let behind = ((end - slot.next_due) / slot.period).floor() + 1.0;
                slot.next_due += behind * slot.period;
                while slot.next_due <= end + EPSILON {
                    slot.next_due += slot.period;
                }
                log::trace!(
                    "Scheduler: {:?} dropped {} ticks of backlog",
                    slot.activity,
                    behind as u64
                );
            }
        }

        due.sort_by(|a, b| a.at.total_cmp(&b.at).then(a.activity.cmp(&b.activity)));
        self.now = end;
        due
    }
}
