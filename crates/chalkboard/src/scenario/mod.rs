//! RON-scripted headless scenarios
//!
//! A scenario sets up a sandbox, drives it with pointer gestures, spawns and
//! waits, then checks the resulting state. Runs produce an
//! [`ExecutionReport`] that can be saved as JSON.

mod actions;
mod definition;
mod executor;
mod results;
mod verification;

pub use actions::ScenarioAction;
pub use definition::ScenarioDefinition;
pub use executor::{ScenarioExecutor, ScenarioExecutorConfig};
pub use results::{EventTally, ExecutionReport, PerformanceMetrics};
pub use verification::{Region, VerificationCondition, VerificationResult};
