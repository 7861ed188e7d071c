//! Verification conditions and state checks for scenarios

use chalkboard_core::{EntityId, KindTag, Simulation};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::results::EventTally;

/// Conditions that can be verified against simulation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VerificationCondition {
    // === POPULATION CHECKS ===
    /// Assert exact count of tracked bodies of one kind
    EntityCount {
        kind: KindTag,
        expected: usize,
        #[serde(default)]
        tolerance: Option<usize>, // Allow ±N variance
    },

    /// Assert count of one kind within range
    EntityCountRange { kind: KindTag, min: usize, max: usize },

    /// Assert number of drawn strokes and pending segments
    WallCount { expected: usize },

    HumanoidCount { min: usize, max: usize },

    // === HUMANOID STATE CHECKS ===
    /// Assert number of humanoids riding bubbles
    ContainedHumanoids { expected: usize },

    ClimbingHumanoids { min: usize },

    // === SPATIAL CHECKS ===
    /// Assert at least one body of the kind has its center in the region
    EntityInRegion { kind: KindTag, region: Region },

    /// Assert no wall or entity has its center in the region
    RegionEmpty { region: Region },

    // === CONTROLLER CHECKS ===
    Paused { expected: bool },

    /// Assert how many events with the given label were emitted so far
    EventCount {
        event: String,
        min: usize,
        #[serde(default)]
        max: Option<usize>,
    },

    /// Assert every registered body exists in the physics world and vice versa
    RegistryConsistent,

    // === LOGICAL OPERATORS ===
    /// All conditions must pass
    All {
        conditions: Vec<VerificationCondition>,
    },

    /// Any condition must pass
    Any {
        conditions: Vec<VerificationCondition>,
    },

    /// Condition must NOT pass
    Not {
        condition: Box<VerificationCondition>,
    },
}

/// Spatial region in canvas pixels
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Region {
    Rect {
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
    },

    Circle {
        center_x: f32,
        center_y: f32,
        radius: f32,
    },

    /// The whole canvas
    Canvas,
}

impl Region {
    pub fn contains(&self, point: Vec2, canvas: Vec2) -> bool {
        match *self {
            Region::Rect {
                min_x,
                min_y,
                max_x,
                max_y,
            } => point.x >= min_x && point.x <= max_x && point.y >= min_y && point.y <= max_y,
            Region::Circle {
                center_x,
                center_y,
                radius,
            } => point.distance(Vec2::new(center_x, center_y)) <= radius,
            Region::Canvas => {
                point.x >= 0.0 && point.x <= canvas.x && point.y >= 0.0 && point.y <= canvas.y
            }
        }
    }
}

/// Result of a verification check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub passed: bool,
    pub message: String,
    pub actual_value: Option<String>, // For debugging
}

impl VerificationCondition {
    /// Evaluate condition against simulation state and the events seen so far
    pub fn evaluate(&self, sim: &Simulation, events: &EventTally) -> VerificationResult {
        match self {
            VerificationCondition::EntityCount {
                kind,
                expected,
                tolerance,
            } => {
                let actual = ids_of_kind(sim, *kind).len();
                let tol = tolerance.unwrap_or(0);
                let passed = actual >= expected.saturating_sub(tol) && actual <= expected + tol;

                VerificationResult {
                    passed,
                    message: format!("{} count: expected {}±{}, got {}", kind, expected, tol, actual),
                    actual_value: Some(actual.to_string()),
                }
            }

            VerificationCondition::EntityCountRange { kind, min, max } => {
                let actual = ids_of_kind(sim, *kind).len();
                let passed = actual >= *min && actual <= *max;

                VerificationResult {
                    passed,
                    message: format!("{} count: expected {}-{}, got {}", kind, min, max, actual),
                    actual_value: Some(actual.to_string()),
                }
            }

            VerificationCondition::WallCount { expected } => {
                let actual = sim.stats().walls;
                VerificationResult {
                    passed: actual == *expected,
                    message: format!("Wall count: expected {}, got {}", expected, actual),
                    actual_value: Some(actual.to_string()),
                }
            }

            VerificationCondition::HumanoidCount { min, max } => {
                let actual = sim.stats().humanoids;
                VerificationResult {
                    passed: actual >= *min && actual <= *max,
                    message: format!("Humanoid count: expected {}-{}, got {}", min, max, actual),
                    actual_value: Some(actual.to_string()),
                }
            }

            VerificationCondition::ContainedHumanoids { expected } => {
                let actual = sim.stats().contained_humanoids;
                VerificationResult {
                    passed: actual == *expected,
                    message: format!("Contained humanoids: expected {}, got {}", expected, actual),
                    actual_value: Some(actual.to_string()),
                }
            }

            VerificationCondition::ClimbingHumanoids { min } => {
                let actual = sim.stats().climbing_humanoids;
                VerificationResult {
                    passed: actual >= *min,
                    message: format!("Climbing humanoids: expected at least {}, got {}", min, actual),
                    actual_value: Some(actual.to_string()),
                }
            }

            VerificationCondition::EntityInRegion { kind, region } => {
                let canvas = sim.canvas();
                let found = ids_of_kind(sim, *kind)
                    .into_iter()
                    .filter_map(|id| sim.position(id))
                    .find(|p| region.contains(*p, canvas));

                VerificationResult {
                    passed: found.is_some(),
                    message: format!("{} in {:?}: {}", kind, region, found.is_some()),
                    actual_value: found.map(|p| format!("({:.1}, {:.1})", p.x, p.y)),
                }
            }

            VerificationCondition::RegionEmpty { region } => {
                let canvas = sim.canvas();
                let registry = &sim.state().registry;
                let occupants = registry
                    .walls()
                    .iter()
                    .chain(registry.entities())
                    .filter_map(|id| sim.position(*id))
                    .filter(|p| region.contains(*p, canvas))
                    .count();

                VerificationResult {
                    passed: occupants == 0,
                    message: format!("Region {:?} empty: {} bodies inside", region, occupants),
                    actual_value: Some(occupants.to_string()),
                }
            }

            VerificationCondition::Paused { expected } => {
                let actual = sim.is_paused();
                VerificationResult {
                    passed: actual == *expected,
                    message: format!("Paused: expected {}, got {}", expected, actual),
                    actual_value: Some(actual.to_string()),
                }
            }

            VerificationCondition::EventCount { event, min, max } => {
                let actual = events.count(event);
                let passed = actual >= *min && max.is_none_or(|max| actual <= max);

                VerificationResult {
                    passed,
                    message: format!(
                        "Event '{}' count: expected {}..{}, got {}",
                        event,
                        min,
                        max.map(|m| m.to_string()).unwrap_or_default(),
                        actual
                    ),
                    actual_value: Some(actual.to_string()),
                }
            }

            VerificationCondition::RegistryConsistent => {
                let state = sim.state();
                let passed = state.registry.is_consistent(&state.physics);
                VerificationResult {
                    passed,
                    message: format!(
                        "Registry consistent: {} tracked, {} bodies in world",
                        state.registry.len(),
                        state.physics.body_count()
                    ),
                    actual_value: Some(passed.to_string()),
                }
            }

            VerificationCondition::All { conditions } => {
                let results: Vec<_> = conditions.iter().map(|c| c.evaluate(sim, events)).collect();
                let failed: Vec<_> = results.iter().filter(|r| !r.passed).collect();

                VerificationResult {
                    passed: failed.is_empty(),
                    message: if failed.is_empty() {
                        format!("All {} conditions passed", conditions.len())
                    } else {
                        format!(
                            "{}/{} conditions failed: {}",
                            failed.len(),
                            conditions.len(),
                            failed
                                .iter()
                                .map(|r| r.message.as_str())
                                .collect::<Vec<_>>()
                                .join("; ")
                        )
                    },
                    actual_value: None,
                }
            }

            VerificationCondition::Any { conditions } => {
                let passed = conditions.iter().any(|c| c.evaluate(sim, events).passed);
                VerificationResult {
                    passed,
                    message: format!(
                        "Any of {} conditions: {}",
                        conditions.len(),
                        if passed { "passed" } else { "none passed" }
                    ),
                    actual_value: None,
                }
            }

            VerificationCondition::Not { condition } => {
                let inner = condition.evaluate(sim, events);
                VerificationResult {
                    passed: !inner.passed,
                    message: format!("NOT ({})", inner.message),
                    actual_value: inner.actual_value,
                }
            }
        }
    }
}

fn ids_of_kind(sim: &Simulation, kind: KindTag) -> Vec<EntityId> {
    sim.state().registry.ids_where(|k| k.tag() == kind)
}
