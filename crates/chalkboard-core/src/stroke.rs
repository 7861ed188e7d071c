//! Freehand stroke pipeline
//!
//! Draw mode lays down small static chalk segments while the pointer moves,
//! then fuses them into a single floating compound on release. Erase mode
//! removes bodies near the pointer. In grab mode the pipeline stays idle.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::StrokeConfig;
use crate::entity::EntityFactory;
use crate::events::SimEvent;
use crate::lifecycle;
use crate::registry::BodyList;
use crate::rng_trait::SimRng;
use crate::simulation::SimulationState;
use crate::types::EntityId;

/// What pointer input does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PointerMode {
    #[default]
    Draw,
    /// Drag bodies around
    Grab,
    Erase,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum StrokeState {
    Idle,
    Drawing { last: Vec2 },
    Erasing,
}

/// Pointer-driven stroke state machine
#[derive(Debug)]
pub struct StrokePipeline {
    state: StrokeState,
    /// Segments laid down since pointer-down, with their jittered positions
    accumulator: Vec<(EntityId, Vec2)>,
}

impl Default for StrokePipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl StrokePipeline {
    pub fn new() -> Self {
        Self {
            state: StrokeState::Idle,
            accumulator: Vec::new(),
        }
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, StrokeState::Drawing { .. })
    }

    /// Segments in the stroke being drawn
    pub fn pending_segments(&self) -> usize {
        self.accumulator.len()
    }

    pub fn pointer_down(&mut self, sim: &mut SimulationState, mode: PointerMode, point: Vec2, cfg: &StrokeConfig) {
        match mode {
            PointerMode::Draw => {
                // A stroke still in progress is fused, never left as loose segments
                if self.is_drawing() {
                    self.pointer_up(sim, cfg);
                }
                self.accumulator.clear();
                self.state = StrokeState::Drawing { last: point };
            }
            PointerMode::Erase => {
                self.state = StrokeState::Erasing;
                self.erase_at(sim, point, cfg.erase_radius);
            }
            PointerMode::Grab => {}
        }
    }

    pub fn pointer_move(&mut self, sim: &mut SimulationState, point: Vec2, cfg: &StrokeConfig) {
        match self.state {
            StrokeState::Drawing { last } => {
                let distance = last.distance(point);
                let steps = ((distance / cfg.sample_step).floor() as usize).max(1);

                for i in 1..=steps {
                    let t = i as f32 / steps as f32;
                    let jitter = Vec2::new(
                        sim.rng.range(-cfg.jitter, cfg.jitter),
                        sim.rng.range(-cfg.jitter, cfg.jitter),
                    );
                    let at = last.lerp(point, t) + jitter;
                    let id = sim.registry.insert(
                        &mut sim.physics,
                        EntityFactory::create_wall_segment(at, cfg.segment_radius),
                        BodyList::Wall,
                    );
                    self.accumulator.push((id, at));
                }

                self.state = StrokeState::Drawing { last: point };
            }
            StrokeState::Erasing => {
                self.erase_at(sim, point, cfg.erase_radius);
            }
            StrokeState::Idle => {}
        }
    }

    /// Finish the gesture. Returns the fused stroke when one was drawn.
    pub fn pointer_up(&mut self, sim: &mut SimulationState, cfg: &StrokeConfig) -> Option<EntityId> {
        let was_drawing = self.is_drawing();
        self.state = StrokeState::Idle;
        if !was_drawing {
            return None;
        }

        let mut points = Vec::with_capacity(self.accumulator.len());
        for (id, at) in self.accumulator.drain(..) {
            // Segments cleared mid-stroke are not resurrected
            if sim.registry.remove(&mut sim.physics, id).is_some() {
                points.push(at);
            }
        }

        let blueprint = EntityFactory::create_drawn_line(&points, cfg.segment_radius, sim.time)?;
        let id = sim.registry.insert(&mut sim.physics, blueprint, BodyList::Wall);
        log::debug!("Stroke: fused {} segments into {}", points.len(), id);
        Some(id)
    }

    /// Remove every erasable wall or entity within `radius` of the point.
    ///
    /// Returns the number of bodies removed.
    pub fn erase_at(&mut self, sim: &mut SimulationState, point: Vec2, radius: f32) -> usize {
        let candidates: Vec<EntityId> = sim
            .registry
            .walls()
            .iter()
            .chain(sim.registry.entities())
            .copied()
            .filter(|id| sim.registry.kind(*id).is_some_and(|k| k.is_erasable()))
            .collect();

        let mut removed = 0;
        for id in candidates {
            let Some(handle) = sim.registry.handle(id) else {
                continue;
            };
            let hit = sim
                .physics
                .distance_to_point(handle, point)
                .is_some_and(|d| d <= radius);
            if hit && lifecycle::despawn(sim, id).is_some() {
                removed += 1;
            }
        }

        if removed > 0 {
            self.accumulator.retain(|(id, _)| sim.registry.contains(*id));
            log::debug!(
                "Stroke: erased {} bodies at ({:.0}, {:.0})",
                removed,
                point.x,
                point.y
            );
        }
        removed
    }

    /// Remove every drawn stroke. Ground and ladders are not in the wall list.
    pub fn clear_all(&mut self, sim: &mut SimulationState) -> usize {
        let walls = sim.registry.walls().to_vec();
        let removed = walls
            .into_iter()
            .filter(|id| lifecycle::despawn(sim, *id).is_some())
            .count();

        self.accumulator.clear();
        sim.events.push(SimEvent::SceneCleared { removed });
        log::info!("Cleared {} strokes", removed);
        removed
    }
}
