//! Pure spawn placement

use glam::Vec2;

use crate::rng_trait::SimRng;

/// Where and how a new entity enters the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPoint {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Initial heading, +1 right or -1 left
    pub direction: f32,
}

/// Distance outside the canvas edge where generic entities appear
const EDGE_OFFSET: f32 = 20.0;

/// Generic entity entering from the left edge, the right edge or the top
pub fn random_spawn_position<R: SimRng + ?Sized>(width: f32, height: f32, rng: &mut R) -> SpawnPoint {
    match rng.range_u32(0, 2) {
        0 => SpawnPoint {
            position: Vec2::new(-EDGE_OFFSET, rng.range(0.1, 0.5) * height),
            velocity: Vec2::new(rng.range(100.0, 250.0), -rng.range(0.0, 120.0)),
            direction: 1.0,
        },
        1 => SpawnPoint {
            position: Vec2::new(width + EDGE_OFFSET, rng.range(0.1, 0.5) * height),
            velocity: Vec2::new(-rng.range(100.0, 250.0), -rng.range(0.0, 120.0)),
            direction: -1.0,
        },
        _ => {
            let direction = rng.sign();
            SpawnPoint {
                position: Vec2::new(rng.range(0.1, 0.9) * width, -EDGE_OFFSET),
                velocity: Vec2::new(direction * rng.range(0.0, 60.0), 0.0),
                direction,
            }
        }
    }
}

/// Humanoids always appear inside the canvas near the left or right side,
/// facing toward the middle, and drop onto whatever is below
pub fn humanoid_spawn_position<R: SimRng + ?Sized>(width: f32, height: f32, rng: &mut R) -> SpawnPoint {
    let x_fraction = rng.range(0.05, 0.2);
    let y = rng.range(0.2, 0.4) * height;
    if rng.coin_flip() {
        SpawnPoint {
            position: Vec2::new(x_fraction * width, y),
            velocity: Vec2::ZERO,
            direction: 1.0,
        }
    } else {
        SpawnPoint {
            position: Vec2::new((1.0 - x_fraction) * width, y),
            velocity: Vec2::ZERO,
            direction: -1.0,
        }
    }
}
