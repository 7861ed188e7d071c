//! RNG trait abstraction for the simulation
//!
//! Lets spawning, locomotion and rules run against either a seeded
//! `Xoshiro256StarStar` (scenarios, tests) or any other `rand::Rng`.

/// Random number generator used by the simulation core
pub trait SimRng {
    /// Generate random f32 in [0.0, 1.0)
    fn unit(&mut self) -> f32;

    /// Check if random value is less than probability threshold
    fn chance(&mut self, probability: f32) -> bool {
        self.unit() < probability
    }

    /// 50/50 coin flip
    fn coin_flip(&mut self) -> bool {
        self.chance(0.5)
    }

    /// Uniform f32 in [min, max)
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.unit()
    }

    /// Uniform integer in [min, max] (inclusive)
    fn range_u32(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        let span = (max - min + 1) as f32;
        (min + (self.unit() * span) as u32).min(max)
    }

    /// Either -1.0 or 1.0
    fn sign(&mut self) -> f32 {
        if self.coin_flip() { 1.0 } else { -1.0 }
    }
}

impl<T: ?Sized + rand::Rng> SimRng for T {
    fn unit(&mut self) -> f32 {
        rand::Rng::r#gen(self)
    }
}
