//! Headless rendering
//!
//! The sandbox has no window here: frames are rasterized on the CPU and
//! exported as PNG snapshots.

mod pixel_renderer;

pub use pixel_renderer::PixelRenderer;

use std::path::Path;

use anyhow::Result;
use chalkboard_core::Simulation;

/// Render the current canvas and write it to `path`
pub fn save_snapshot(sim: &Simulation, path: impl AsRef<Path>) -> Result<()> {
    let canvas = sim.canvas();
    let mut renderer = PixelRenderer::new(canvas.x.round() as usize, canvas.y.round() as usize);
    sim.render(&mut renderer);
    renderer.save_png(path)
}
