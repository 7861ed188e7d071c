//! CPU-based pixel buffer renderer for headless snapshots
//!
//! Implements the core [`Renderer`] trait by rasterizing every body shape and
//! a stick figure per humanoid into an RGBA buffer. Canvas and buffer share
//! screen coordinates (y down), so no flipping is needed.

use std::path::Path;

use anyhow::{Context, Result};
use chalkboard_core::render::palette;
use chalkboard_core::{BodyRenderData, HumanoidRenderData, RenderShape, Renderer};
use glam::Vec2;
use image::{ImageBuffer, Rgba};

/// Chalkboard green
const BACKGROUND: [u8; 4] = [34, 52, 42, 255];
const OUTLINE_WIDTH: f32 = 1.5;

/// CPU-based renderer that outputs to a pixel buffer
pub struct PixelRenderer {
    /// Width of the viewport in pixels
    pub width: usize,
    /// Height of the viewport in pixels
    pub height: usize,
    /// RGBA pixel buffer (4 bytes per pixel)
    pub buffer: Vec<u8>,
}

impl PixelRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let mut renderer = Self {
            width,
            height,
            buffer: vec![0u8; width * height * 4],
        };
        renderer.clear();
        renderer
    }

    /// Fill the buffer with the board color
    pub fn clear(&mut self) {
        for pixel in self.buffer.chunks_exact_mut(4) {
            pixel.copy_from_slice(&BACKGROUND);
        }
    }

    /// Color at a pixel, `None` outside the buffer
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        let mut color = [0u8; 4];
        color.copy_from_slice(&self.buffer[idx..idx + 4]);
        Some(color)
    }

    /// Alpha-blend a color onto a single pixel
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 || color[3] == 0 {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        let alpha = color[3] as u32;
        for c in 0..3 {
            let dst = self.buffer[idx + c] as u32;
            self.buffer[idx + c] = ((color[c] as u32 * alpha + dst * (255 - alpha)) / 255) as u8;
        }
        self.buffer[idx + 3] = 255;
    }

    /// Shade every pixel whose center satisfies the signed-distance test.
    /// `sdf` returns the distance to the shape surface, negative inside.
    fn fill_sdf(&mut self, min: Vec2, max: Vec2, fill: [u8; 4], outline: [u8; 4], sdf: impl Fn(Vec2) -> f32) {
        let x0 = min.x.floor().max(0.0) as i32;
        let y0 = min.y.floor().max(0.0) as i32;
        let x1 = (max.x.ceil() as i32).min(self.width as i32 - 1);
        let y1 = (max.y.ceil() as i32).min(self.height as i32 - 1);

        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = sdf(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                if d > 0.0 {
                    continue;
                }
                let color = if d > -OUTLINE_WIDTH { outline } else { fill };
                self.blend_pixel(x, y, color);
            }
        }
    }

    pub fn draw_shape(&mut self, shape: &RenderShape, fill: [u8; 4], outline: [u8; 4]) {
        match *shape {
            RenderShape::Circle { center, radius } => {
                let r = Vec2::splat(radius + 1.0);
                self.fill_sdf(center - r, center + r, fill, outline, |p| p.distance(center) - radius);
            }
            RenderShape::Rect {
                center,
                half_extents,
                angle,
            } => {
                let reach = Vec2::splat(half_extents.length() + 1.0);
                let rot = Vec2::from_angle(-angle);
                self.fill_sdf(center - reach, center + reach, fill, outline, |p| {
                    let local = rot.rotate(p - center).abs() - half_extents;
                    local.max(Vec2::ZERO).length() + local.x.max(local.y).min(0.0)
                });
            }
            RenderShape::Capsule { a, b, radius } => {
                let r = Vec2::splat(radius + 1.0);
                self.fill_sdf(a.min(b) - r, a.max(b) + r, fill, outline, |p| {
                    distance_to_segment(p, a, b) - radius
                });
            }
        }
    }

    /// Draw a line using Bresenham's algorithm
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: [u8; 4]) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut x = x0;
        let mut y = y0;

        loop {
            self.blend_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn line(&mut self, a: Vec2, b: Vec2, color: [u8; 4]) {
        self.draw_line(
            a.x.round() as i32,
            a.y.round() as i32,
            b.x.round() as i32,
            b.y.round() as i32,
            color,
        );
    }

    /// Export the buffer as a PNG file
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let img: ImageBuffer<Rgba<u8>, _> =
            ImageBuffer::from_raw(self.width as u32, self.height as u32, self.buffer.clone())
                .context("Failed to create image from buffer")?;

        img.save(path)
            .with_context(|| format!("Failed to save snapshot: {}", path.display()))?;

        log::info!("Snapshot saved: {}", path.display());
        Ok(())
    }
}

impl Renderer for PixelRenderer {
    fn draw_body(&mut self, body: &BodyRenderData) {
        if !body.style.is_visible() {
            return;
        }
        for shape in &body.shapes {
            self.draw_shape(shape, body.style.fill, body.style.stroke);
        }
    }

    /// Stick figure: head, torso, two arms and two legs swinging with the gait
    fn draw_humanoid(&mut self, humanoid: &HumanoidRenderData) {
        let p = humanoid.position;
        let color = palette::CHALK;

        let head = p - Vec2::new(0.0, 13.0);
        self.draw_shape(
            &RenderShape::Circle {
                center: head,
                radius: 5.0,
            },
            [0, 0, 0, 0],
            color,
        );

        let neck = p - Vec2::new(0.0, 8.0);
        let hip = p + Vec2::new(0.0, 6.0);
        self.line(neck, hip, color);

        let (arm_swing, leg_swing) = if humanoid.climbing {
            // Alternate reaching up the rungs
            let reach = humanoid.leg_phase.sin() * 3.0;
            (Vec2::new(6.0, -6.0 + reach), Vec2::new(4.0, 12.0 - reach))
        } else {
            let swing = humanoid.leg_phase.sin() * 6.0 * humanoid.facing;
            (Vec2::new(swing, 7.0), Vec2::new(swing, 14.0))
        };

        let shoulder = p - Vec2::new(0.0, 5.0);
        self.line(shoulder, shoulder + arm_swing, color);
        self.line(shoulder, shoulder + Vec2::new(-arm_swing.x, arm_swing.y), color);
        self.line(hip, hip + leg_swing, color);
        self.line(hip, hip + Vec2::new(-leg_swing.x, leg_swing.y), color);

        // Nose shows which way the figure faces
        self.line(head, head + Vec2::new(humanoid.facing * 7.0, 0.0), color);
    }
}

fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
