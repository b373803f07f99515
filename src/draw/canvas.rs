use anyhow::{anyhow, Context, Result};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Debug, Clone)]
struct BrushMaskRow {
    dy: i32,
    min_dx: i32,
    max_dx: i32,
}

/// Horizontal spans of a filled disc, one per row.
fn brush_mask(radius: i32) -> Vec<BrushMaskRow> {
    let mut rows = Vec::with_capacity((radius.max(0) * 2 + 1) as usize);
    for dy in -radius..=radius {
        let mut max_dx = radius;
        while max_dx >= 0 && max_dx * max_dx + dy * dy > radius * radius {
            max_dx -= 1;
        }
        if max_dx >= 0 {
            rows.push(BrushMaskRow {
                dy,
                min_dx: -max_dx,
                max_dx,
            });
        }
    }
    rows
}

/// Largest texture side a canvas allocates.
pub const MAX_CANVAS_SIZE: u32 = 4096;

/// Square RGBA texture the rune stroke is painted into. Row 0 is the top.
#[derive(Debug, Clone)]
pub struct RuneCanvas {
    size: u32,
    pixels: Vec<u8>,
    background: Color,
    brush_color: Color,
    brush_radius: i32,
    mask: Vec<BrushMaskRow>,
    last_stamp: Option<(i32, i32)>,
}

impl RuneCanvas {
    /// `size` is clamped to `1..=MAX_CANVAS_SIZE` and the brush radius to `size`.
    pub fn new(size: u32, brush_radius: u32) -> Self {
        let size = size.clamp(1, MAX_CANVAS_SIZE);
        let radius = brush_radius.min(size) as i32;
        let mut canvas = Self {
            size,
            pixels: vec![0; (size as usize) * (size as usize) * 4],
            background: Color::WHITE,
            brush_color: Color::BLACK,
            brush_radius: radius,
            mask: brush_mask(radius),
            last_stamp: None,
        };
        canvas.clear();
        canvas
    }

    pub fn with_colors(mut self, background: Color, brush: Color) -> Self {
        self.background = background;
        self.brush_color = brush;
        self.clear();
        self
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.size || y >= self.size {
            return None;
        }
        let idx = ((y as usize) * (self.size as usize) + x as usize) * 4;
        Some(Color::rgba(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ))
    }

    pub fn clear(&mut self) {
        let bg = self.background;
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[bg.r, bg.g, bg.b, bg.a]);
        }
        self.last_stamp = None;
    }

    /// Ends the current painted line so the next stamp does not connect to it.
    pub fn lift_brush(&mut self) {
        self.last_stamp = None;
    }

    /// Maps a position in `[0, 1]²` (origin bottom-left, as pointer input
    /// reports it) to texture pixels.
    ///
    /// Positions off the canvas are clamped to one brush radius past the
    /// edge, so a stroke leaving the canvas still reaches its border.
    pub fn to_texture(&self, u: f32, v: f32) -> (i32, i32) {
        let max = self.size.saturating_sub(1) as f32;
        let x = (u * max).round() as i32;
        let y = ((1.0 - v) * max).round() as i32;
        self.clamp_to_reach(x, y)
    }

    fn clamp_to_reach(&self, x: i32, y: i32) -> (i32, i32) {
        let lo = -self.brush_radius;
        let hi = (self.size as i32 - 1).saturating_add(self.brush_radius).max(lo);
        (x.clamp(lo, hi), y.clamp(lo, hi))
    }

    /// Paints one brush disc. Returns the number of pixels written.
    pub fn stamp(&mut self, cx: i32, cy: i32) -> u64 {
        let size = self.size as i32;
        let color = self.brush_color;
        let mut writes = 0;
        for row in &self.mask {
            let y = cy.saturating_add(row.dy);
            if y < 0 || y >= size {
                continue;
            }
            let x0 = cx.saturating_add(row.min_dx).max(0);
            let x1 = cx.saturating_add(row.max_dx).min(size - 1);
            if x0 > x1 {
                continue;
            }
            let row_base = (y as usize) * (self.size as usize) * 4;
            for x in x0..=x1 {
                let idx = row_base + (x as usize) * 4;
                self.pixels[idx] = color.r;
                self.pixels[idx + 1] = color.g;
                self.pixels[idx + 2] = color.b;
                self.pixels[idx + 3] = color.a;
                writes += 1;
            }
        }
        writes
    }

    /// Stamps at `(x, y)` and fills the gap from the previous stamp.
    pub fn paint_to(&mut self, x: i32, y: i32) {
        let (x, y) = self.clamp_to_reach(x, y);
        let Some((px, py)) = self.last_stamp.replace((x, y)) else {
            self.stamp(x, y);
            return;
        };
        let dx = (x - px) as f32;
        let dy = (y - py) as f32;
        let length = (dx * dx + dy * dy).sqrt();
        let spacing = (self.brush_radius as f32 / 2.0).max(1.0);
        let steps = (length / spacing).ceil().max(1.0) as i32;
        for step in 1..=steps {
            let t = step as f32 / steps as f32;
            self.stamp(
                px + (dx * t).round() as i32,
                py + (dy * t).round() as i32,
            );
        }
    }

    pub fn to_image(&self) -> Result<image::RgbaImage> {
        image::RgbaImage::from_raw(self.size, self.size, self.pixels.clone())
            .ok_or_else(|| anyhow!("canvas buffer does not match {}x{}", self.size, self.size))
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.to_image()?
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("save rune canvas to {}", path.display()))
    }
}
