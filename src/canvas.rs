use crate::color::Rgb;
use crate::error::{ConfigError, ConfigResult};

/// Neighborhood weighting for [`Canvas::blur3x3`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlurKernel {
    /// All nine cells weigh the same.
    Uniform,
    /// The center cell weighs `n` times a neighbor.
    CenterWeighted(u8),
}

impl BlurKernel {
    #[inline]
    fn center_weight(self) -> u32 {
        match self {
            Self::Uniform => 1,
            Self::CenterWeighted(n) => n as u32,
        }
    }
}

/// Persistent `width x height` RGB buffer an effect renders into.
///
/// Cells are only written through the primitives below; all of them silently
/// drop coordinates outside `[0, width) x [0, height)`.
#[derive(Clone, Debug)]
pub struct Canvas {
    width: usize,
    height: usize,
    cells: Vec<Rgb>,
    scratch: Vec<Rgb>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> ConfigResult<Self> {
        let len = width
            .checked_mul(height)
            .filter(|&n| n > 0)
            .ok_or(ConfigError::InvalidDimensions { width, height })?;
        Ok(Self {
            width,
            height,
            cells: vec![Rgb::BLACK; len],
            scratch: vec![Rgb::BLACK; len],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> &[Rgb] {
        &self.cells
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    /// Out-of-range reads return black.
    pub fn pixel(&self, x: i32, y: i32) -> Rgb {
        self.index(x, y).map_or(Rgb::BLACK, |i| self.cells[i])
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, c: Rgb) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = c;
        }
    }

    /// Saturating per-channel add, for overlapping light sources.
    pub fn add_pixel(&mut self, x: i32, y: i32, c: Rgb) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = self.cells[i].add_saturating(c);
        }
    }

    /// Moves the cell toward `c` by `amount / 255`.
    pub fn blend_pixel(&mut self, x: i32, y: i32, c: Rgb, amount: u8) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = self.cells[i].blend(c, amount);
        }
    }

    /// Additive plot at a float position; non-finite coordinates are dropped.
    pub fn add_pixel_f(&mut self, x: f32, y: f32, c: Rgb) {
        if let Some((xi, yi)) = cell_of(x, y) {
            self.add_pixel(xi, yi, c);
        }
    }

    pub fn set_pixel_f(&mut self, x: f32, y: f32, c: Rgb) {
        if let Some((xi, yi)) = cell_of(x, y) {
            self.set_pixel(xi, yi, c);
        }
    }

    pub fn fill(&mut self, c: Rgb) {
        self.cells.fill(c);
    }

    pub fn clear(&mut self) {
        self.fill(Rgb::BLACK);
    }

    /// Fade-trail step: every channel becomes `c * (255 - amount) / 255`, rounded down.
    ///
    /// Run this before drawing the frame's new entities.
    pub fn decay(&mut self, amount: u8) {
        match amount {
            0 => {}
            255 => self.clear(),
            _ => {
                let keep = 255 - amount;
                for c in &mut self.cells {
                    *c = c.scale(keep);
                }
            }
        }
    }

    /// Blends every cell toward the weighted mean of its 3x3 neighborhood by
    /// `strength / 255`. Neighbors outside the canvas are left out of the mean.
    pub fn blur3x3(&mut self, strength: u8, kernel: BlurKernel) {
        if strength == 0 {
            return;
        }
        let w = self.width as isize;
        let h = self.height as isize;
        let center = kernel.center_weight();
        let s = strength as u32;
        let inv = 255 - s;

        for y in 0..h {
            for x in 0..w {
                let mut acc = [0u32; 3];
                let mut total = 0u32;
                for dy in -1..=1isize {
                    let ny = y + dy;
                    if ny < 0 || ny >= h {
                        continue;
                    }
                    for dx in -1..=1isize {
                        let nx = x + dx;
                        if nx < 0 || nx >= w {
                            continue;
                        }
                        let wt = if dx == 0 && dy == 0 { center } else { 1 };
                        let c = self.cells[(ny * w + nx) as usize];
                        acc[0] += c.r as u32 * wt;
                        acc[1] += c.g as u32 * wt;
                        acc[2] += c.b as u32 * wt;
                        total += wt;
                    }
                }

                let i = (y * w + x) as usize;
                let orig = self.cells[i];
                self.scratch[i] = if total == 0 {
                    orig
                } else {
                    let mix = |o: u8, sum: u32| ((o as u32 * inv + (sum / total) * s) / 255) as u8;
                    Rgb::new(
                        mix(orig.r, acc[0]),
                        mix(orig.g, acc[1]),
                        mix(orig.b, acc[2]),
                    )
                };
            }
        }

        std::mem::swap(&mut self.cells, &mut self.scratch);
    }

    /// Adds `c` to every cell whose rounded distance from the center is at most `radius`.
    /// A radius of zero or less lights only the center cell.
    pub fn fill_circle_add(&mut self, cx: i32, cy: i32, radius: i32, c: Rgb) {
        if radius <= 0 {
            self.add_pixel(cx, cy, c);
            return;
        }
        let max_x = self.width as i32 - 1;
        let max_y = self.height as i32 - 1;
        let x0 = cx.saturating_sub(radius).max(0);
        let x1 = cx.saturating_add(radius).min(max_x);
        let y0 = cy.saturating_sub(radius).max(0);
        let y1 = cy.saturating_add(radius).min(max_y);
        let r = radius as f32;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = (x - cx) as f32;
                let dy = (y - cy) as f32;
                if dx.hypot(dy).round() <= r {
                    self.add_pixel(x, y, c);
                }
            }
        }
    }
}

/// Fills `out` with `width * height` pixels as RGBA8 rows (alpha = 255), reading
/// each from `pixel(x, y)`. Returns `false` and leaves `out` untouched when it is
/// too short.
pub fn write_rgba_rows<F>(width: usize, height: usize, out: &mut [u8], pixel: F) -> bool
where
    F: Fn(usize, usize) -> Rgb,
{
    if out.len() < width * height * 4 {
        return false;
    }
    if width == 0 {
        return true;
    }
    let rows = out.chunks_exact_mut(width * 4).take(height);
    for (y, row) in rows.enumerate() {
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            let [r, g, b] = pixel(x, y).to_array();
            px.copy_from_slice(&[r, g, b, 255]);
        }
    }
    true
}

/// Cell containing a float position (floor), or `None` for NaN/infinite input.
#[inline]
pub fn cell_of(x: f32, y: f32) -> Option<(i32, i32)> {
    if !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some((x.floor() as i32, y.floor() as i32))
}
