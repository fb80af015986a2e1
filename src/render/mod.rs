mod halfblock;

pub use halfblock::HalfBlockRenderer;

use std::io::Write;

/// One grid snapshot to paint, plus the status text under it.
pub struct Frame<'a> {
    pub pixel_width: usize,
    pub pixel_height: usize,
    pub pixels_rgba: &'a [u8],
    /// Terminal columns used for each grid pixel.
    pub cell_width: u16,
    pub hud: &'a str,
    pub sync_updates: bool,
}

impl Frame<'_> {
    /// Terminal rows the grid occupies (two pixel rows per text row).
    pub fn grid_rows(&self) -> usize {
        self.pixel_height.div_ceil(2)
    }

    pub fn grid_cols(&self) -> usize {
        self.pixel_width * self.cell_width.max(1) as usize
    }
}

pub trait Renderer {
    fn name(&self) -> &'static str;
    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()>;
}
