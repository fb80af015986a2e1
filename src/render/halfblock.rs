use crate::render::{Frame, Renderer};
use std::io::Write;

const HALF_BLOCK: char = '\u{2580}';

type Cell = (u8, u8, u8);

/// Truecolor preview: each text cell shows two stacked grid pixels, the upper
/// one as foreground of `▀` and the lower one as background.
#[derive(Default)]
pub struct HalfBlockRenderer {
    last_fg: Option<Cell>,
    last_bg: Option<Cell>,
}

impl HalfBlockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn set_colors(&mut self, out: &mut dyn Write, fg: Cell, bg: Cell) -> std::io::Result<()> {
        if self.last_fg != Some(fg) {
            write!(out, "\x1b[38;2;{};{};{}m", fg.0, fg.1, fg.2)?;
            self.last_fg = Some(fg);
        }
        if self.last_bg != Some(bg) {
            write!(out, "\x1b[48;2;{};{};{}m", bg.0, bg.1, bg.2)?;
            self.last_bg = Some(bg);
        }
        Ok(())
    }
}

fn rgb_at(rgba: &[u8], w: usize, x: usize, y: usize) -> Cell {
    let i = (y * w + x) * 4;
    (rgba[i], rgba[i + 1], rgba[i + 2])
}

impl Renderer for HalfBlockRenderer {
    fn name(&self) -> &'static str {
        "halfblock"
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let w = frame.pixel_width;
        let h = frame.pixel_height;
        if w == 0 || h == 0 || frame.pixels_rgba.len() < w * h * 4 {
            return Ok(());
        }
        let repeat = frame.cell_width.max(1) as usize;

        if frame.sync_updates {
            out.write_all(b"\x1b[?2026h")?;
        }
        // Home, reset, and no autowrap while painting rows.
        out.write_all(b"\x1b[H\x1b[0m\x1b[?7l")?;
        self.last_fg = None;
        self.last_bg = None;

        for row in 0..frame.grid_rows() {
            let top_y = row * 2;
            let bot_y = top_y + 1;
            for x in 0..w {
                let top = rgb_at(frame.pixels_rgba, w, x, top_y);
                // An odd last row pairs with black.
                let bot = if bot_y < h {
                    rgb_at(frame.pixels_rgba, w, x, bot_y)
                } else {
                    (0, 0, 0)
                };
                self.set_colors(out, top, bot)?;
                for _ in 0..repeat {
                    write!(out, "{HALF_BLOCK}")?;
                }
            }
            out.write_all(b"\x1b[0m\x1b[K\r\n")?;
            self.last_fg = None;
            self.last_bg = None;
        }

        let cols = frame.grid_cols();
        for line in frame.hud.lines() {
            let line: String = line.chars().take(cols.max(40)).collect();
            write!(out, "\x1b[0m\x1b[2K{line}\r\n")?;
        }

        out.write_all(b"\x1b[?7h")?;
        if frame.sync_updates {
            out.write_all(b"\x1b[?2026l")?;
        }
        out.flush()?;
        Ok(())
    }
}
