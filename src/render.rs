// src/render.rs

use std::io::{self, Write};

pub const DEFAULT_BAR_WIDTH: usize = 30;

/// Single-line ASCII progress bar, redrawn in place with a carriage return.
#[derive(Debug, Clone, Copy)]
pub struct Bar {
    width: usize,
}

impl Default for Bar {
    fn default() -> Self {
        Self::new(DEFAULT_BAR_WIDTH)
    }
}

impl Bar {
    /// Create a bar with `width` slots.
    pub fn new(width: usize) -> Self {
        Self { width }
    }

    /// Number of slots in the bar.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of filled slots for `percent`, never more than the bar width.
    pub fn filled_slots(&self, percent: u64) -> usize {
        let filled = percent.saturating_mul(self.width as u64) / 100;
        filled.min(self.width as u64) as usize
    }

    /// Draws `[###   ] N% Done (M MB)`.
    ///
    /// Only the fill is clamped; the label prints `percent` as given, so an
    /// estimate above 100 is visible as such.
    pub fn render<W: Write>(&self, out: &mut W, percent: u64, total_bytes: u64) -> io::Result<()> {
        let filled = self.filled_slots(percent);
        write!(
            out,
            "\r[{}{}] {}% Done ({} MB)",
            "#".repeat(filled),
            " ".repeat(self.width - filled),
            percent,
            total_bytes / 1_000_000
        )?;
        out.flush()
    }

    /// Final 100% render followed by a newline.
    pub fn finish<W: Write>(&self, out: &mut W, total_bytes: u64) -> io::Result<()> {
        self.render(out, 100, total_bytes)?;
        writeln!(out)?;
        out.flush()
    }
}
