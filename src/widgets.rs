//! Text-mode horizontal rule.

use colored::{Color, Colorize};

const LINE_GLYPH: char = '─';

/// A single horizontal line segment within a row of `width` cells.
#[derive(Debug, Clone)]
pub struct HorizontalLine {
    pub color: Color,
    pub start_x: Option<usize>,
    pub end_x: Option<usize>,
}

impl Default for HorizontalLine {
    fn default() -> Self {
        Self { color: Color::White, start_x: None, end_x: None }
    }
}

impl HorizontalLine {
    pub fn new(color: Color) -> Self {
        Self { color, ..Self::default() }
    }

    pub fn inset(mut self, start_x: usize, end_x: usize) -> Self {
        self.start_x = Some(start_x);
        self.end_x = Some(end_x);
        self
    }

    /// Uncoloured row: line glyphs in `[start_x, end_x)`, blanks elsewhere.
    pub fn draw(&self, width: usize) -> String {
        let start = self.start_x.unwrap_or(0).min(width);
        let end = self.end_x.unwrap_or(width).min(width).max(start);
        let mut row = String::with_capacity(width * LINE_GLYPH.len_utf8());
        row.extend(std::iter::repeat(' ').take(start));
        row.extend(std::iter::repeat(LINE_GLYPH).take(end - start));
        row.extend(std::iter::repeat(' ').take(width - end));
        row
    }

    /// The row with the line colour applied.
    pub fn render(&self, width: usize) -> String {
        self.draw(width).color(self.color).to_string()
    }
}
