//! Text measurement (geometry seam).
//!
//! Overlay alignment and pointer math need to convert between character
//! columns and horizontal positions. That conversion is toolkit-specific
//! (monospace cell grids, proportional fonts, ...), so it lives behind the
//! [`TextMeasure`] trait; the engine ships [`MonospaceMeasure`], a cell-grid
//! implementation based on UAX #11 character widths with tab expansion.
//!
//! Columns are counted in `char`s; x positions are in measure-defined units
//! (cells for the monospace implementation).

use unicode_width::UnicodeWidthChar;

/// Default tab width (in cells) used when a caller does not specify one.
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Converts between character columns and horizontal positions within a line.
///
/// Implementations must be monotonic: a larger column never maps to a smaller
/// x, and `x_to_column` is the (clamping) inverse of `column_to_x`.
pub trait TextMeasure {
    /// Horizontal position of the given character column in `line`.
    ///
    /// Columns past the end of the line measure as the end of the line.
    fn column_to_x(&self, line: &str, column: usize) -> usize;

    /// Character column whose glyph covers the horizontal position `x`.
    ///
    /// Positions past the end of the line clamp to the line's char count
    /// (the caret slot after the last character).
    fn x_to_column(&self, line: &str, x: usize) -> usize;
}

/// Visual width of a character (UAX #11): 1 for narrow, 2 for wide (CJK,
/// fullwidth), 0 for zero-width combining characters.
pub fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(1)
}

/// Width (in cells) of `ch` when drawn at `cell_offset_in_line`.
///
/// `'\t'` advances to the next tab stop based on `tab_width`; everything else
/// follows [`char_width`].
pub fn cell_width_at(ch: char, cell_offset_in_line: usize, tab_width: usize) -> usize {
    if ch == '\t' {
        let tab_width = tab_width.max(1);
        let rem = cell_offset_in_line % tab_width;
        tab_width - rem
    } else {
        char_width(ch)
    }
}

/// Fixed cell-grid measurement: UAX #11 widths plus tab-stop expansion.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMeasure {
    tab_width: usize,
}

impl MonospaceMeasure {
    /// Create a measure with an explicit tab width (clamped to at least 1).
    pub fn new(tab_width: usize) -> Self {
        Self {
            tab_width: tab_width.max(1),
        }
    }

    /// Tab width in cells.
    pub fn tab_width(&self) -> usize {
        self.tab_width
    }
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self::new(DEFAULT_TAB_WIDTH)
    }
}

impl TextMeasure for MonospaceMeasure {
    fn column_to_x(&self, line: &str, column: usize) -> usize {
        let mut x = 0usize;
        for ch in line.chars().take(column) {
            x = x.saturating_add(cell_width_at(ch, x, self.tab_width));
        }
        x
    }

    fn x_to_column(&self, line: &str, x: usize) -> usize {
        let mut current_x = 0usize;
        for (column, ch) in line.chars().enumerate() {
            let width = cell_width_at(ch, current_x, self.tab_width);
            // A point anywhere inside the glyph's cells selects that column.
            if x < current_x + width {
                return column;
            }
            current_x += width;
        }
        line.chars().count()
    }
}
