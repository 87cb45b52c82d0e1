//! Cell storage shared by windows, pads and the virtual screen.

use super::attr::{Attr, ChType};
use crate::error::{CursesError, Result};

/// One character cell.
///
/// Double-width characters occupy two cells: the first holds the character
/// and the second is a continuation cell (`ch == '\0'`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub attr: Attr,
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}

impl Cell {
    pub const BLANK: Cell = Cell {
        ch: ' ',
        attr: Attr::NORMAL,
    };

    const CONTINUATION_CH: char = '\0';

    pub fn continuation(attr: Attr) -> Self {
        Self {
            ch: Self::CONTINUATION_CH,
            attr,
        }
    }

    pub fn is_continuation(&self) -> bool {
        self.ch == Self::CONTINUATION_CH
    }

    pub fn chtype(&self) -> ChType {
        ChType::new(self.ch, self.attr)
    }
}

impl From<ChType> for Cell {
    fn from(ch: ChType) -> Self {
        Self {
            ch: ch.ch,
            attr: ch.attr,
        }
    }
}

/// A rectangular block of cells, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    rows: i32,
    cols: i32,
    cells: Vec<Cell>,
}

impl Grid {
    /// A grid for a size that is already known to be allocatable, such as
    /// a block inside an existing grid. Use `try_new` for sizes that come
    /// from the caller.
    pub fn new(rows: i32, cols: i32, fill: Cell) -> Self {
        let rows = rows.max(0);
        let cols = cols.max(0);
        Self {
            rows,
            cols,
            cells: vec![fill; rows as usize * cols as usize],
        }
    }

    /// A grid of `rows x cols` cells, or an invalid-parameter error when
    /// the size is not positive, the cell count does not fit in an `i32`,
    /// or the memory cannot be reserved.
    pub fn try_new(rows: i32, cols: i32, fill: Cell) -> Result<Self> {
        let len = area(rows, cols)?;
        Ok(Self {
            rows,
            cols,
            cells: filled(len, fill)?,
        })
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    fn index(&self, y: i32, x: i32) -> Option<usize> {
        if y < 0 || x < 0 || y >= self.rows || x >= self.cols {
            return None;
        }
        Some(y as usize * self.cols as usize + x as usize)
    }

    pub fn get(&self, y: i32, x: i32) -> Option<&Cell> {
        self.index(y, x).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, y: i32, x: i32) -> Option<&mut Cell> {
        let i = self.index(y, x)?;
        Some(&mut self.cells[i])
    }

    /// Write a cell; out-of-range writes are ignored.
    pub fn set(&mut self, y: i32, x: i32, cell: Cell) {
        if let Some(slot) = self.get_mut(y, x) {
            *slot = cell;
        }
    }

    /// Resize, keeping the overlapping top-left region. On error the grid
    /// is left as it was.
    pub fn resize(&mut self, rows: i32, cols: i32, fill: Cell) -> Result<()> {
        let mut next = Grid::try_new(rows, cols, fill)?;
        for y in 0..rows.min(self.rows) {
            for x in 0..cols.min(self.cols) {
                if let Some(cell) = self.get(y, x) {
                    next.set(y, x, *cell);
                }
            }
        }
        *self = next;
        Ok(())
    }

    /// Copy the `rows x cols` block at `(y, x)` into a new grid.
    pub fn extract(&self, y: i32, x: i32, rows: i32, cols: i32) -> Grid {
        let mut out = Grid::new(rows, cols, Cell::BLANK);
        for dy in 0..rows {
            for dx in 0..cols {
                if let Some(cell) = self.get(y + dy, x + dx) {
                    out.set(dy, dx, *cell);
                }
            }
        }
        out
    }

    /// Characters of row `y` from column `x`, `n` cells long, with
    /// continuation cells skipped.
    pub fn text(&self, y: i32, x: i32, n: i32) -> String {
        (x..x + n)
            .filter_map(|col| self.get(y, col))
            .filter(|cell| !cell.is_continuation())
            .map(|cell| cell.chtype().glyph())
            .collect()
    }
}

/// Number of cells in a `rows x cols` block.
pub fn area(rows: i32, cols: i32) -> Result<usize> {
    if rows <= 0 || cols <= 0 {
        return Err(CursesError::invalid(format!(
            "size {}x{} must be positive",
            rows, cols
        )));
    }
    rows.checked_mul(cols)
        .map(|n| n as usize)
        .ok_or_else(|| CursesError::invalid(format!("size {}x{} is too large", rows, cols)))
}

/// `len` copies of `value`, reporting an allocation failure instead of
/// aborting.
pub fn filled<T: Clone>(len: usize, value: T) -> Result<Vec<T>> {
    let mut cells = Vec::new();
    cells.try_reserve_exact(len).map_err(|e| {
        CursesError::invalid(format!("cannot allocate {} cells: {}", len, e))
    })?;
    cells.resize(len, value);
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let mut grid = Grid::new(2, 3, Cell::BLANK);
        assert!(grid.get(1, 2).is_some());
        assert!(grid.get(2, 0).is_none());
        assert!(grid.get(0, -1).is_none());
        grid.set(5, 5, Cell::from(ChType::from('x')));
        assert!(grid.cells.iter().all(|c| *c == Cell::BLANK));
    }

    #[test]
    fn test_resize_keeps_overlap() {
        let mut grid = Grid::new(2, 2, Cell::BLANK);
        grid.set(1, 1, Cell::from(ChType::from('z')));
        grid.resize(3, 1, Cell::BLANK).unwrap();
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 1);
        assert_eq!(grid.text(0, 0, 1), " ");
        grid.resize(2, 2, Cell::BLANK).unwrap();
        assert_eq!(grid.text(1, 0, 2), "  ");
    }

    #[test]
    fn test_oversized_grid_is_an_error() {
        assert!(Grid::try_new(100_000, 100_000, Cell::BLANK)
            .unwrap_err()
            .is_invalid_parameter());
        assert!(Grid::try_new(0, 5, Cell::BLANK).is_err());

        let mut grid = Grid::new(2, 2, Cell::BLANK);
        grid.set(0, 0, Cell::from(ChType::from('k')));
        assert!(grid.resize(i32::MAX, 2, Cell::BLANK).is_err());
        assert_eq!((grid.rows(), grid.cols()), (2, 2));
        assert_eq!(grid.text(0, 0, 1), "k");
    }

    #[test]
    fn test_text_skips_continuation() {
        let mut grid = Grid::new(1, 4, Cell::BLANK);
        grid.set(0, 0, Cell::from(ChType::from('漢')));
        grid.set(0, 1, Cell::continuation(Attr::NORMAL));
        grid.set(0, 2, Cell::from(ChType::from('a')));
        assert_eq!(grid.text(0, 0, 4), "漢a ");
    }
}
