//! Board module - manages the game grid
//!
//! The board is a `rows x cols` grid where each cell can be empty or filled
//! with a piece kind. Dimensions are fixed per session (see
//! [`GridPreset`](crate::types::GridPreset)). Storage is a flat row-major
//! vector.
//!
//! Coordinates: (x, y) where x grows left to right and y grows top to
//! bottom. Rows above the field (`y < 0`) are never blocked so pieces can
//! spawn and kick partially above the top edge.

use crate::pieces::PieceShape;
use crate::types::{Cell, GridPreset, PieceKind};

/// The game board using flat array storage
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    rows: u8,
    cols: u8,
    /// Flat array of cells, row-major order (y * cols + x)
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board
    pub fn new(rows: u8, cols: u8) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows as usize * cols as usize],
        }
    }

    pub fn from_preset(preset: GridPreset) -> Self {
        Self::new(preset.rows(), preset.cols())
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(&self, x: i8, y: i8) -> Option<usize> {
        if self.is_out_of_bounds(x, y) {
            return None;
        }
        Some((y as usize) * (self.cols as usize) + (x as usize))
    }

    /// Number of columns
    pub fn width(&self) -> u8 {
        self.cols
    }

    /// Number of rows
    pub fn height(&self) -> u8 {
        self.rows
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is valid (within bounds and empty)
    pub fn is_valid(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(None))
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Check if position is out of bounds
    pub fn is_out_of_bounds(&self, x: i8, y: i8) -> bool {
        x < 0 || x >= self.cols as i8 || y < 0 || y >= self.rows as i8
    }

    /// Whether a mino at `(x, y)` would be blocked.
    ///
    /// Columns outside the board and rows at or below the floor block;
    /// rows above the top edge never do.
    pub fn blocks(&self, x: i8, y: i8) -> bool {
        if x < 0 || x >= self.cols as i8 || y >= self.rows as i8 {
            return true;
        }
        y >= 0 && self.is_occupied(x, y)
    }

    /// Check whether `shape` anchored at `(x, y)` hits a wall, the floor or
    /// a filled cell
    pub fn collides(&self, shape: &PieceShape, x: i8, y: i8) -> bool {
        shape.cells_at(x, y).any(|(cx, cy)| self.blocks(cx, cy))
    }

    /// Write `kind` into every cell of `shape` anchored at `(x, y)`.
    ///
    /// Refuses colliding placements and returns false without touching the
    /// board. Cells above the top edge are dropped.
    pub fn merge(&mut self, shape: &PieceShape, x: i8, y: i8, kind: PieceKind) -> bool {
        if self.collides(shape, x, y) {
            return false;
        }
        for (cx, cy) in shape.cells_at(x, y) {
            if cy >= 0 {
                self.set(cx, cy, Some(kind));
            }
        }
        true
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        match self.row(y) {
            Some(row) => row.iter().all(|cell| cell.is_some()),
            None => false,
        }
    }

    /// Cells of row `y`
    pub fn row(&self, y: usize) -> Option<&[Cell]> {
        if y >= self.rows as usize {
            return None;
        }
        let width = self.cols as usize;
        let start = y * width;
        Some(&self.cells[start..start + width])
    }

    /// Indices of every full row, top to bottom
    pub fn find_full_rows(&self) -> Vec<usize> {
        (0..self.rows as usize)
            .filter(|&y| self.is_row_full(y))
            .collect()
    }

    /// Remove the given rows in one pass.
    ///
    /// Surviving rows keep their order and drop by the number of removed
    /// rows below them; empty rows fill the top. Returns how many rows were
    /// removed (indices outside the board and duplicates are ignored).
    pub fn clear_rows(&mut self, rows: &[usize]) -> usize {
        let height = self.rows as usize;
        let width = self.cols as usize;
        let mut write_y = height;
        let mut removed = 0;

        // Scan from bottom to top, compacting kept rows downwards.
        for read_y in (0..height).rev() {
            if rows.contains(&read_y) {
                removed += 1;
                continue;
            }
            write_y -= 1;
            if write_y != read_y {
                let src_start = read_y * width;
                self.cells
                    .copy_within(src_start..src_start + width, write_y * width);
            }
        }

        for cell in &mut self.cells[..write_y * width] {
            *cell = None;
        }

        removed
    }

    /// True iff every cell is empty
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_none())
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Export as piece ids (0 = empty), row-major
    pub fn write_id_grid(&self, out: &mut Vec<u8>) {
        out.clear();
        out.extend(self.cells.iter().map(|cell| cell.map_or(0, |k| k.id())));
    }

    /// Build a board from text rows; `.` is empty, a piece letter fills.
    ///
    /// Meant for tests and fixtures: unknown characters count as filled
    /// with `I`.
    pub fn from_ascii(rows: &[&str]) -> Self {
        let height = rows.len() as u8;
        let width = rows.first().map_or(0, |r| r.len()) as u8;
        let mut board = Self::new(height, width);
        for (y, line) in rows.iter().enumerate() {
            for (x, ch) in line.chars().enumerate() {
                if ch != '.' {
                    let kind = PieceKind::from_str(&ch.to_string()).unwrap_or(PieceKind::I);
                    board.set(x as i8, y as i8, Some(kind));
                }
            }
        }
        board
    }

    /// Render as text rows, the inverse of [`Board::from_ascii`]
    pub fn to_ascii(&self) -> Vec<String> {
        (0..self.rows as usize)
            .map(|y| {
                self.row(y)
                    .unwrap_or(&[])
                    .iter()
                    .map(|cell| match cell {
                        Some(kind) => kind.as_str().to_ascii_uppercase(),
                        None => ".".to_string(),
                    })
                    .collect()
            })
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::from_preset(GridPreset::Standard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::get_shape;
    use crate::types::Rotation;

    #[test]
    fn test_board_index_calculation() {
        let board = Board::new(20, 10);
        assert_eq!(board.index(0, 0), Some(0));
        assert_eq!(board.index(9, 0), Some(9));
        assert_eq!(board.index(0, 1), Some(10));
        assert_eq!(board.index(9, 19), Some(199));
        assert_eq!(board.index(-1, 0), None);
        assert_eq!(board.index(10, 0), None);
        assert_eq!(board.index(0, 20), None);
    }

    #[test]
    fn test_board_flat_array() {
        let mut board = Board::new(15, 25);
        board.set(0, 0, Some(PieceKind::I));
        board.set(5, 10, Some(PieceKind::T));

        assert_eq!(board.cells[0], Some(PieceKind::I));
        assert_eq!(board.cells[10 * 25 + 5], Some(PieceKind::T));
    }

    #[test]
    fn test_collides_ignores_rows_above_top() {
        let board = Board::new(20, 10);
        let shape = get_shape(PieceKind::I, Rotation::East);
        assert!(!board.collides(&shape, 0, -3));
        assert!(board.collides(&shape, -1, -3));
        assert!(board.collides(&shape, 0, 17));
    }

    #[test]
    fn test_merge_drops_cells_above_top() {
        let mut board = Board::new(4, 4);
        let shape = get_shape(PieceKind::I, Rotation::East);
        assert!(board.merge(&shape, 1, -2, PieceKind::I));
        assert!(board.is_occupied(1, 0));
        assert!(board.is_occupied(1, 1));
        assert!(!board.is_occupied(1, 2));
    }

    #[test]
    fn test_ascii_roundtrip() {
        let rows = ["....", ".T..", "IIII"];
        let board = Board::from_ascii(&rows);
        assert_eq!(board.width(), 4);
        assert_eq!(board.height(), 3);
        assert_eq!(board.to_ascii(), rows.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    }

    #[test]
    fn test_id_grid_export() {
        let mut board = Board::new(2, 2);
        board.set(1, 1, Some(PieceKind::J));
        let mut out = Vec::new();
        board.write_id_grid(&mut out);
        assert_eq!(out, vec![0, 0, 0, PieceKind::J.id()]);
    }
}
