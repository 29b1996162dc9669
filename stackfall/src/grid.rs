//! Grid module - the stack of locked cells
//!
//! Coordinates are (x, y) with x growing to the right and y growing downward;
//! row 0 is the ceiling. Negative rows are above the visible grid and never
//! hold cells.

use serde::{Deserialize, Serialize};

use crate::error::StackfallError;

/// Content of a single grid cell
///
/// Occupied cells carry the kind of the piece that left them, which doubles
/// as the opaque color identifier handed to renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellType {
    #[default]
    Empty,
    O,
    T,
    Z,
    S,
    I,
    L,
    J,
}

impl CellType {
    pub fn is_empty(&self) -> bool {
        *self == CellType::Empty
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(try_from = "GridCells")]
pub struct Grid {
    width: usize,
    height: usize,
    // Row-major, `height` rows of `width` cells
    cells: Vec<Vec<CellType>>,
}

/// Unchecked serialized form of a [`Grid`]
#[derive(Deserialize)]
struct GridCells {
    width: usize,
    height: usize,
    cells: Vec<Vec<CellType>>,
}

impl TryFrom<GridCells> for Grid {
    type Error = StackfallError;

    fn try_from(raw: GridCells) -> Result<Self, Self::Error> {
        if raw.cells.len() != raw.height {
            return Err(StackfallError::InvalidGrid(format!(
                "{} rows for height {}",
                raw.cells.len(),
                raw.height
            )));
        }
        if let Some((y, row)) = raw.cells.iter().enumerate().find(|(_, row)| row.len() != raw.width) {
            return Err(StackfallError::InvalidGrid(format!(
                "row {} has {} cells for width {}",
                y,
                row.len(),
                raw.width
            )));
        }
        Ok(Grid {
            width: raw.width,
            height: raw.height,
            cells: raw.cells,
        })
    }
}

impl Grid {
    /// Create an empty grid
    pub fn new(width: usize, height: usize) -> Self {
        Grid {
            width,
            height,
            cells: vec![vec![CellType::Empty; width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Get cell content, `None` outside the grid
    pub fn get_cell(&self, x: usize, y: usize) -> Option<CellType> {
        self.cells.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Borrow a whole row
    ///
    /// Panics if `y` is not a grid row.
    pub fn row(&self, y: usize) -> &[CellType] {
        &self.cells[y]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellType]> {
        self.cells.iter().map(|row| row.as_slice())
    }

    /// Number of occupied cells
    pub fn filled_count(&self) -> usize {
        self.rows()
            .map(|row| row.iter().filter(|cell| !cell.is_empty()).count())
            .sum()
    }

    /// Whether a piece cell may occupy (x, y)
    ///
    /// Columns outside the grid and rows below the floor count as occupied.
    /// Rows above the ceiling are always free so pieces can spawn partially
    /// off-screen.
    pub fn is_empty(&self, x: i32, y: i32) -> bool {
        if x < 0 || x as usize >= self.width || (y >= 0 && y as usize >= self.height) {
            return false;
        }
        if y < 0 {
            return true;
        }
        self.cells[y as usize][x as usize].is_empty()
    }

    /// Write a cell
    ///
    /// Panics if (x, y) is outside the grid: callers only place cells that
    /// already passed a collision test.
    pub fn place(&mut self, x: usize, y: usize, cell: CellType) {
        assert!(
            x < self.width && y < self.height,
            "cell ({}, {}) is outside the {}x{} grid",
            x,
            y,
            self.width,
            self.height
        );
        self.cells[y][x] = cell;
    }

    /// Indices of fully occupied rows, top to bottom
    pub fn find_full_rows(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().all(|cell| !cell.is_empty()))
            .map(|(y, _)| y)
            .collect()
    }

    /// Remove each listed row and drop everything above it by one
    ///
    /// Rows are handled one at a time in the given order. For each one the row
    /// is emptied, rows `y-1 ..= 0` are copied one step down and row 0 is
    /// emptied. Indices must be ascending for a batch from `find_full_rows`
    /// to clear every listed row.
    pub fn clear_and_collapse(&mut self, rows: &[usize]) {
        for &line in rows {
            if line >= self.height {
                continue;
            }
            self.cells[line].fill(CellType::Empty);
            for y in (1..=line).rev() {
                let (above, below) = self.cells.split_at_mut(y);
                below[0].copy_from_slice(&above[y - 1]);
            }
            self.cells[0].fill(CellType::Empty);
        }
    }
}
