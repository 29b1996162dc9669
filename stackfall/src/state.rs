use serde::{Deserialize, Serialize};

use crate::grid::{CellType, Grid};
use crate::piece::{Piece, Position, Shape};

/// Active piece as seen by a renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceView {
    pub shape: Shape,
    pub color: CellType,
    pub position: Position,
}

impl From<&Piece> for PieceView {
    fn from(piece: &Piece) -> Self {
        PieceView {
            shape: *piece.shape(),
            color: piece.color(),
            position: piece.position(),
        }
    }
}

/// Read-only snapshot handed to the renderer after each tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderState {
    pub grid: Grid,
    pub piece: Option<PieceView>,
}

impl RenderState {
    /// Grid with the active piece drawn in
    ///
    /// Piece cells outside the grid are dropped, so a piece hanging above the
    /// ceiling shows only its visible part.
    pub fn composed(&self) -> Grid {
        let mut grid = self.grid.clone();
        if let Some(piece) = &self.piece {
            let origin_y = piece.position.y.floor() as i32;
            for (col, row) in piece.shape.cells() {
                let x = col as i32 + piece.position.x;
                let y = row as i32 + origin_y;
                if x >= 0 && (x as usize) < grid.width() && y >= 0 && (y as usize) < grid.height() {
                    grid.place(x as usize, y as usize, piece.color);
                }
            }
        }
        grid
    }
}
