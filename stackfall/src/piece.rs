//! Piece module - the falling tetromino
//!
//! A piece is a square boolean matrix plus a position in grid space. The
//! matrix is rotated directly instead of tracking a rotation index, so a
//! rotated piece is just another shape.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{Result, StackfallError};
use crate::grid::{CellType, Grid};
use crate::kinds::KindSource;

/// Largest supported shape side
pub const MAX_SHAPE_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    O,
    T,
    Z,
    S,
    I,
    L,
    J,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::O,
        PieceKind::T,
        PieceKind::Z,
        PieceKind::S,
        PieceKind::I,
        PieceKind::L,
        PieceKind::J,
    ];

    /// Spawn orientation of the kind
    pub fn shape(&self) -> Shape {
        match self {
            PieceKind::O => SHAPE_O,
            PieceKind::T => SHAPE_T,
            PieceKind::Z => SHAPE_Z,
            PieceKind::S => SHAPE_S,
            PieceKind::I => SHAPE_I,
            PieceKind::L => SHAPE_L,
            PieceKind::J => SHAPE_J,
        }
    }

    /// Cell type left in the grid by pieces of this kind
    pub fn cell_type(&self) -> CellType {
        match self {
            PieceKind::O => CellType::O,
            PieceKind::T => CellType::T,
            PieceKind::Z => CellType::Z,
            PieceKind::S => CellType::S,
            PieceKind::I => CellType::I,
            PieceKind::L => CellType::L,
            PieceKind::J => CellType::J,
        }
    }
}

/// Square occupancy matrix of a piece in its local frame
///
/// Only the top-left `size` x `size` corner of `matrix` is meaningful; the
/// rest is always `false` so shapes compare equal by value. Serialized as
/// its rows and checked like [`Shape::from_rows`] when read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<bool>>", into = "Vec<Vec<bool>>")]
pub struct Shape {
    size: usize,
    matrix: [[bool; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
}

const fn shape(size: usize, matrix: [[u8; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE]) -> Shape {
    let mut out = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
    let mut y = 0;
    while y < MAX_SHAPE_SIZE {
        let mut x = 0;
        while x < MAX_SHAPE_SIZE {
            out[y][x] = matrix[y][x] != 0;
            x += 1;
        }
        y += 1;
    }
    Shape { size, matrix: out }
}

const SHAPE_O: Shape = shape(2, [[1, 1, 0, 0], [1, 1, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
const SHAPE_T: Shape = shape(3, [[1, 1, 1, 0], [0, 1, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
const SHAPE_Z: Shape = shape(3, [[0, 0, 0, 0], [1, 1, 0, 0], [0, 1, 1, 0], [0, 0, 0, 0]]);
const SHAPE_S: Shape = shape(3, [[0, 0, 0, 0], [0, 1, 1, 0], [1, 1, 0, 0], [0, 0, 0, 0]]);
const SHAPE_I: Shape = shape(4, [[0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]]);
const SHAPE_L: Shape = shape(4, [[0, 0, 0, 0], [1, 1, 1, 0], [1, 0, 0, 0], [0, 0, 0, 0]]);
const SHAPE_J: Shape = shape(4, [[0, 0, 0, 0], [1, 1, 1, 0], [0, 0, 1, 0], [0, 0, 0, 0]]);

impl Shape {
    /// Build a shape from rows of booleans
    ///
    /// Rows must form a non-empty square no larger than 4x4.
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> Result<Self> {
        let size = rows.len();
        if size == 0 || size > MAX_SHAPE_SIZE {
            return Err(StackfallError::InvalidShape(format!(
                "size {} is outside 1..={}",
                size, MAX_SHAPE_SIZE
            )));
        }
        let mut matrix = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != size {
                return Err(StackfallError::InvalidShape(format!(
                    "row {} has {} cells, expected {}",
                    y,
                    row.len(),
                    size
                )));
            }
            matrix[y][..size].copy_from_slice(row);
        }
        Ok(Shape { size, matrix })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the local cell at (`x`, `y`) is occupied, `false` outside the shape
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size && self.matrix[y][x]
    }

    /// Occupied cells as (col, row) pairs, row by row
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.size)
            .flat_map(move |y| (0..self.size).map(move |x| (x, y)))
            .filter(move |&(x, y)| self.matrix[y][x])
    }

    /// The shape as rows of booleans
    pub fn to_rows(&self) -> Vec<Vec<bool>> {
        self.matrix[..self.size]
            .iter()
            .map(|row| row[..self.size].to_vec())
            .collect()
    }
}

impl TryFrom<Vec<Vec<bool>>> for Shape {
    type Error = StackfallError;

    fn try_from(rows: Vec<Vec<bool>>) -> Result<Self> {
        Shape::from_rows(&rows)
    }
}

impl From<Shape> for Vec<Vec<bool>> {
    fn from(shape: Shape) -> Self {
        shape.to_rows()
    }
}

/// Quarter-turn of a square matrix: `out[i][j] = shape[j][n-1-i]`
///
/// The result is not checked against any grid.
pub fn rotate(shape: &Shape) -> Shape {
    let n = shape.size;
    let mut matrix = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
    for (i, row) in matrix.iter_mut().enumerate().take(n) {
        for (j, cell) in row.iter_mut().enumerate().take(n) {
            *cell = shape.matrix[j][n - 1 - i];
        }
    }
    Shape { size: n, matrix }
}

/// Piece origin in grid space
///
/// Columns are whole; rows advance fractionally with gravity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: f64,
}

impl Position {
    pub fn new(x: i32, y: f64) -> Self {
        Position { x, y }
    }

    pub fn shifted(&self, dx: i32) -> Self {
        Position::new(self.x + dx, self.y)
    }
}

/// Whether `shape` placed at `position` overlaps the grid walls, floor or stack
///
/// Each occupied cell maps to column `col + x` and row `trunc(row + y)`.
/// Rows above the ceiling are only tested against the side walls.
pub fn check_collision(shape: &Shape, grid: &Grid, position: Position) -> bool {
    shape.cells().any(|(col, row)| {
        let grid_x = col as i32 + position.x;
        let grid_y = (row as f64 + position.y).trunc() as i32;
        !grid.is_empty(grid_x, grid_y)
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FallSpeed {
    #[default]
    Normal,
    SoftDrop,
}

impl FallSpeed {
    /// Rows per tick under `config`
    pub fn rows_per_tick(&self, config: &EngineConfig) -> f64 {
        match self {
            FallSpeed::Normal => config.normal_speed,
            FallSpeed::SoftDrop => config.soft_drop_speed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Piece {
    kind: PieceKind,
    shape: Shape,
    position: Position,
    fall_speed: FallSpeed,
}

impl Piece {
    /// Create a piece of `kind` in its spawn orientation
    pub fn new(kind: PieceKind, position: Position) -> Self {
        Piece {
            kind,
            shape: kind.shape(),
            position,
            fall_speed: FallSpeed::Normal,
        }
    }

    /// Take the next kind from `kinds` and center it horizontally above the grid
    pub fn spawn(kinds: &mut impl KindSource, config: &EngineConfig) -> Self {
        let kind = kinds.next_kind();
        let size = kind.shape().size() as i32;
        let x = config.width as i32 / 2 - size / 2;
        Piece::new(kind, Position::new(x, config.spawn_y))
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn color(&self) -> CellType {
        self.kind.cell_type()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn fall_speed(&self) -> FallSpeed {
        self.fall_speed
    }

    pub fn set_fall_speed(&mut self, speed: FallSpeed) {
        self.fall_speed = speed;
    }

    /// Whether the piece would collide at `position` with its current shape
    pub fn collides_at(&self, grid: &Grid, position: Position) -> bool {
        check_collision(&self.shape, grid, position)
    }

    /// Shift by `dx` columns if the target is free
    pub fn try_shift(&mut self, grid: &Grid, dx: i32) -> bool {
        let candidate = self.position.shifted(dx);
        if self.collides_at(grid, candidate) {
            return false;
        }
        self.position = candidate;
        true
    }

    /// Rotate in place if the rotated shape is free at the current position
    pub fn try_rotate(&mut self, grid: &Grid) -> bool {
        let rotated = rotate(&self.shape);
        if check_collision(&rotated, grid, self.position) {
            return false;
        }
        self.shape = rotated;
        true
    }

    /// Move down by up to `dy` rows, stopping before the first blocked step
    ///
    /// Steps are at most one row long so a fast piece cannot pass through the
    /// stack. Returns whether the piece moved at all.
    pub fn try_descend(&mut self, grid: &Grid, dy: f64) -> bool {
        let mut remaining = dy;
        let mut moved = false;
        while remaining > 0.0 {
            let step = remaining.min(1.0);
            let candidate = Position::new(self.position.x, self.position.y + step);
            if self.collides_at(grid, candidate) {
                break;
            }
            self.position = candidate;
            remaining -= step;
            moved = true;
        }
        moved
    }

    /// Grid coordinates covered by the piece once locked
    ///
    /// Uses `floor` of the origin, so cells above the ceiling come out with a
    /// negative row.
    pub fn lock_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let origin_x = self.position.x;
        let origin_y = self.position.y.floor() as i32;
        self.shape
            .cells()
            .map(move |(col, row)| (col as i32 + origin_x, row as i32 + origin_y))
    }
}
