//! The shared 16×16 grid of colored cells players paint by walking.

use nanogame_proto::packets::BlockChange;
use nanogame_proto::types::BlockPosition;

/// Cells along each side of the grid.
pub const GRID_SIZE: usize = 16;

/// Number of distinct player colors. Color 0 is reserved for empty cells.
pub const PALETTE_SIZE: u64 = 14;

/// Height at which cells are drawn.
pub const FLOOR_Y: i32 = 60;

/// Stained clay; its metadata selects the color.
pub const CELL_BLOCK_ID: u16 = 159;

/// Integer coordinates of a cell, always within the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    x: usize,
    z: usize,
}

impl Cell {
    pub fn new(x: usize, z: usize) -> Option<Self> {
        (x < GRID_SIZE && z < GRID_SIZE).then_some(Self { x, z })
    }

    /// Cell under a world position. Coordinates are truncated toward zero;
    /// anything outside the grid or not finite maps to `None`.
    ///
    /// Truncation happens before the bounds check, so a position in (-1, 0)
    /// on either axis still lands in row or column 0, the same as a plain
    /// integer cast of the coordinate.
    pub fn at(x: f64, z: f64) -> Option<Self> {
        if !x.is_finite() || !z.is_finite() {
            return None;
        }
        let (x, z) = (x.trunc(), z.trunc());
        if x < 0.0 || z < 0.0 {
            return None;
        }
        Self::new(x as usize, z as usize)
    }

    pub fn x(&self) -> usize {
        self.x
    }

    pub fn z(&self) -> usize {
        self.z
    }

    pub fn block_position(&self) -> BlockPosition {
        BlockPosition::new(self.x as i32, FLOOR_Y, self.z as i32)
    }

    pub fn clear_packet(&self) -> BlockChange {
        BlockChange::clear(self.block_position())
    }

    pub fn set_packet(&self, color: u8) -> BlockChange {
        BlockChange::new(self.block_position(), CELL_BLOCK_ID, color)
    }
}

/// Color assigned to a connection.
pub fn color_for(serial: u64) -> u8 {
    (serial % PALETTE_SIZE + 1) as u8
}

#[derive(Debug, Clone, Default)]
pub struct GameGrid {
    cells: [[u8; GRID_SIZE]; GRID_SIZE],
}

impl GameGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, cell: Cell) -> u8 {
        self.cells[cell.x][cell.z]
    }

    /// Paint `cell`, returning whether its color changed.
    pub fn paint(&mut self, cell: Cell, color: u8) -> bool {
        let slot = &mut self.cells[cell.x][cell.z];
        if *slot == color {
            return false;
        }
        *slot = color;
        true
    }

    /// Every painted cell with its color, row by row.
    pub fn non_empty(&self) -> impl Iterator<Item = (Cell, u8)> + '_ {
        self.cells.iter().enumerate().flat_map(|(x, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, color)| **color != 0)
                .map(move |(z, color)| (Cell { x, z }, *color))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.non_empty().next().is_none()
    }
}
