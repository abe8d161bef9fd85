use serde::{Deserialize, Serialize};

use crate::{Coord, Coord2};

/// Player-facing state stored for each grid position.
///
/// A cell cannot be both revealed and flagged; revealing a flagged cell
/// consumes the flag.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellState {
    Hidden,
    Flagged,
    Revealed(u8),
}

impl CellState {
    pub const fn is_unrevealed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged)
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged)
    }

    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed(_))
    }
}

impl Default for CellState {
    fn default() -> Self {
        Self::Hidden
    }
}

/// Read-only snapshot of a single cell, assembled on demand.
///
/// `is_mine` and `adjacent_mines` are meaningful only once the mine layout
/// exists; before the first reveal both report their zero values.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub x: Coord,
    pub y: Coord,
    pub is_mine: bool,
    pub adjacent_mines: u8,
    pub revealed: bool,
    pub flagged: bool,
}

impl Cell {
    pub const fn coords(&self) -> Coord2 {
        (self.x, self.y)
    }
}
