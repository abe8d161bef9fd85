use core::ops::BitOr;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use cell::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use notify::*;
pub use types::*;

mod cell;
mod engine;
mod error;
mod generator;
mod notify;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    pub const fn total_cells(&self) -> CellCount {
        cell_area(self.size.0, self.size.1)
    }

    /// Rejects configurations that placement could never satisfy. A zero-mine
    /// board is valid.
    pub fn validate(&self) -> Result<()> {
        if self.size.0 == 0 || self.size.1 == 0 {
            return Err(GameError::EmptyBoard);
        }
        if self.mines >= self.total_cells() {
            return Err(GameError::TooManyMines);
        }
        Ok(())
    }
}

/// Where the mines are. Fixed for the lifetime of one game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mines: Array2<bool>,
    count: CellCount,
}

impl MineLayout {
    pub fn from_mine_mask(mines: Array2<bool>) -> Result<Self> {
        let (dim_x, dim_y) = mines.dim();
        if Coord::try_from(dim_x).is_err() || Coord::try_from(dim_y).is_err() {
            return Err(GameError::InvalidCoords);
        }

        let count = mines.iter().filter(|&&is_mine| is_mine).count() as CellCount;
        Ok(Self { mines, count })
    }

    pub fn with_mines(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mines: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            mines[coords.to_nd_index()] = true;
        }

        Self::from_mine_mask(mines)
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig::new(self.size(), self.count)
    }

    pub fn size(&self) -> Coord2 {
        let (dim_x, dim_y) = self.mines.dim();
        (dim_x as Coord, dim_y as Coord)
    }

    pub fn total_cells(&self) -> CellCount {
        cell_area(self.size().0, self.size().1)
    }

    pub fn safe_cells(&self) -> CellCount {
        self.total_cells() - self.count
    }

    pub fn mine_count(&self) -> CellCount {
        self.count
    }

    pub fn is_mine(&self, coords: Coord2) -> bool {
        self.mines[coords.to_nd_index()]
    }

    /// Mines among the up-to-8 in-bounds neighbors.
    pub fn adjacent_mines(&self, coords: Coord2) -> u8 {
        self.iter_neighbors(coords)
            .filter(|&pos| self.is_mine(pos))
            .count() as u8
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> impl Iterator<Item = Coord2> + use<> {
        neighbors(coords, self.size())
    }
}

/// Outcome of a flag-toggling operation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FlagOutcome {
    NoChange,
    Changed,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// Outcome of a revealing operation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    Exploded,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Merges per-cell outcomes when one operation opens several cells.
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            // a hit mine ends the game no matter what else opened
            (Exploded, _) | (_, Exploded) => Exploded,
            (Won, _) | (_, Won) => Won,
            (Revealed, _) | (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

/// Combined result of a chord reveal; the two effects are independent.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ChordOutcome {
    pub reveal: RevealOutcome,
    pub flags: FlagOutcome,
}

impl ChordOutcome {
    pub const NO_CHANGE: Self = Self {
        reveal: RevealOutcome::NoChange,
        flags: FlagOutcome::NoChange,
    };

    pub const fn has_update(self) -> bool {
        self.reveal.has_update() || self.flags.has_update()
    }
}
