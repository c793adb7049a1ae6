use core::ops::BitOr;
use serde::{Deserialize, Serialize};

pub use engine::*;
pub use error::*;
pub use generator::*;
pub use minefield::*;
pub use tile::*;
pub use types::*;

mod engine;
mod error;
mod generator;
mod minefield;
mod tile;
mod types;

/// Board dimensions `(rows, cols)` and mine count.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Validates the dimensions and caps the mine count at half the board.
    pub fn new(size: Coord2, mines: CellCount) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::InvalidSize);
        }

        let max_mines = mult(size.0, size.1) / 2;
        let mines = if mines > max_mines {
            log::warn!(
                "Requested {} mines but a {}x{} board fits at most {}, clamping",
                mines,
                size.0,
                size.1,
                max_mines
            );
            max_mines
        } else {
            mines
        };

        Ok(Self::new_unchecked(size, mines))
    }

    pub const fn beginner() -> Self {
        Self::new_unchecked((9, 9), 10)
    }

    pub const fn intermediate() -> Self {
        Self::new_unchecked((16, 16), 40)
    }

    pub const fn expert() -> Self {
        Self::new_unchecked((16, 30), 99)
    }

    pub const fn height(&self) -> Coord {
        self.size.0
    }

    pub const fn width(&self) -> Coord {
        self.size.1
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mines)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new_unchecked((20, 60), 150)
    }
}

/// Player command aimed at a single tile.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Open a closed tile, or chord an opened one.
    Open,
    ToggleFlag,
}

/// Result of applying an [`Action`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    NoChange,
    Opened,
    Flagged,
    Unflagged,
    MineHit,
    /// Only reported by [`Game`], when the action opened the last safe tile.
    Won,
}

impl ActionOutcome {
    /// Whether this outcome could have caused an update to the board
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }

    pub const fn is_mine_hit(self) -> bool {
        matches!(self, Self::MineHit)
    }
}

/// Used to merge outcomes when opening several tiles at once
impl BitOr for ActionOutcome {
    type Output = ActionOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use ActionOutcome::*;
        match (self, rhs) {
            // a mine has priority
            (MineHit, _) | (_, MineHit) => MineHit,
            (Won, _) | (_, Won) => Won,
            (NoChange, other) => other,
            (this, _) => this,
        }
    }
}
