use serde::{Deserialize, Serialize};

/// One cell of the minefield.
///
/// Only the engine mutates tiles; everyone else gets copies.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    is_mine: bool,
    bordering_mines: u8,
    is_opened: bool,
    is_flagged: bool,
}

impl Tile {
    pub const fn is_mine(self) -> bool {
        self.is_mine
    }

    /// Number of mines in the Moore neighborhood, always 0 for mine tiles.
    pub const fn bordering_mines(self) -> u8 {
        self.bordering_mines
    }

    pub const fn is_opened(self) -> bool {
        self.is_opened
    }

    pub const fn is_flagged(self) -> bool {
        self.is_flagged
    }

    pub(crate) fn set_mine(&mut self) {
        self.is_mine = true;
    }

    pub(crate) fn set_bordering_mines(&mut self, count: u8) {
        self.bordering_mines = count;
    }

    pub(crate) fn open(&mut self) {
        self.is_opened = true;
    }

    pub(crate) fn set_flagged(&mut self, flagged: bool) {
        self.is_flagged = flagged;
    }
}

/// What a front-end should draw for a tile.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileView {
    Closed,
    Flagged,
    Opened(u8),
    Mine,
}

impl TileView {
    /// Flags win over everything on closed tiles, mines are only exposed when `show_mines` is set.
    pub const fn of(tile: Tile, show_mines: bool) -> Self {
        if tile.is_flagged && !tile.is_opened {
            Self::Flagged
        } else if tile.is_mine && (show_mines || tile.is_opened) {
            Self::Mine
        } else if tile.is_opened {
            Self::Opened(tile.bordering_mines)
        } else {
            Self::Closed
        }
    }

    // whether the tile is visually closed
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed | Self::Flagged)
    }
}

impl Default for TileView {
    fn default() -> Self {
        Self::Closed
    }
}
