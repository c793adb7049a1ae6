use thiserror::Error;

use crate::CellCount;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Board height and width must be positive")]
    InvalidSize,
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Too many mines, requested {requested} but the board has {cells} cells")]
    TooManyMines {
        requested: CellCount,
        cells: CellCount,
    },
    #[error("Mine layout does not match the board")]
    InvalidLayout,
    #[error("Mines have already been placed")]
    MinesAlreadyPlaced,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
}

pub type Result<T> = core::result::Result<T, GameError>;
