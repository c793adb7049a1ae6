use crate::*;
pub use random::*;

mod random;

/// Chooses where the mines of a fresh minefield go.
///
/// Implementations must return exactly `config.mines` distinct in-bounds coordinates, none of them equal to
/// `exclude`; [`Minefield::place_mines`] rejects anything else.
pub trait MinefieldGenerator {
    fn generate(self, config: GameConfig, exclude: Coord2) -> Result<Vec<Coord2>>;
}

/// Generator that hands out a predetermined layout, used to replay or construct known boards.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedMinefieldGenerator {
    mines: Vec<Coord2>,
}

impl FixedMinefieldGenerator {
    pub fn new(mines: impl Into<Vec<Coord2>>) -> Self {
        Self {
            mines: mines.into(),
        }
    }
}

impl MinefieldGenerator for FixedMinefieldGenerator {
    fn generate(self, _config: GameConfig, _exclude: Coord2) -> Result<Vec<Coord2>> {
        Ok(self.mines)
    }
}
