use ndarray::Array2;

use super::*;

/// Generation strategy that keeps the first opened tile safe, but other than that is purely random.
///
/// Coordinates are drawn uniformly over the whole board; draws that land on the excluded tile or on a tile already
/// holding a mine are thrown away and drawn again.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMinefieldGenerator {
    seed: u64,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(self, config: GameConfig, exclude: Coord2) -> Result<Vec<Coord2>> {
        use rand::prelude::*;

        let total_cells = config.total_cells();

        // rejection sampling only terminates while at least one tile besides `exclude` stays free
        if config.mines >= total_cells {
            return Err(GameError::TooManyMines {
                requested: config.mines,
                cells: total_cells,
            });
        }
        if !in_bounds(exclude, config.size) {
            return Err(GameError::InvalidCoords);
        }

        let (rows, cols) = config.size;
        let mut taken: Array2<bool> = Array2::default(config.size.to_nd_index());
        taken[exclude.to_nd_index()] = true;

        let mut mines = Vec::with_capacity(config.mines.into());
        let mut rejected = 0usize;
        let mut rng = SmallRng::seed_from_u64(self.seed);
        while mines.len() < usize::from(config.mines) {
            let coords = (rng.random_range(0..rows), rng.random_range(0..cols));
            let slot = &mut taken[coords.to_nd_index()];
            if *slot {
                rejected += 1;
                continue;
            }
            *slot = true;
            mines.push(coords);
        }

        log::debug!(
            "Generated {} mines with seed {}, {} draws rejected",
            mines.len(),
            self.seed,
            rejected
        );
        Ok(mines)
    }
}
