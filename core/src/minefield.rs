use std::collections::VecDeque;

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::*;

/// Grid of tiles plus the counters derived from it.
///
/// Tiles live in a single row-major [`Array2`] that is allocated once and never resized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Minefield {
    config: GameConfig,
    tiles: Array2<Tile>,
    mine_locations: Vec<Coord2>,
    mines_placed: bool,
    opened_safe_count: CellCount,
    flagged_count: CellCount,
    triggered_mine: Option<Coord2>,
}

impl Minefield {
    /// Empty grid, no mines, nothing opened or flagged.
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            tiles: Array2::default(config.size.to_nd_index()),
            mine_locations: Vec::new(),
            mines_placed: false,
            opened_safe_count: 0,
            flagged_count: 0,
            triggered_mine: None,
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if in_bounds(coords, self.size()) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn tile(&self, coords: Coord2) -> Option<Tile> {
        self.tiles.get(coords.to_nd_index()).copied()
    }

    /// Read-only view of the whole grid, indexed `[row, col]`.
    pub fn tiles(&self) -> ArrayView2<'_, Tile> {
        self.tiles.view()
    }

    pub fn mines_placed(&self) -> bool {
        self.mines_placed
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_locations.len() as CellCount
    }

    pub fn mine_locations(&self) -> &[Coord2] {
        &self.mine_locations
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    pub fn opened_safe_count(&self) -> CellCount {
        self.opened_safe_count
    }

    /// The mine that ended the game, if one was opened.
    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    /// Puts `config.mines` mines on the board, never on `exclude`.
    pub fn place_mines<G: MinefieldGenerator>(&mut self, exclude: Coord2, generator: G) -> Result<()> {
        let exclude = self.validate_coords(exclude)?;
        if self.mines_placed() {
            return Err(GameError::MinesAlreadyPlaced);
        }

        let total_cells = self.config.total_cells();
        if self.config.mines >= total_cells {
            return Err(GameError::TooManyMines {
                requested: self.config.mines,
                cells: total_cells,
            });
        }

        let locations = generator.generate(self.config, exclude)?;
        if locations.len() != usize::from(self.config.mines) {
            log::warn!(
                "Generator returned {} mines, expected {}",
                locations.len(),
                self.config.mines
            );
            return Err(GameError::InvalidLayout);
        }

        let mut mine_mask: Array2<bool> = Array2::default(self.size().to_nd_index());
        for &coords in &locations {
            let coords = self.validate_coords(coords)?;
            let slot = &mut mine_mask[coords.to_nd_index()];
            if coords == exclude || *slot {
                return Err(GameError::InvalidLayout);
            }
            *slot = true;
        }

        for &coords in &locations {
            self.tiles[coords.to_nd_index()].set_mine();
        }
        log::debug!(
            "Placed {} mines, first move at {:?} kept safe",
            locations.len(),
            exclude
        );
        self.mine_locations = locations;
        self.mines_placed = true;
        Ok(())
    }

    /// Fills in `bordering_mines` for every safe tile from the mine list.
    ///
    /// Counts are rebuilt from scratch, calling this again yields the same grid.
    pub fn compute_border_counts(&mut self) {
        let mut counts: Array2<u8> = Array2::zeros(self.size().to_nd_index());
        for &mine in &self.mine_locations {
            for pos in self.tiles.iter_neighbors(mine) {
                if !self.tiles[pos.to_nd_index()].is_mine() {
                    counts[pos.to_nd_index()] += 1;
                }
            }
        }

        for (tile, &count) in self.tiles.iter_mut().zip(counts.iter()) {
            tile.set_bordering_mines(count);
        }
    }

    pub fn open_or_flag(&mut self, action: Action, coords: Coord2) -> Result<ActionOutcome> {
        use ActionOutcome::*;

        let coords = self.validate_coords(coords)?;
        let tile = self.tiles[coords.to_nd_index()];

        Ok(match (action, tile.is_opened(), tile.is_flagged()) {
            (Action::Open, false, false) => self.open_tile(coords),
            (Action::Open, true, _) => self.handle_chord(coords),
            (Action::Open, false, true) => NoChange,
            (Action::ToggleFlag, false, flagged) => {
                self.tiles[coords.to_nd_index()].set_flagged(!flagged);
                if flagged {
                    self.flagged_count -= 1;
                    Unflagged
                } else {
                    self.flagged_count += 1;
                    Flagged
                }
            }
            (Action::ToggleFlag, true, _) => NoChange,
        })
    }

    /// `total` minus the number of flags, negative when the player over-flags.
    pub fn remaining_mines(&self, total: CellCount) -> isize {
        total as isize - self.flagged_count as isize
    }

    /// Every safe tile is opened, flags don't matter.
    pub fn has_won(&self) -> bool {
        self.opened_safe_count == self.config.total_cells() - self.mine_count()
    }

    pub fn flag_all_mines(&mut self) {
        for &coords in &self.mine_locations {
            let tile = &mut self.tiles[coords.to_nd_index()];
            if !tile.is_flagged() && !tile.is_opened() {
                tile.set_flagged(true);
                self.flagged_count += 1;
            }
        }
    }

    /// Opens a closed, unflagged tile and floods out from it when it borders no mines.
    fn open_tile(&mut self, coords: Coord2) -> ActionOutcome {
        let tile = {
            let tile = &mut self.tiles[coords.to_nd_index()];
            tile.open();
            *tile
        };

        if tile.is_mine() {
            log::debug!("Opened mine at {:?}", coords);
            self.triggered_mine = Some(coords);
            return ActionOutcome::MineHit;
        }

        self.opened_safe_count += 1;
        log::debug!(
            "Open tile at {:?}, mine count: {}",
            coords,
            tile.bordering_mines()
        );
        if tile.bordering_mines() == 0 {
            self.reveal_empty_neighbors(coords);
        }
        ActionOutcome::Opened
    }

    fn reveal_empty_neighbors(&mut self, start: Coord2) {
        let mut to_visit = VecDeque::from([start]);

        while let Some(visit_coords) = to_visit.pop_front() {
            for pos in self.tiles.iter_neighbors(visit_coords) {
                let tile = &mut self.tiles[pos.to_nd_index()];
                // opened tiles were already expanded, which also stops the walk from revisiting them
                if tile.is_opened() || tile.is_flagged() || tile.is_mine() {
                    continue;
                }

                tile.open();
                self.opened_safe_count += 1;
                log::trace!(
                    "Flood opened tile at {:?}, mine count: {}",
                    pos,
                    tile.bordering_mines()
                );

                if tile.bordering_mines() == 0 {
                    to_visit.push_back(pos);
                }
            }
        }
    }

    fn handle_chord(&mut self, coords: Coord2) -> ActionOutcome {
        let flagged_neighbors = self
            .tiles
            .iter_neighbors(coords)
            .filter(|&pos| self.tiles[pos.to_nd_index()].is_flagged())
            .count();

        if flagged_neighbors != usize::from(self.tiles[coords.to_nd_index()].bordering_mines()) {
            return ActionOutcome::NoChange;
        }

        let mut outcome = ActionOutcome::NoChange;
        for pos in self.tiles.iter_neighbors(coords) {
            let tile = self.tiles[pos.to_nd_index()];
            // a flood from an earlier neighbor may already have opened this one
            if !tile.is_flagged() && !tile.is_opened() {
                outcome = outcome | self.open_tile(pos);
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minefield(size: Coord2, mines: &[Coord2], exclude: Coord2) -> Minefield {
        let config = GameConfig::new_unchecked(size, mines.len() as CellCount);
        let mut field = Minefield::new(config);
        field
            .place_mines(exclude, FixedMinefieldGenerator::new(mines))
            .unwrap();
        field.compute_border_counts();
        field
    }

    fn random_minefield(size: Coord2, mines: CellCount, exclude: Coord2, seed: u64) -> Minefield {
        let config = GameConfig::new(size, mines).unwrap();
        let mut field = Minefield::new(config);
        field
            .place_mines(exclude, RandomMinefieldGenerator::new(seed))
            .unwrap();
        field.compute_border_counts();
        field
    }

    fn brute_force_count(field: &Minefield, coords: Coord2) -> u8 {
        let (rows, cols) = field.size();
        let mut count = 0;
        for row in coords.0.saturating_sub(1)..=coords.0.saturating_add(1) {
            for col in coords.1.saturating_sub(1)..=coords.1.saturating_add(1) {
                if (row, col) == coords || row >= rows || col >= cols {
                    continue;
                }
                if field.tile((row, col)).unwrap().is_mine() {
                    count += 1;
                }
            }
        }
        count
    }

    fn opened(field: &Minefield) -> Vec<Coord2> {
        field
            .tiles()
            .indexed_iter()
            .filter(|(_, tile)| tile.is_opened())
            .map(|((row, col), _)| (row as Coord, col as Coord))
            .collect()
    }

    #[test]
    fn new_grid_is_empty() {
        let field = Minefield::new(GameConfig::beginner());
        assert!(!field.mines_placed());
        assert!(field.tiles().iter().all(|&tile| tile == Tile::default()));
        assert_eq!(field.size(), (9, 9));
    }

    #[test]
    fn random_placement_respects_exclude_and_count() {
        for seed in 0..100 {
            let exclude = ((seed % 9) as Coord, (seed % 7) as Coord);
            let field = random_minefield((9, 9), 40, exclude, seed);

            assert!(!field.tile(exclude).unwrap().is_mine());
            assert_eq!(field.mine_count(), 40);
            assert_eq!(field.tiles().iter().filter(|tile| tile.is_mine()).count(), 40);
        }
    }

    #[test]
    fn border_counts_match_brute_force() {
        for seed in 0..50 {
            let field = random_minefield((12, 17), 60, (5, 5), seed);
            let (rows, cols) = field.size();
            for row in 0..rows {
                for col in 0..cols {
                    let tile = field.tile((row, col)).unwrap();
                    if tile.is_mine() {
                        assert_eq!(tile.bordering_mines(), 0);
                    } else {
                        assert_eq!(
                            tile.bordering_mines(),
                            brute_force_count(&field, (row, col)),
                            "seed {seed}, tile {:?}",
                            (row, col)
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn recomputing_border_counts_is_stable() {
        let mut field = minefield((3, 3), &[(0, 0), (2, 2)], (1, 0));
        let before = field.clone();
        field.compute_border_counts();
        assert_eq!(field, before);
        assert_eq!(field.tile((1, 1)).unwrap().bordering_mines(), 2);
    }

    #[test]
    fn placement_rejects_bad_layouts() {
        let config = GameConfig::new_unchecked((3, 3), 2);

        let mut field = Minefield::new(config);
        let on_exclude = FixedMinefieldGenerator::new([(0, 0), (1, 1)]);
        assert_eq!(field.place_mines((1, 1), on_exclude), Err(GameError::InvalidLayout));

        let duplicate = FixedMinefieldGenerator::new([(0, 0), (0, 0)]);
        assert_eq!(field.place_mines((1, 1), duplicate), Err(GameError::InvalidLayout));

        let short = FixedMinefieldGenerator::new([(0, 0)]);
        assert_eq!(field.place_mines((1, 1), short), Err(GameError::InvalidLayout));

        let off_board = FixedMinefieldGenerator::new([(0, 0), (3, 0)]);
        assert_eq!(field.place_mines((1, 1), off_board), Err(GameError::InvalidCoords));

        assert!(!field.mines_placed());
        assert!(field.tiles().iter().all(|tile| !tile.is_mine()));
    }

    #[test]
    fn placement_happens_once() {
        let mut field = minefield((3, 3), &[(0, 0)], (2, 2));
        assert_eq!(
            field.place_mines((2, 2), FixedMinefieldGenerator::new([(1, 1)])),
            Err(GameError::MinesAlreadyPlaced)
        );
    }

    #[test]
    fn empty_layout_still_counts_as_placed() {
        let mut field = Minefield::new(GameConfig::new_unchecked((2, 2), 0));
        field
            .place_mines((0, 0), RandomMinefieldGenerator::new(0))
            .unwrap();
        assert!(field.mines_placed());
        assert_eq!(
            field.place_mines((0, 0), RandomMinefieldGenerator::new(0)),
            Err(GameError::MinesAlreadyPlaced)
        );
    }

    #[test]
    fn placement_rejects_full_board() {
        let mut field = Minefield::new(GameConfig::new_unchecked((2, 2), 4));
        assert_eq!(
            field.place_mines((0, 0), RandomMinefieldGenerator::new(0)),
            Err(GameError::TooManyMines {
                requested: 4,
                cells: 4
            })
        );
    }

    #[test]
    fn opening_zero_tile_cascades_to_win() {
        let mut field = minefield((3, 3), &[(2, 2)], (0, 0));

        let outcome = field.open_or_flag(Action::Open, (0, 0)).unwrap();

        assert_eq!(outcome, ActionOutcome::Opened);
        assert_eq!(field.opened_safe_count(), 8);
        assert!(!field.tile((2, 2)).unwrap().is_opened());
        assert_eq!(field.tile((1, 1)).unwrap().bordering_mines(), 1);
        assert!(field.has_won());
    }

    #[test]
    fn flood_opens_zero_region_plus_border() {
        // column 3 is a wall of mines; columns 0..=1 are zeros, column 2 is the border
        let mines = [(0, 3), (1, 3), (2, 3), (3, 3)];
        let mut field = minefield((4, 5), &mines, (0, 0));

        field.open_or_flag(Action::Open, (3, 0)).unwrap();

        let opened = opened(&field);
        assert_eq!(opened.len(), 12);
        assert!(opened.iter().all(|&(_, col)| col <= 2));
        assert_eq!(usize::from(field.opened_safe_count()), opened.len());
        // column 4 is behind the wall
        assert!(!field.tile((0, 4)).unwrap().is_opened());
        assert!(!field.has_won());
    }

    #[test]
    fn flood_never_counts_a_tile_twice() {
        for seed in 0..30 {
            let mut field = random_minefield((20, 30), 60, (10, 10), seed);
            field.open_or_flag(Action::Open, (10, 10)).unwrap();
            assert_eq!(usize::from(field.opened_safe_count()), opened(&field).len());
        }
    }

    #[test]
    fn flood_skips_flagged_tiles() {
        let mut field = minefield((3, 3), &[(2, 2)], (0, 0));
        field.open_or_flag(Action::ToggleFlag, (0, 2)).unwrap();

        field.open_or_flag(Action::Open, (0, 0)).unwrap();

        let tile = field.tile((0, 2)).unwrap();
        assert!(tile.is_flagged() && !tile.is_opened());
        assert!(!field.has_won());
    }

    #[test]
    fn opening_a_mine_does_not_cascade() {
        let mut field = minefield((3, 3), &[(0, 0)], (2, 2));

        let outcome = field.open_or_flag(Action::Open, (0, 0)).unwrap();

        assert!(outcome.is_mine_hit());
        assert!(field.tile((0, 0)).unwrap().is_opened());
        assert_eq!(opened(&field), vec![(0, 0)]);
        assert_eq!(field.triggered_mine(), Some((0, 0)));
    }

    #[test]
    fn flagged_tile_cannot_be_opened() {
        let mut field = minefield((3, 3), &[(0, 0)], (2, 2));
        field.open_or_flag(Action::ToggleFlag, (1, 1)).unwrap();

        let outcome = field.open_or_flag(Action::Open, (1, 1)).unwrap();

        assert_eq!(outcome, ActionOutcome::NoChange);
        let tile = field.tile((1, 1)).unwrap();
        assert!(tile.is_flagged());
        assert!(!tile.is_opened());
    }

    #[test]
    fn opened_tile_cannot_be_flagged() {
        let mut field = minefield((3, 3), &[(0, 0)], (2, 2));
        field.open_or_flag(Action::Open, (1, 1)).unwrap();

        let outcome = field.open_or_flag(Action::ToggleFlag, (1, 1)).unwrap();

        assert_eq!(outcome, ActionOutcome::NoChange);
        assert!(!field.tile((1, 1)).unwrap().is_flagged());
        assert_eq!(field.flagged_count(), 0);
    }

    #[test]
    fn remaining_mines_tracks_flag_toggles() {
        let mut field = minefield((3, 3), &[(0, 0)], (2, 2));
        assert_eq!(field.remaining_mines(1), 1);

        assert_eq!(
            field.open_or_flag(Action::ToggleFlag, (0, 1)).unwrap(),
            ActionOutcome::Flagged
        );
        assert_eq!(field.remaining_mines(1), 0);

        field.open_or_flag(Action::ToggleFlag, (0, 2)).unwrap();
        assert_eq!(field.remaining_mines(1), -1);

        assert_eq!(
            field.open_or_flag(Action::ToggleFlag, (0, 1)).unwrap(),
            ActionOutcome::Unflagged
        );
        assert_eq!(field.remaining_mines(1), 0);
    }

    #[test]
    fn chord_with_matching_flags_opens_neighbors() {
        let mines = [(0, 1), (2, 1)];
        let mut field = minefield((3, 3), &mines, (1, 1));

        field.open_or_flag(Action::Open, (1, 1)).unwrap();
        field.open_or_flag(Action::ToggleFlag, (0, 1)).unwrap();
        field.open_or_flag(Action::ToggleFlag, (2, 1)).unwrap();

        let outcome = field.open_or_flag(Action::Open, (1, 1)).unwrap();

        assert_eq!(outcome, ActionOutcome::Opened);
        assert_eq!(field.tile((1, 0)).unwrap().bordering_mines(), 2);
        assert!(field.tile((1, 0)).unwrap().is_opened());
        assert!(field.tile((0, 0)).unwrap().is_opened());
        assert!(field.has_won());
    }

    #[test]
    fn chord_with_mismatched_flags_changes_nothing() {
        let mines = [(0, 1), (2, 1)];
        let mut field = minefield((3, 3), &mines, (1, 1));
        field.open_or_flag(Action::Open, (1, 1)).unwrap();
        field.open_or_flag(Action::ToggleFlag, (0, 1)).unwrap();
        let before = field.clone();

        let outcome = field.open_or_flag(Action::Open, (1, 1)).unwrap();

        assert_eq!(outcome, ActionOutcome::NoChange);
        assert_eq!(field, before);
    }

    #[test]
    fn chord_with_too_many_flags_changes_nothing() {
        let mut field = minefield((3, 3), &[(0, 0)], (1, 1));
        field.open_or_flag(Action::Open, (1, 1)).unwrap();
        field.open_or_flag(Action::ToggleFlag, (0, 0)).unwrap();
        field.open_or_flag(Action::ToggleFlag, (2, 2)).unwrap();
        let before = field.clone();

        assert_eq!(
            field.open_or_flag(Action::Open, (1, 1)).unwrap(),
            ActionOutcome::NoChange
        );
        assert_eq!(field, before);
    }

    #[test]
    fn chord_on_wrong_flag_hits_mine_without_rollback() {
        let mines = [(0, 0)];
        let mut field = minefield((3, 3), &mines, (1, 1));
        field.open_or_flag(Action::Open, (1, 1)).unwrap();
        // wrong guess: the mine is at (0, 0)
        field.open_or_flag(Action::ToggleFlag, (2, 2)).unwrap();

        let outcome = field.open_or_flag(Action::Open, (1, 1)).unwrap();

        assert!(outcome.is_mine_hit());
        assert_eq!(field.triggered_mine(), Some((0, 0)));
        assert!(field.tile((0, 0)).unwrap().is_opened());
        assert!(field.tile((2, 0)).unwrap().is_opened());
        assert!(!field.tile((2, 2)).unwrap().is_opened());
    }

    #[test]
    fn chord_counts_flag_on_board_origin() {
        // the flag on (0, 0) is a real neighbor of (1, 1) and must count toward the chord
        let mines = [(0, 0), (2, 2)];
        let mut field = minefield((3, 3), &mines, (1, 1));
        field.open_or_flag(Action::Open, (1, 1)).unwrap();
        field.open_or_flag(Action::ToggleFlag, (0, 0)).unwrap();
        field.open_or_flag(Action::ToggleFlag, (2, 2)).unwrap();

        let outcome = field.open_or_flag(Action::Open, (1, 1)).unwrap();

        assert_eq!(outcome, ActionOutcome::Opened);
        assert!(field.tile((0, 1)).unwrap().is_opened());
        assert!(field.has_won());
    }

    #[test]
    fn chord_only_counts_flags_around_center() {
        let mines = [(0, 0), (2, 3)];
        let mut field = minefield((3, 4), &mines, (1, 2));
        field.open_or_flag(Action::Open, (1, 2)).unwrap();
        field.open_or_flag(Action::ToggleFlag, (0, 0)).unwrap();
        field.open_or_flag(Action::ToggleFlag, (2, 3)).unwrap();

        // (1, 2) borders only (2, 3), the flag at (0, 0) is out of reach
        assert_eq!(field.tile((1, 2)).unwrap().bordering_mines(), 1);
        let outcome = field.open_or_flag(Action::Open, (1, 2)).unwrap();

        assert_eq!(outcome, ActionOutcome::Opened);
        assert!(field.tile((0, 1)).unwrap().is_opened());
        assert!(field.has_won());
    }

    #[test]
    fn has_won_ignores_flags() {
        let mut field = minefield((1, 2), &[(0, 0)], (0, 1));
        assert!(!field.has_won());

        field.open_or_flag(Action::Open, (0, 1)).unwrap();

        assert!(field.has_won());
        assert_eq!(field.flagged_count(), 0);
    }

    #[test]
    fn flag_all_mines_flags_only_mines() {
        let mines = [(0, 0), (2, 2)];
        let mut field = minefield((3, 3), &mines, (1, 1));
        field.open_or_flag(Action::ToggleFlag, (0, 0)).unwrap();

        field.flag_all_mines();

        assert_eq!(field.flagged_count(), 2);
        assert!(field.tile((2, 2)).unwrap().is_flagged());
        assert!(!field.tile((1, 1)).unwrap().is_flagged());
        assert_eq!(field.remaining_mines(2), 0);
    }

    #[test]
    fn out_of_bounds_is_rejected() {
        let mut field = minefield((3, 3), &[(0, 0)], (2, 2));
        let before = field.clone();

        assert_eq!(
            field.open_or_flag(Action::Open, (3, 0)),
            Err(GameError::InvalidCoords)
        );
        assert_eq!(
            field.open_or_flag(Action::ToggleFlag, (0, 3)),
            Err(GameError::InvalidCoords)
        );
        assert_eq!(field, before);
        assert_eq!(field.tile((3, 3)), None);
    }
}
