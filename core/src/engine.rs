use chrono::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - NotStarted -> InProgress
/// - InProgress -> Won
/// - InProgress -> Lost
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    /// Initial state, no mines on the board yet
    NotStarted,
    /// First tile opened, mines placed
    InProgress,
    /// Game ended and player won
    Won,
    /// Game ended and player lost
    Lost,
}

impl GameState {
    pub const fn is_initial(self) -> bool {
        matches!(self, Self::NotStarted)
    }

    /// Indicates the game has ended and no moves can be made anymore
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::NotStarted
    }
}

/// Represents a game from start to finish
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    minefield: Minefield,
    seed: u64,
    state: GameState,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

impl Game {
    /// Mines are not placed until the first tile is opened; `seed` drives that placement.
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self {
            minefield: Minefield::new(config),
            seed,
            state: Default::default(),
            started_at: None,
            ended_at: None,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_final()
    }

    pub fn config(&self) -> GameConfig {
        self.minefield.config()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn size(&self) -> Coord2 {
        self.minefield.size()
    }

    pub fn minefield(&self) -> &Minefield {
        &self.minefield
    }

    pub fn tile(&self, coords: Coord2) -> Option<Tile> {
        self.minefield.tile(coords)
    }

    /// Mines are only exposed after a loss; after a win they are all flagged instead.
    pub fn tile_view(&self, coords: Coord2) -> Option<TileView> {
        let show_mines = matches!(self.state, GameState::Lost);
        self.tile(coords).map(|tile| TileView::of(tile, show_mines))
    }

    /// How many mines have not been flagged yet
    pub fn mines_left(&self) -> isize {
        self.minefield.remaining_mines(self.config().mines)
    }

    /// How many seconds have passed since game started, 0 if it hasn't started
    pub fn elapsed_secs(&self) -> u32 {
        match self.started_at {
            Some(started_at) => (self.ended_at.unwrap_or_else(Utc::now) - started_at)
                .num_seconds()
                .clamp(0, u32::MAX.into()) as u32,
            None => 0,
        }
    }

    /// Apply an action, placing mines with a [`RandomMinefieldGenerator`] on the first open.
    pub fn act(&mut self, action: Action, coords: Coord2) -> Result<ActionOutcome> {
        let generator = RandomMinefieldGenerator::new(self.seed);
        self.act_with(action, coords, generator)
    }

    /// Like [`Game::act`] but with a caller-chosen generator, which is only consulted on the first open.
    pub fn act_with<G: MinefieldGenerator>(
        &mut self,
        action: Action,
        coords: Coord2,
        generator: G,
    ) -> Result<ActionOutcome> {
        self.check_final()?;
        let coords = self.minefield.validate_coords(coords)?;

        if self.state.is_initial() && action == Action::Open && self.is_openable(coords) {
            self.start(coords, generator)?;
        }

        let outcome = self.minefield.open_or_flag(action, coords)?;
        Ok(match outcome {
            ActionOutcome::MineHit => {
                self.mark_ended(false);
                outcome
            }
            ActionOutcome::Opened if self.minefield.has_won() => {
                self.minefield.flag_all_mines();
                self.mark_ended(true);
                ActionOutcome::Won
            }
            _ => outcome,
        })
    }

    /// Throw the board away and start over with the same configuration.
    pub fn restart(&mut self, seed: u64) {
        log::info!("Restarting game with seed {}", seed);
        *self = Self::new(self.config(), seed);
    }

    fn is_openable(&self, coords: Coord2) -> bool {
        self.tile(coords)
            .is_some_and(|tile| !tile.is_opened() && !tile.is_flagged())
    }

    fn start<G: MinefieldGenerator>(&mut self, first_open: Coord2, generator: G) -> Result<()> {
        self.minefield.place_mines(first_open, generator)?;
        self.minefield.compute_border_counts();
        self.state = GameState::InProgress;
        self.started_at = Some(Utc::now());
        log::info!(
            "Game started on a {}x{} board with {} mines",
            self.size().0,
            self.size().1,
            self.minefield.mine_count()
        );
        Ok(())
    }

    fn check_final(&self) -> Result<()> {
        if self.state.is_final() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }

    fn mark_ended(&mut self, won: bool) {
        if self.state.is_final() {
            return;
        }

        self.state = if won { GameState::Won } else { GameState::Lost };
        self.ended_at = Some(Utc::now());
        log::info!("Game ended: {:?} after {}s", self.state, self.elapsed_secs());
    }
}
