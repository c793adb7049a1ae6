use core::str::FromStr;

use termines_core::{Action, Coord, Coord2};
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  o ROW COL   open a tile, or chord an opened one (also: open)
  f ROW COL   toggle a flag (also: flag)
  r           restart with a new board (also: restart)
  q           quit (also: quit, exit)
  h           show this help (also: help, ?)";

/// One line of player input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Act(Action, Coord2),
    Restart,
    Quit,
    Help,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command {0:?}")]
    Unknown(String),
    #[error("Expected ROW and COL after {0:?}")]
    MissingCoords(String),
    #[error("Invalid coordinate {0:?}")]
    InvalidCoord(String),
    #[error("Unexpected input {0:?}")]
    TrailingInput(String),
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        use ParseCommandError::*;

        let mut words = line.split_whitespace();
        let name = words.next().ok_or(Empty)?;

        let command = match name.to_ascii_lowercase().as_str() {
            "o" | "open" => Command::Act(Action::Open, parse_coords(name, &mut words)?),
            "f" | "flag" => Command::Act(Action::ToggleFlag, parse_coords(name, &mut words)?),
            "r" | "restart" => Command::Restart,
            "q" | "quit" | "exit" => Command::Quit,
            "h" | "help" | "?" => Command::Help,
            _ => return Err(Unknown(name.to_string())),
        };

        match words.next() {
            Some(extra) => Err(TrailingInput(extra.to_string())),
            None => Ok(command),
        }
    }
}

fn parse_coords<'a>(
    name: &str,
    words: &mut impl Iterator<Item = &'a str>,
) -> Result<Coord2, ParseCommandError> {
    let mut next_coord = || -> Result<Coord, ParseCommandError> {
        let word = words
            .next()
            .ok_or_else(|| ParseCommandError::MissingCoords(name.to_string()))?;
        word.parse::<Coord>()
            .map_err(|_| ParseCommandError::InvalidCoord(word.to_string()))
    };
    let row = next_coord()?;
    let col = next_coord()?;
    Ok((row, col))
}
