use std::io::{self, Write};

use termines_core::{Game, GameState, TileView};

pub fn tile_symbol(view: TileView) -> char {
    match view {
        TileView::Closed => '#',
        TileView::Flagged => 'F',
        TileView::Opened(0) => '.',
        TileView::Opened(count) => char::from_digit(count.into(), 10).unwrap_or('?'),
        TileView::Mine => '*',
    }
}

/// Dumps the board, the mine counter and, once the game is over, the result.
pub fn write_game(out: &mut impl Write, game: &Game) -> io::Result<()> {
    let (rows, cols) = game.size();

    if cols > 10 {
        write!(out, "    ")?;
        for col in 0..cols {
            if col % 10 == 0 {
                write!(out, "{}", (col / 10) % 10)?;
            } else {
                write!(out, " ")?;
            }
        }
        writeln!(out)?;
    }
    write!(out, "    ")?;
    for col in 0..cols {
        write!(out, "{}", col % 10)?;
    }
    writeln!(out)?;

    let border = "-".repeat(cols.into());
    writeln!(out, "   +{border}+")?;
    for row in 0..rows {
        write!(out, "{row:>3}|")?;
        for col in 0..cols {
            let symbol = game.tile_view((row, col)).map_or(' ', tile_symbol);
            write!(out, "{symbol}")?;
        }
        writeln!(out, "|")?;
    }
    writeln!(out, "   +{border}+")?;

    writeln!(
        out,
        "Remaining mines: {}  Time: {}s",
        game.mines_left(),
        game.elapsed_secs()
    )?;
    match game.state() {
        GameState::Won => writeln!(out, "You win! Type r to restart, q to quit.")?,
        GameState::Lost => writeln!(out, "You lose! Type r to restart, q to quit.")?,
        GameState::NotStarted | GameState::InProgress => {}
    }
    Ok(())
}
