use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use termines_core::{CellCount, Coord, Game, GameConfig};

use command::Command;

mod command;
mod render;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Preset {
    /// 9x9 with 10 mines
    Beginner,
    /// 16x16 with 40 mines
    Intermediate,
    /// 16x30 with 99 mines
    Expert,
}

impl From<Preset> for GameConfig {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::Beginner => GameConfig::beginner(),
            Preset::Intermediate => GameConfig::intermediate(),
            Preset::Expert => GameConfig::expert(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Minesweeper in the terminal", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Board height in rows
    #[arg(default_value_t = 20)]
    height: Coord,

    /// Board width in columns
    #[arg(default_value_t = 60)]
    width: Coord,

    /// Number of mines, capped at half the board
    #[arg(default_value_t = 150)]
    mines: CellCount,

    /// Use a standard board, overrides HEIGHT WIDTH MINES
    #[arg(short, long, value_enum)]
    preset: Option<Preset>,

    /// Force a seed instead of random, restarts still pick a new one
    #[arg(short, long)]
    seed: Option<u64>,
}

impl Args {
    fn game_config(&self) -> Result<GameConfig> {
        match self.preset {
            Some(preset) => Ok(preset.into()),
            None => GameConfig::new((self.height, self.width), self.mines)
                .context("Invalid board configuration"),
        }
    }
}

fn init_logging(verbose: &clap_verbosity_flag::Verbosity) {
    use tracing_subscriber::filter::LevelFilter;

    let level = match verbose.log_level_filter() {
        log::LevelFilter::Off => LevelFilter::OFF,
        log::LevelFilter::Error => LevelFilter::ERROR,
        log::LevelFilter::Warn => LevelFilter::WARN,
        log::LevelFilter::Info => LevelFilter::INFO,
        log::LevelFilter::Debug => LevelFilter::DEBUG,
        log::LevelFilter::Trace => LevelFilter::TRACE,
    };

    // the default `tracing-log` feature forwards `log` records from the engine
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.verbose);

    let config = args.game_config()?;
    let seed = args.seed.unwrap_or_else(rand::random);
    log::debug!("config: {:?}, seed: {}", config, seed);
    let mut game = Game::new(config, seed);

    let mut out = io::stdout().lock();
    render::write_game(&mut out, &game)?;
    writeln!(out, "Type h for help.")?;
    write!(out, "> ")?;
    out.flush()?;

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read from stdin")?;
        if line.trim().is_empty() {
            write!(out, "> ")?;
            out.flush()?;
            continue;
        }

        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => writeln!(out, "{}", command::HELP)?,
            Ok(Command::Restart) => {
                game.restart(rand::random());
                render::write_game(&mut out, &game)?;
            }
            Ok(Command::Act(action, coords)) => match game.act(action, coords) {
                Ok(outcome) => {
                    log::debug!("{:?} at {:?}: {:?}", action, coords, outcome);
                    render::write_game(&mut out, &game)?;
                }
                Err(err) => writeln!(out, "{err}")?,
            },
            Err(err) => writeln!(out, "{err}, type h for help")?,
        }

        write!(out, "> ")?;
        out.flush()?;
    }

    writeln!(out)?;
    Ok(())
}
