//! Longhand terminal practice game.
//!
//! # Usage
//!
//! ```sh
//! cargo run --bin longhand -- --mode division --seed 7
//! ```
//!
//! Serve fixed problems before locally generated ones:
//!
//! ```sh
//! cargo run --bin longhand -- --preset 47,38 --preset 95,7
//! ```
//!
//! Set `RUST_LOG=debug` to trace session transitions.

use std::io::{self, BufRead as _, Write as _};

use clap::{Parser, ValueEnum};
use longhand_app::PracticeApp;
use longhand_core::{GameMode, Problem};
use longhand_game::{GameSession, LevelCatalog, PresetSource, SessionConfig};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Addition,
    Division,
}

impl From<Mode> for GameMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Addition => GameMode::Addition,
            Mode::Division => GameMode::Division,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Kind of arithmetic to practice.
    #[arg(long, value_name = "MODE", default_value = "addition")]
    mode: Mode,

    /// Seed for reproducible problems.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Unlock every level from the start.
    #[arg(long)]
    allow_level_skipping: bool,

    /// Problem served to every level before generated ones, as two operands.
    #[arg(long, value_name = "A,B", value_parser = parse_operands)]
    preset: Vec<(u32, u32)>,
}

fn parse_operands(s: &str) -> Result<(u32, u32), String> {
    let (a, b) = s
        .split_once(',')
        .ok_or_else(|| format!("expected two operands separated by a comma, got `{s}`"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid operand `{v}`: {e}"))
    };
    Ok((parse(a)?, parse(b)?))
}

fn build_session(args: &Args) -> GameSession {
    let mode = GameMode::from(args.mode);
    let catalog = LevelCatalog::for_mode(mode);

    let presets: Vec<Problem> = args
        .preset
        .iter()
        .filter_map(|&(a, b)| {
            let problem = Problem::from_operands(mode, a, b);
            if problem.is_none() {
                log::warn!("skipping preset {a},{b}: not a {mode} problem");
            }
            problem
        })
        .collect();
    let source = catalog.ids().fold(PresetSource::new(), |source, level| {
        source.with_level(level, presets.iter().cloned())
    });

    let config = SessionConfig::default()
        .use_external_source(!presets.is_empty())
        .allow_level_skipping(args.allow_level_skipping);

    let builder = GameSession::builder(catalog).config(config).source(source);
    match args.seed {
        Some(seed) => builder.seed(seed),
        None => builder,
    }
    .build()
}

fn main() -> io::Result<()> {
    better_panic::install();
    env_logger::init();

    let args = Args::parse();
    let mut app = PracticeApp::new(build_session(&args));
    app.start();

    let mut stdout = io::stdout();
    write!(stdout, "{}> ", app.screen())?;
    stdout.flush()?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        if let Err(err) = app.handle_line(&line) {
            writeln!(stdout, "{err}")?;
        }
        if app.is_quit_requested() {
            break;
        }
        write!(stdout, "{}> ", app.screen())?;
        stdout.flush()?;
    }
    Ok(())
}
