//! Prints a batch of generated problems with their worked steps.
//!
//! # Usage
//!
//! ```sh
//! cargo run --example generate_problems -- --mode division --level 3
//! ```
//!
//! Fix the seed to reproduce a batch:
//!
//! ```sh
//! cargo run --example generate_problems -- --seed 42 --count 5
//! ```

use std::process;

use clap::{Parser, ValueEnum};
use longhand_core::{GameMode, Problem, field_order};
use longhand_generator::{LevelCatalog, LevelId, ProblemGenerator};

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
    /// Game mode to generate for.
    #[arg(long, value_name = "MODE", default_value = "addition")]
    mode: Mode,

    /// Level identifier within the mode's catalog.
    #[arg(short, long, value_name = "LEVEL", default_value_t = 1)]
    level: u32,

    /// Number of problems to print.
    #[arg(short, long, value_name = "COUNT", default_value_t = 10)]
    count: usize,

    /// Seed for reproducible output.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
}

fn main() {
    let args = Args::parse();
    let catalog = LevelCatalog::for_mode(args.mode.into());
    let Some(level) = catalog.get(LevelId(args.level)) else {
        eprintln!("Unknown level: {}", args.level);
        eprintln!(
            "Available levels: {}",
            catalog
                .iter()
                .map(|l| format!("{} ({})", l.id, l.name))
                .collect::<Vec<_>>()
                .join(", ")
        );
        process::exit(2);
    };

    let mut generator = args
        .seed
        .map_or_else(ProblemGenerator::new, ProblemGenerator::with_seed);
    let problems = match generator.generate_batch(level, args.count) {
        Ok(problems) => problems,
        Err(err) => {
            eprintln!("Failed to generate problems: {err}");
            process::exit(1);
        }
    };

    println!("Level {}: {}", level.id, level.name);
    for problem in &problems {
        print_problem(problem);
    }
}

fn print_problem(problem: &Problem) {
    println!();
    println!("{problem}");
    for field in field_order(problem) {
        if let Some(value) = problem.expected_value(field) {
            println!("  {:<24} {value}", field.to_string());
        }
    }
}
