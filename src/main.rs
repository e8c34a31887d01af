//! Autoplay simulator: runs rounds headlessly and prints one JSON result
//! line per round.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use memory_match::autoplay::{MemoryBot, play_round};
use memory_match::{Difficulty, EngineConfig, GameManager, Theme};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "memory-match")]
#[command(about = "Headless memory-match simulator")]
struct Args {
    /// Difficulty preset to play
    #[arg(short, long, default_value = "easy")]
    difficulty: DifficultyArg,

    /// Number of rounds to simulate
    #[arg(short, long, default_value = "1")]
    games: u32,

    /// Base seed (round N uses seed + N)
    #[arg(long)]
    seed: Option<u64>,

    /// Engine config JSON (layout, timings, scoring)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Chance the bot remembers a card it has seen
    #[arg(long, default_value = "0.7")]
    recall: f64,

    /// Card face theme
    #[arg(long, default_value = "fruit")]
    theme: ThemeArg,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DifficultyArg {
    Easy,
    Medium,
    Hard,
    Hell,
}

impl From<DifficultyArg> for Difficulty {
    fn from(value: DifficultyArg) -> Self {
        match value {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Medium => Difficulty::Medium,
            DifficultyArg::Hard => Difficulty::Hard,
            DifficultyArg::Hell => Difficulty::Hell,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ThemeArg {
    Fruit,
    Animal,
    Instrument,
}

impl From<ThemeArg> for Theme {
    fn from(value: ThemeArg) -> Self {
        match value {
            ThemeArg::Fruit => Theme::Fruit,
            ThemeArg::Animal => Theme::Animal,
            ThemeArg::Instrument => Theme::Instrument,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Quiet by default; RUST_LOG applies unless --verbose overrides it.
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let difficulty = Difficulty::from(args.difficulty);
    let theme = Theme::from(args.theme);
    let base_seed = args.seed.unwrap_or_else(rand::random);
    info!(
        difficulty = difficulty.name(),
        games = args.games,
        base_seed,
        recall = args.recall,
        "Starting simulator"
    );

    let start = Instant::now();
    let mut wins = 0u32;
    let mut total_score = 0u64;
    let mut errors = 0u32;

    for game_num in 1..=args.games {
        let seed = base_seed.wrapping_add(u64::from(game_num));
        let mut game = GameManager::with_seed(config.clone(), seed)?;
        let mut bot = MemoryBot::new(args.recall, StdRng::seed_from_u64(seed.rotate_left(17)));

        match play_round(&mut game, &mut bot, difficulty.config(), theme) {
            Ok(stats) => {
                if stats.is_win {
                    wins += 1;
                }
                total_score += u64::from(stats.score);
                println!("{}", serde_json::to_string(&stats)?);
            }
            Err(e) => {
                errors += 1;
                warn!("Game {} failed: {}", game_num, e);
            }
        }
    }

    let played = args.games.saturating_sub(errors).max(1);
    info!(
        wins,
        errors,
        average_score = total_score / u64::from(played),
        elapsed_ms = start.elapsed().as_millis(),
        "Simulation finished"
    );
    Ok(())
}
