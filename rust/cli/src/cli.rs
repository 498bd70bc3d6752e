//! Command-line argument definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "partydeck",
    version,
    about = "Partydeck match tools",
    long_about = None
)]
pub struct PartydeckCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play a match between bots and print each round and the final standings
    Simulate {
        /// Number of bot players (at least 3)
        #[arg(long, default_value_t = 3)]
        players: usize,
        /// Rounds to play; defaults to one per question card
        #[arg(long)]
        rounds: Option<usize>,
        /// Bot strategy for every seat and for judging
        #[arg(long, value_enum)]
        bot: Option<BotKind>,
        #[arg(long)]
        seed: Option<u64>,
        /// Seconds to wait for submissions each round
        #[arg(long)]
        pick_timeout: Option<u64>,
        /// Seconds to pause before and between rounds
        #[arg(long)]
        round_delay: Option<u64>,
        /// Shuffle both decks before dealing
        #[arg(long)]
        shuffle: bool,
        /// Question deck, one card per line
        #[arg(long)]
        questions: Option<PathBuf>,
        /// Answer deck, one card per line
        #[arg(long)]
        answers: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the resolved configuration and where each value came from
    Cfg,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum BotKind {
    Baseline,
    Random,
}

impl BotKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BotKind::Baseline => "baseline",
            BotKind::Random => "random",
        }
    }
}
