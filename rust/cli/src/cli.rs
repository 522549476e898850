//! Argument definitions for the `deckflow` binary.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "deckflow",
    version,
    about = "DeckFlow Durak tables from the command line"
)]
pub struct DeckflowCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deal one table and print the trump and every hand
    Deal {
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        players: Option<usize>,
        /// durak-classic, durak-throw-in or durak-transfer
        #[arg(long)]
        variant: Option<String>,
    },
    /// Play bot-only demo tables to completion
    Sim {
        #[arg(long)]
        games: Option<u64>,
        #[arg(long)]
        players: Option<usize>,
        /// Base seed; game i uses seed + i
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        variant: Option<String>,
        /// JSONL file receiving one record per finished game
        #[arg(long)]
        output: Option<String>,
    },
    /// Replay recorded games and check their integrity
    Verify {
        #[arg(long)]
        input: Option<String>,
    },
    /// Whether CARD beats TARGET under a trump suit
    Rules {
        #[arg(long)]
        trump: String,
        card: String,
        target: String,
    },
    /// Show the resolved configuration and where each value came from
    Cfg,
}
