//! # DeckFlow CLI Library
//!
//! Command-line access to the DeckFlow Durak engine and lobby. The binary is
//! a thin wrapper around [`run`], which parses arguments, resolves the
//! configuration and dispatches to one handler per subcommand.
//!
//! ## Available Subcommands
//!
//! - `deal`: Deal one table and print the trump and every hand
//! - `sim`: Play bot-only demo tables and write their records as JSONL
//! - `verify`: Replay recorded games and check their integrity
//! - `rules`: Ask whether one card beats another
//! - `cfg`: Display the resolved configuration and its sources
//!
//! Values left off the command line come from the configuration: defaults,
//! then the TOML file named by `DECKFLOW_CONFIG`, then `DECKFLOW_SEED`,
//! `DECKFLOW_PLAYERS`, `DECKFLOW_VARIANT` and `DECKFLOW_BOT`.

use std::io::Write;

use clap::Parser;

#[macro_use]
mod macros;

pub mod cli;
mod commands;
mod config;
mod error;
pub mod exit_code;
pub mod io_utils;
pub mod ui;

use cli::{Commands, DeckflowCli};
use commands::{
    handle_deal_command, handle_rules_command, handle_sim_command, handle_verify_command,
    SimOptions,
};
use deckflow_engine::rules::GameVariant;

pub use error::{BatchValidationError, CliError};

const COMMANDS: &[&str] = &["deal", "sim", "verify", "rules", "cfg"];

/// Parses `args` and runs the subcommand.
///
/// Returns the process exit code: [`exit_code::SUCCESS`],
/// [`exit_code::ERROR`] or [`exit_code::INTERRUPTED`].
///
/// ```
/// use std::io;
/// let args = vec!["deckflow", "deal", "--seed", "42"];
/// let code = deckflow_cli::run(args, &mut io::stdout(), &mut io::stderr());
/// assert_eq!(code, 0);
/// ```
///
/// `DECKFLOW_SIM_BREAK_AFTER=N` stops `sim` after `N` games with exit code 130.
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match DeckflowCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;

            // help and version go to stdout
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                if write!(out, "{}", e).is_err() {
                    return exit_code::ERROR;
                }
                return exit_code::SUCCESS;
            }
            write_or_exit!(err, "{}", e);
            write_or_exit!(err, "Usage: deckflow <command> [options]\n");
            write_or_exit!(err, "Commands:");
            for c in COMMANDS {
                write_or_exit!(err, "  {}", c);
            }
            return exit_code::ERROR;
        }
    };

    let result = match cli.cmd {
        Commands::Deal {
            seed,
            players,
            variant,
        } => run_deal(seed, players, variant, out),
        Commands::Sim {
            games,
            players,
            seed,
            variant,
            output,
        } => run_sim(games, players, seed, variant, output, out, err),
        Commands::Verify { input } => match input {
            Some(path) => handle_verify_command(&path, out, err),
            None => Err(CliError::InvalidInput("--input is required".into())),
        },
        Commands::Rules {
            trump,
            card,
            target,
        } => handle_rules_command(&trump, &card, &target, out).map(|_| ()),
        Commands::Cfg => commands::cfg::load_and_print(out),
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(CliError::Interrupted(_)) => exit_code::INTERRUPTED,
        Err(e) => {
            if ui::write_error(err, &e.to_string()).is_err() {
                return exit_code::ERROR;
            }
            exit_code::ERROR
        }
    }
}

fn run_deal(
    seed: Option<u64>,
    players: Option<usize>,
    variant: Option<String>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let cfg = config::load_with_sources()?.config;
    handle_deal_command(
        seed.or(cfg.seed),
        players.unwrap_or(cfg.players),
        resolve_variant(variant, cfg.variant)?,
        out,
    )
}

fn run_sim(
    games: Option<u64>,
    players: Option<usize>,
    seed: Option<u64>,
    variant: Option<String>,
    output: Option<String>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let cfg = config::load_with_sources()?.config;
    let break_after = std::env::var("DECKFLOW_SIM_BREAK_AFTER")
        .ok()
        .and_then(|v| v.parse::<u64>().ok());
    let opts = SimOptions {
        games: games.unwrap_or(cfg.games),
        players: players.unwrap_or(cfg.players),
        seed: seed.or(cfg.seed),
        variant: resolve_variant(variant, cfg.variant)?,
        bot_strategy: cfg.bot_strategy,
        output,
        break_after,
    };
    handle_sim_command(opts, out, err)
}

fn resolve_variant(flag: Option<String>, fallback: GameVariant) -> Result<GameVariant, CliError> {
    match flag {
        Some(v) => v.parse().map_err(CliError::InvalidInput),
        None => Ok(fallback),
    }
}
