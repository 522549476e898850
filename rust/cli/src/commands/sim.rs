//! `deckflow sim`: bot-only demo tables played to completion.
//!
//! Every game runs through a lobby [`Coordinator`] exactly like a demo room
//! with no host, so the records it writes are the ones the lobby would keep.
//! Game `i` is seeded with `seed + i`, which makes a whole run reproducible.

use std::io::Write;
use std::sync::Arc;

use deckflow_engine::logger::GameLogger;
use deckflow_engine::rules::GameVariant;
use deckflow_lobby::{
    Coordinator, EventBus, HistoryStore, LobbySettings, RoomConfig, RoomStatus, SettingsStore,
};

use crate::error::CliError;
use crate::ui;

#[derive(Debug, Clone)]
pub struct SimOptions {
    pub games: u64,
    pub players: usize,
    pub seed: Option<u64>,
    pub variant: GameVariant,
    pub bot_strategy: String,
    pub output: Option<String>,
    /// Stop after this many games, as if interrupted.
    pub break_after: Option<u64>,
}

pub fn handle_sim_command(
    opts: SimOptions,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if opts.games == 0 {
        ui::write_error(err, "games must be >= 1")?;
        return Err(CliError::InvalidInput("games must be >= 1".to_string()));
    }

    let settings = SettingsStore::with_settings(LobbySettings {
        bot_strategy: opts.bot_strategy.clone(),
        ..LobbySettings::default()
    })
    .map_err(|e| CliError::Config(e.to_string()))?;
    let lobby = Coordinator::new(
        EventBus::new(),
        Arc::new(HistoryStore::new()),
        Arc::new(settings),
    );
    let history = lobby.history();

    let mut logger = match &opts.output {
        Some(path) => Some(GameLogger::create(path).map_err(|e| {
            let _ = ui::write_error(err, &format!("Failed to open output file: {}", e));
            CliError::Io(e)
        })?),
        None => None,
    };

    let base_seed = opts.seed.unwrap_or_else(rand::random);
    let mut completed = 0u64;
    let mut unfinished = 0u64;

    for i in 0..opts.games {
        let config = RoomConfig {
            name: format!("sim-{}", i + 1),
            variant: opts.variant,
            capacity: opts.players,
            stake: None,
            demo: true,
            seed: Some(base_seed.wrapping_add(i)),
        };
        let room = lobby.create_room(config, None)?;

        if room.status == RoomStatus::Closed {
            let mut record = history
                .get_game(&room.id)
                .map_err(|e| CliError::Engine(e.to_string()))?;
            if let Some(logger) = logger.as_mut() {
                record.game_id = logger.next_id();
                logger.write(&record)?;
            }
        } else {
            unfinished += 1;
        }
        completed += 1;

        if let Some(b) = opts.break_after
            && completed == b
            && completed < opts.games
        {
            writeln!(out, "Interrupted: saved {}/{}", completed, opts.games)?;
            return Err(CliError::Interrupted(format!(
                "saved {}/{}",
                completed, opts.games
            )));
        }
    }

    if unfinished > 0 {
        ui::display_warning(
            err,
            &format!("{} game(s) hit the bot step limit and were not recorded", unfinished),
        )?;
    }
    let stats = history
        .calculate_stats()
        .map_err(|e| CliError::Engine(e.to_string()))?;
    writeln!(out, "Simulated: {} games", completed)?;
    let losses = stats
        .losses
        .iter()
        .map(|(id, n)| format!("{id}={n}"))
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(
        out,
        "Losers: {} (no loser: {})",
        if losses.is_empty() { "-" } else { losses.as_str() },
        stats.without_loser
    )?;
    Ok(())
}
