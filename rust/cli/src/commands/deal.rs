//! `deckflow deal`: deal one table and show what every seat holds.

use std::io::Write;

use deckflow_engine::game::{Game, GameConfig};
use deckflow_engine::player::Player;
use deckflow_engine::rules::GameVariant;

use crate::error::CliError;
use crate::ui::format_cards;

/// Deals a `players`-seat table of `variant` and prints seed, trump, the
/// opening attacker and each hand. The same seed always prints the same deal.
pub fn handle_deal_command(
    seed: Option<u64>,
    players: usize,
    variant: GameVariant,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let GameVariant::Durak(mode) = variant else {
        return Err(CliError::InvalidInput(format!(
            "{variant} tables cannot be dealt"
        )));
    };
    let base_seed = seed.unwrap_or_else(rand::random);
    let seats = (0..players)
        .map(|seat| {
            Player::new(
                format!("p{}", seat + 1),
                format!("Player {}", seat + 1),
                false,
                seat,
                0,
            )
        })
        .collect();
    let config = GameConfig {
        mode,
        stake: 0,
        seed: Some(base_seed),
    };
    let game = Game::new("deal", config, seats)?;
    let snap = game.snapshot();

    writeln!(out, "Seed: {}", base_seed)?;
    writeln!(out, "Variant: {}", variant)?;
    if let Some(trump) = snap.trump_card {
        writeln!(out, "Trump: {}", trump)?;
    }
    writeln!(out, "Deck: {}", snap.deck_count)?;
    writeln!(out, "Attacker: {}", snap.attacker_id)?;
    for p in &snap.players {
        let hand = game.hand_of(&p.id)?;
        writeln!(out, "{}: {}", p.id.to_uppercase(), format_cards(&hand))?;
    }
    Ok(())
}
