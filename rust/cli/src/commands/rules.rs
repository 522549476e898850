//! `deckflow rules`: answer a single beating question.

use std::io::Write;

use deckflow_engine::cards::{Card, Suit};
use deckflow_engine::rules::beats;

use crate::error::CliError;

/// Prints whether `card` beats `target` when `trump` is trumps.
///
/// Output reads `7d beats 6s (trump Hearts): no`.
pub fn handle_rules_command(
    trump: &str,
    card: &str,
    target: &str,
    out: &mut dyn Write,
) -> Result<bool, CliError> {
    let trump: Suit = trump.parse().map_err(CliError::InvalidInput)?;
    let card: Card = card.parse().map_err(CliError::InvalidInput)?;
    let target: Card = target.parse().map_err(CliError::InvalidInput)?;
    let verdict = beats(card, target, trump);
    writeln!(
        out,
        "{} beats {} (trump {:?}): {}",
        card,
        target,
        trump,
        if verdict { "yes" } else { "no" }
    )?;
    Ok(verdict)
}
