//! `deckflow verify`: replay recorded games and check they hold together.
//!
//! Each JSONL line must parse as a [`GameRecord`] and replay cleanly from
//! its initial deck. After the replay the record has to agree with the game:
//! same trump, same loser, same settlement, and the settlement sums to zero.

use std::collections::HashSet;
use std::io::Write;

use deckflow_engine::cards::{full_deck, Card, DURAK_DECK_SIZE};
use deckflow_engine::game::Game;
use deckflow_engine::logger::GameRecord;

use crate::error::{BatchValidationError, CliError};
use crate::io_utils::{read_text, record_lines};

type VerifyError = BatchValidationError<usize>;

pub fn handle_verify_command(
    input: &str,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let content = read_text(input).map_err(CliError::InvalidInput)?;
    let mut errors: Vec<VerifyError> = Vec::new();
    let mut seen_ids = HashSet::new();
    let mut games = 0usize;

    for (line_no, line) in record_lines(&content) {
        games += 1;
        let record: GameRecord = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                errors.push(VerifyError {
                    item_context: line_no,
                    message: format!("Invalid record: {}", e),
                });
                continue;
            }
        };
        if !seen_ids.insert(record.game_id.clone()) {
            errors.push(VerifyError {
                item_context: line_no,
                message: format!("Duplicate game_id {}", record.game_id),
            });
        }
        for message in check_record(&record) {
            errors.push(VerifyError {
                item_context: line_no,
                message,
            });
        }
    }

    if games == 0 {
        errors.push(VerifyError {
            item_context: 0,
            message: "No game records found".to_string(),
        });
    }

    if errors.is_empty() {
        writeln!(out, "Verify: OK (games={})", games)?;
        Ok(())
    } else {
        writeln!(out, "Verify: FAIL (games={})", games)?;
        writeln!(err, "Errors found:")?;
        for error in &errors {
            writeln!(err, "  Line {}", error)?;
        }
        Err(CliError::InvalidInput(format!(
            "{} validation errors found",
            errors.len()
        )))
    }
}

/// Every problem found in one record; empty when it verifies.
fn check_record(record: &GameRecord) -> Vec<String> {
    let mut problems = Vec::new();

    if !valid_game_id(&record.game_id) {
        problems.push(format!("Malformed game_id {}", record.game_id));
    }
    if let Some(ts) = &record.ts
        && chrono::DateTime::parse_from_rfc3339(ts).is_err()
    {
        problems.push(format!("Timestamp is not RFC3339: {}", ts));
    }
    if let Some(problem) = deck_problem(&record.initial_deck) {
        // nothing below can be replayed without a sound deck
        problems.push(problem);
        return problems;
    }

    let game = match Game::replay(record) {
        Ok(g) => g,
        Err(e) => {
            problems.push(format!("Replay failed: {}", e));
            return problems;
        }
    };
    if let Err(e) = game.machine().check_invariants() {
        problems.push(format!("Card conservation broken: {}", e));
    }
    if game.machine().trump_card() != record.trump_card {
        problems.push(format!(
            "Trump card {} does not match the deck's {}",
            record.trump_card,
            game.machine().trump_card()
        ));
    }
    if !game.is_finished() {
        problems.push("Record ends before the game finished".to_string());
        return problems;
    }
    if game.loser() != record.loser {
        problems.push(format!(
            "Recorded loser {:?} but the replay ends with {:?}",
            record.loser,
            game.loser()
        ));
    }
    match &record.settlement {
        None => problems.push("Missing settlement".to_string()),
        Some(settlement) => {
            if settlement.total() != 0 {
                problems.push(format!(
                    "Settlement does not sum to zero ({})",
                    settlement.total()
                ));
            }
            if game.settlement().as_ref() != Some(settlement) {
                problems.push("Settlement differs from the replayed result".to_string());
            }
        }
    }
    problems
}

fn deck_problem(deck: &[Card]) -> Option<String> {
    let unique: HashSet<Card> = deck.iter().copied().collect();
    let universe: HashSet<Card> = full_deck().into_iter().collect();
    if deck.len() != DURAK_DECK_SIZE {
        Some(format!(
            "Initial deck holds {} cards, expected {}",
            deck.len(),
            DURAK_DECK_SIZE
        ))
    } else if unique != universe {
        Some(format!(
            "Initial deck is not the Durak deck ({} distinct cards)",
            unique.len()
        ))
    } else {
        None
    }
}

/// `YYYYMMDD-NNNNNN`
fn valid_game_id(s: &str) -> bool {
    s.len() == 15
        && s.is_ascii()
        && s[0..8].chars().all(|c| c.is_ascii_digit())
        && &s[8..9] == "-"
        && s[9..].chars().all(|c| c.is_ascii_digit())
}
