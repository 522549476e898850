use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::machine::Phase;
use crate::player::{PlayerAction, PlayerId};

/// The Durak rule an illegal action violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleViolation {
    CardNotInHand,
    OpeningAttackRequired,
    RankNotOnTable,
    AttackLimitReached,
    ThrowInNotAllowed,
    DefenderCannotAttack,
    NothingToDefend,
    AttackCardNotOnTable,
    AttackCardAlreadyBeaten,
    DoesNotBeat,
    TransferNotAllowed,
    TransferAfterDefense,
    TransferRankMismatch,
    TransferTargetTooFewCards,
    NothingToTake,
    CannotPassNow,
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RuleViolation::CardNotInHand => "card is not in the player's hand",
            RuleViolation::OpeningAttackRequired => "the round needs an opening attack",
            RuleViolation::RankNotOnTable => "rank is not on the table this round",
            RuleViolation::AttackLimitReached => "attack limit reached for this round",
            RuleViolation::ThrowInNotAllowed => "only the attacker may add cards in this mode",
            RuleViolation::DefenderCannotAttack => "the defender cannot attack",
            RuleViolation::NothingToDefend => "there is no unbeaten attack card",
            RuleViolation::AttackCardNotOnTable => "attack card is not on the table",
            RuleViolation::AttackCardAlreadyBeaten => "attack card is already beaten",
            RuleViolation::DoesNotBeat => "card does not beat the attack card",
            RuleViolation::TransferNotAllowed => "transfers are not allowed in this mode",
            RuleViolation::TransferAfterDefense => "cannot transfer after defending",
            RuleViolation::TransferRankMismatch => "transfer card must match the attack rank",
            RuleViolation::TransferTargetTooFewCards => {
                "next player holds too few cards to receive the transfer"
            }
            RuleViolation::NothingToTake => "there is nothing to take",
            RuleViolation::CannotPassNow => "passing is not possible now",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Illegal move {action:?} during {phase:?}: {rule}")]
    IllegalMove {
        rule: RuleViolation,
        action: PlayerAction,
        phase: Phase,
    },
    #[error("It's not {actual}'s turn (expected {expected:?}) during {phase:?}")]
    NotYourTurn {
        expected: Option<PlayerId>,
        actual: PlayerId,
        phase: Phase,
    },
    #[error("Insufficient cards: requested {requested}, remaining {remaining}")]
    InsufficientCards { requested: usize, remaining: usize },
    #[error("Unknown player: {0}")]
    UnknownPlayer(PlayerId),
    #[error("Player {0} is no longer in the game")]
    PlayerOut(PlayerId),
    #[error("Game already finished")]
    GameFinished,
    #[error("Invalid game setup: {0}")]
    InvalidSetup(String),
    #[error("Card accounting broken: {0}")]
    Internal(String),
}

impl GameError {
    /// Rejected-but-recoverable errors leave the game untouched; the caller
    /// should re-prompt the player.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GameError::IllegalMove { .. }
                | GameError::NotYourTurn { .. }
                | GameError::UnknownPlayer(_)
                | GameError::PlayerOut(_)
                | GameError::GameFinished
        )
    }
}
