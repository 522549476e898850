//! Lobby error types and their user-facing rendering.
//!
//! Every error surfaced to a player goes through [`IntoErrorResponse`], which
//! yields a serializable [`ErrorResponse`] and logs at a level matching the
//! error's [`ErrorSeverity`].
use std::fmt;

use deckflow_ai::AiError;
use deckflow_engine::errors::GameError;
use deckflow_engine::player::PlayerId;
use deckflow_engine::rules::GameVariant;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::history::HistoryError;
use crate::room::{RoomId, RoomStatus};
use crate::settings::SettingsError;

#[derive(Debug, Error)]
pub enum LobbyError {
    #[error("Room {room_id} is full ({capacity} seats)")]
    RoomFull { room_id: RoomId, capacity: usize },
    #[error("Insufficient balance: stake {required}, available {available}")]
    InsufficientBalance { required: u64, available: u64 },
    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),
    #[error("Room {room_id} is not accepting that request while {status:?}")]
    RoomNotJoinable { room_id: RoomId, status: RoomStatus },
    #[error("Player {0} is already seated")]
    AlreadySeated(PlayerId),
    #[error("Player {0} is not seated in this room")]
    NotSeated(PlayerId),
    #[error("Seat {0} is played by the house")]
    BotControlled(PlayerId),
    #[error("Invalid room configuration: {0}")]
    InvalidRoom(String),
    #[error("Variant {0} cannot be played yet")]
    UnsupportedVariant(GameVariant),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("Bot error: {0}")]
    Bot(#[from] AiError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error("Lobby storage poisoned")]
    StoragePoisoned,
}

/// Serializable error shape handed to whatever renders lobby failures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "room_full")
    pub error: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Error classification for logging levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// The player asked for something the rules or the room refuse
    Client,
    /// Unexpected, needs investigation
    Server,
    /// Shared state is unusable
    Critical,
}

pub trait IntoErrorResponse {
    fn error_code(&self) -> &'static str;

    fn error_message(&self) -> String;

    fn error_details(&self) -> Option<serde_json::Value> {
        None
    }

    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Client
    }

    fn to_error_response(&self) -> ErrorResponse {
        if let Some(details) = self.error_details() {
            ErrorResponse::with_details(self.error_code(), self.error_message(), details)
        } else {
            ErrorResponse::new(self.error_code(), self.error_message())
        }
    }

    /// Logs the error according to its severity and returns the response.
    fn log_and_respond(&self) -> ErrorResponse {
        let response = self.to_error_response();
        match self.severity() {
            ErrorSeverity::Client => {
                tracing::info!(error = %response.error, message = %response.message, "request rejected");
            }
            ErrorSeverity::Server => {
                tracing::error!(error = %response.error, message = %response.message, "lobby error");
            }
            ErrorSeverity::Critical => {
                tracing::error!(
                    error = %response.error,
                    message = %response.message,
                    critical = true,
                    "lobby state compromised"
                );
            }
        }
        response
    }
}

impl IntoErrorResponse for LobbyError {
    fn error_code(&self) -> &'static str {
        match self {
            LobbyError::RoomFull { .. } => "room_full",
            LobbyError::InsufficientBalance { .. } => "insufficient_balance",
            LobbyError::RoomNotFound(_) => "room_not_found",
            LobbyError::RoomNotJoinable { .. } => "room_not_joinable",
            LobbyError::AlreadySeated(_) => "already_seated",
            LobbyError::NotSeated(_) => "not_seated",
            LobbyError::BotControlled(_) => "bot_controlled",
            LobbyError::InvalidRoom(_) => "invalid_room",
            LobbyError::UnsupportedVariant(_) => "unsupported_variant",
            LobbyError::Game(GameError::IllegalMove { .. }) => "illegal_move",
            LobbyError::Game(GameError::NotYourTurn { .. }) => "not_your_turn",
            LobbyError::Game(GameError::GameFinished) => "game_finished",
            LobbyError::Game(GameError::UnknownPlayer(_) | GameError::PlayerOut(_)) => {
                "player_not_in_game"
            }
            LobbyError::Game(_) => "game_error",
            LobbyError::Bot(_) => "bot_error",
            LobbyError::Settings(_) => "settings_error",
            LobbyError::History(HistoryError::NotFound(_)) => "game_not_found",
            LobbyError::History(_) => "history_error",
            LobbyError::StoragePoisoned => "storage_error",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            LobbyError::RoomFull { room_id, capacity } => {
                Some(json!({ "room_id": room_id, "capacity": capacity }))
            }
            LobbyError::InsufficientBalance {
                required,
                available,
            } => Some(json!({ "required": required, "available": available })),
            LobbyError::Game(GameError::IllegalMove {
                rule,
                action,
                phase,
            }) => Some(json!({ "rule": rule, "action": action, "phase": phase })),
            LobbyError::Game(GameError::NotYourTurn {
                expected, phase, ..
            }) => Some(json!({ "expected": expected, "phase": phase })),
            _ => None,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            LobbyError::StoragePoisoned | LobbyError::History(HistoryError::StoragePoisoned) => {
                ErrorSeverity::Critical
            }
            LobbyError::Game(e) if !e.is_recoverable() => ErrorSeverity::Critical,
            LobbyError::Bot(_) | LobbyError::Settings(SettingsError::StoragePoisoned) => {
                ErrorSeverity::Server
            }
            _ => ErrorSeverity::Client,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckflow_engine::cards::{Card, Rank, Suit};
    use deckflow_engine::errors::RuleViolation;
    use deckflow_engine::machine::Phase;
    use deckflow_engine::player::PlayerAction;

    #[test]
    fn room_full_carries_details() {
        let err = LobbyError::RoomFull {
            room_id: "r1".into(),
            capacity: 4,
        };
        let resp = err.to_error_response();
        assert_eq!(resp.error, "room_full");
        assert_eq!(resp.details, Some(json!({ "room_id": "r1", "capacity": 4 })));
        assert_eq!(err.severity(), ErrorSeverity::Client);
    }

    #[test]
    fn illegal_move_is_recoverable_client_error() {
        let err = LobbyError::from(GameError::IllegalMove {
            rule: RuleViolation::DoesNotBeat,
            action: PlayerAction::Defend {
                attack: Card::new(Rank::Six, Suit::Spades),
                card: Card::new(Rank::Seven, Suit::Diamonds),
            },
            phase: Phase::Defend,
        });
        assert_eq!(err.error_code(), "illegal_move");
        assert_eq!(err.severity(), ErrorSeverity::Client);
        let details = err.error_details().expect("details");
        assert_eq!(details["rule"], "does_not_beat");
        assert_eq!(details["phase"], "defend");
    }

    #[test]
    fn dealing_bugs_are_critical() {
        let err = LobbyError::from(GameError::InsufficientCards {
            requested: 6,
            remaining: 2,
        });
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(LobbyError::StoragePoisoned.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn response_serialization_skips_empty_details() {
        let resp = LobbyError::RoomNotFound("x".into()).to_error_response();
        let text = serde_json::to_string(&resp).expect("serialize");
        assert!(!text.contains("details"));
        assert_eq!(resp.to_string(), "room_not_found: Room not found: x");
    }
}
