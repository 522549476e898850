//! # deckflow-ai: Bot Players for DeckFlow Tables
//!
//! Bots fill empty seats in demo rooms. They only ever pick from the legal
//! actions the engine offers, so a bot can never stall or break a game.
//!
//! ## Core Components
//!
//! - [`BotPlayer`] - Trait every bot strategy implements
//! - [`random`] - Uniformly random legal-move bot
//! - [`create_bot`] - Factory creating bots by strategy name
//!
//! ## Quick Start
//!
//! ```rust
//! use deckflow_ai::create_bot;
//! use deckflow_engine::game::{Game, GameConfig};
//! use deckflow_engine::player::Player;
//!
//! let players = vec![
//!     Player::new("bot-1", "Bot 1", true, 0, 0),
//!     Player::new("bot-2", "Bot 2", true, 1, 0),
//! ];
//! let config = GameConfig { seed: Some(7), ..Default::default() };
//! let mut game = Game::new("demo", config, players).expect("valid setup");
//!
//! let bot = create_bot("random", Some(7)).expect("known strategy");
//! let actor = game.current_actor().expect("game just started");
//! let view = game.perspective(&actor).expect("seated");
//! let action = bot.choose_action(&view).expect("a legal move exists");
//! game.apply_action(&actor, action).expect("bots only play legal moves");
//! ```

use deckflow_engine::game::PlayerPerspective;
use deckflow_engine::player::PlayerAction;
use thiserror::Error;

pub mod random;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AiError {
    #[error("Unknown bot strategy: {0}")]
    UnknownStrategy(String),
    #[error("No legal moves for player {0}")]
    NoLegalMoves(String),
    #[error("Bot failure: {0}")]
    Internal(String),
}

/// A seat controlled by the house.
///
/// Implementations must decide synchronously and must return one of
/// `view.legal_actions`.
pub trait BotPlayer: Send + Sync {
    fn choose_action(&self, view: &PlayerPerspective) -> Result<PlayerAction, AiError>;

    fn name(&self) -> &str;
}

/// Creates a bot by strategy name. A seed makes its choices reproducible.
///
/// ```rust
/// use deckflow_ai::create_bot;
///
/// let bot = create_bot("random", None).expect("known strategy");
/// assert_eq!(bot.name(), "RandomBot");
/// assert!(create_bot("genius", None).is_err());
/// ```
pub fn create_bot(strategy: &str, seed: Option<u64>) -> Result<Box<dyn BotPlayer>, AiError> {
    match strategy {
        "random" => Ok(Box::new(random::RandomBot::new(seed))),
        other => Err(AiError::UnknownStrategy(other.to_string())),
    }
}
