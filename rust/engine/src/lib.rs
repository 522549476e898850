//! # deckflow-engine: Durak Rules and Turn Engine
//!
//! A deterministic, synchronous card-game core. It deals the 36-card deck,
//! answers rule questions, sequences player actions through a turn state
//! machine and exposes public snapshots for any front end.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and the card universes
//! - [`deck`] - Seeded Fisher-Yates shuffle and functional dealing
//! - [`rules`] - Durak legality predicates and game variants
//! - [`hand`] - Poker hand ranking for the Hold'em and Omaha variants
//! - [`table`] - Attack/defence pairs and the discard pile
//! - [`machine`] - Turn state machine
//! - [`game`] - Game session: action application, snapshots, settlement
//! - [`player`] - Players and their actions
//! - [`settlement`] - Stake redistribution at game end
//! - [`logger`] - GameRecord serialization to JSONL
//! - [`errors`] - Error types for game operations
//!
//! ## Quick Start
//!
//! ```rust
//! use deckflow_engine::game::{Game, GameConfig};
//! use deckflow_engine::player::{Player, PlayerAction};
//!
//! let players = vec![
//!     Player::new("alice", "Alice", false, 0, 1_000),
//!     Player::new("bob", "Bob", false, 1, 1_000),
//! ];
//! let config = GameConfig { seed: Some(42), ..Default::default() };
//! let mut game = Game::new("demo", config, players).expect("valid setup");
//!
//! let attacker = game.current_actor().expect("someone attacks first");
//! let opening = game.legal_actions(&attacker).expect("seated")[0].clone();
//! assert!(matches!(opening, PlayerAction::Attack { .. }));
//!
//! let snapshot = game.apply_action(&attacker, opening).expect("legal");
//! assert_eq!(snapshot.attack_cards.len(), 1);
//! ```
//!
//! ## Deterministic Gameplay
//!
//! ```rust
//! use deckflow_engine::deck::Deck;
//!
//! let deck1 = Deck::new_with_seed(42);
//! let deck2 = Deck::new_with_seed(42);
//! assert_eq!(deck1, deck2);
//! ```

pub mod cards;
pub mod deck;
pub mod errors;
pub mod game;
pub mod hand;
pub mod logger;
pub mod machine;
pub mod player;
pub mod rules;
pub mod settlement;
pub mod table;
