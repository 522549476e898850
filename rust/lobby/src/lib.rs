//! Rooms, matchmaking and table sessions for DeckFlow.
//!
//! A [`Coordinator`] owns every room. Hosts open rooms, players join, and the
//! join that fills a room starts a [`TableSession`] that drives its bot seats.
//!
//! ```rust
//! use deckflow_lobby::{Account, Coordinator, RoomConfig, RoomStatus};
//!
//! let lobby = Coordinator::default();
//! let host = Account { demo_balance: 10_000, ..Account::new("host", "Host") };
//! let config = RoomConfig { capacity: 3, demo: true, ..Default::default() };
//! let room = lobby.create_room(config, Some(&host)).expect("room");
//! assert_eq!(room.status, RoomStatus::InProgress);
//!
//! let view = lobby.view_for(&room.id, "host").expect("seated");
//! assert_eq!(view.hand.len(), view.snapshot.players[0].card_count);
//! ```
pub mod coordinator;
pub mod errors;
pub mod events;
pub mod history;
pub mod logging;
pub mod room;
pub mod session;
pub mod settings;

pub use coordinator::{Coordinator, MAX_STAKE};
pub use errors::{ErrorResponse, ErrorSeverity, IntoErrorResponse, LobbyError};
pub use events::{EventBus, EventSubscription, LobbyEvent, PlayerInfo};
pub use history::{GameFilter, GameStatistics, HistoryError, HistoryStore};
pub use logging::{init_logging, init_test_logging, LogEntry, LogFormat, TestLogSubscriber};
pub use room::{Account, Member, Room, RoomConfig, RoomId, RoomStatus, RoomSummary};
pub use session::{FinishedGame, TableSession, TurnReport};
pub use settings::{LobbySettings, SettingsError, SettingsStore};
