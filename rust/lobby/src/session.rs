use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use deckflow_ai::{create_bot, BotPlayer};
use deckflow_engine::game::{Game, GameConfig, PlayerPerspective, SessionSnapshot};
use deckflow_engine::logger::GameRecord;
use deckflow_engine::machine::TurnEvent;
use deckflow_engine::player::{Player, PlayerAction, PlayerId};
use deckflow_engine::settlement::Settlement;

use crate::errors::LobbyError;
use crate::room::RoomId;

/// Result of one accepted request, including every bot move it triggered.
#[derive(Debug, Clone)]
pub struct TurnReport {
    pub snapshot: SessionSnapshot,
    /// Engine events in the order they happened
    pub events: Vec<TurnEvent>,
    /// Set only by the request that ended the game
    pub finished: Option<FinishedGame>,
}

#[derive(Debug, Clone)]
pub struct FinishedGame {
    pub loser_id: Option<PlayerId>,
    pub settlement: Settlement,
    pub record: GameRecord,
}

/// The single authoritative game of one table.
///
/// Actions are applied one at a time under the game mutex. After each human
/// action the house seats answer synchronously until a human is due or the
/// game ends.
pub struct TableSession {
    room_id: RoomId,
    game: Mutex<Game>,
    bots: HashMap<PlayerId, Box<dyn BotPlayer>>,
    max_bot_steps: usize,
}

impl TableSession {
    pub fn start(
        room_id: RoomId,
        config: GameConfig,
        players: Vec<Player>,
        bot_strategy: &str,
        max_bot_steps: usize,
    ) -> Result<Self, LobbyError> {
        let mut bots = HashMap::new();
        for p in players.iter().filter(|p| p.is_bot()) {
            // distinct but reproducible bot streams for seeded tables
            let seed = config.seed.map(|s| s.wrapping_add(p.seat() as u64 + 1));
            bots.insert(p.id().clone(), create_bot(bot_strategy, seed)?);
        }
        let game = Game::new(room_id.clone(), config, players)?;
        Ok(Self {
            room_id,
            game: Mutex::new(game),
            bots,
            max_bot_steps,
        })
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn is_bot(&self, player_id: &str) -> bool {
        self.bots.contains_key(player_id)
    }

    /// Applies a player's action, then lets the bots respond.
    pub fn apply(&self, player_id: &str, action: PlayerAction) -> Result<TurnReport, LobbyError> {
        let mut game = self.lock()?;
        let was_finished = game.is_finished();
        game.apply_action(player_id, action)?;
        let mut events = game.last_events().to_vec();
        self.drive_bots(&mut game, &mut events)?;
        Ok(Self::report(&game, events, was_finished))
    }

    /// Lets the bots act if one of them is due. Used right after start.
    pub fn run_bots(&self) -> Result<TurnReport, LobbyError> {
        let mut game = self.lock()?;
        let was_finished = game.is_finished();
        let mut events = Vec::new();
        self.drive_bots(&mut game, &mut events)?;
        Ok(Self::report(&game, events, was_finished))
    }

    pub fn snapshot(&self) -> Result<SessionSnapshot, LobbyError> {
        Ok(self.lock()?.snapshot())
    }

    pub fn perspective(&self, player_id: &str) -> Result<PlayerPerspective, LobbyError> {
        Ok(self.lock()?.perspective(player_id)?)
    }

    pub fn record(&self) -> Result<GameRecord, LobbyError> {
        Ok(self.lock()?.record())
    }

    pub fn is_finished(&self) -> Result<bool, LobbyError> {
        Ok(self.lock()?.is_finished())
    }

    fn drive_bots(&self, game: &mut Game, events: &mut Vec<TurnEvent>) -> Result<(), LobbyError> {
        let mut steps = 0;
        while let Some(actor) = game.current_actor() {
            let Some(bot) = self.bots.get(&actor) else {
                break;
            };
            if steps >= self.max_bot_steps {
                tracing::warn!(
                    room_id = %self.room_id,
                    steps,
                    "bot step limit reached; waiting for the next request"
                );
                break;
            }
            let view = game.perspective(&actor)?;
            let action = bot.choose_action(&view)?;
            tracing::trace!(room_id = %self.room_id, bot = %actor, action = action.kind(), "bot move");
            game.apply_action(&actor, action)?;
            events.extend_from_slice(game.last_events());
            steps += 1;
        }
        Ok(())
    }

    fn report(game: &Game, events: Vec<TurnEvent>, was_finished: bool) -> TurnReport {
        let finished = (!was_finished && game.is_finished()).then(|| FinishedGame {
            loser_id: game.loser(),
            settlement: game.settlement().unwrap_or_default(),
            record: game.record(),
        });
        TurnReport {
            snapshot: game.snapshot(),
            events,
            finished,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Game>, LobbyError> {
        self.game.lock().map_err(|_| LobbyError::StoragePoisoned)
    }
}

impl std::fmt::Debug for TableSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableSession")
            .field("room_id", &self.room_id)
            .field("bots", &self.bots.keys().collect::<Vec<_>>())
            .finish()
    }
}
