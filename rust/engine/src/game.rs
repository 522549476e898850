use serde::{Deserialize, Serialize};

use crate::cards::{Card, Suit};
use crate::deck::Deck;
use crate::errors::GameError;
use crate::logger::{ActionRecord, GameRecord, SeatRecord};
use crate::machine::{Phase, TurnEvent, TurnMachine};
use crate::player::{Player, PlayerAction, PlayerId, PlayerStatus};
use crate::rules::{DurakMode, GameVariant};
use crate::settlement::Settlement;

/// Per-game settings fixed at session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub mode: DurakMode,
    pub stake: u64,
    /// Deck seed; `None` draws one at random.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            mode: DurakMode::Classic,
            stake: 0,
            seed: None,
        }
    }
}

/// Public information about one seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub card_count: usize,
    pub is_bot: bool,
    pub seat: usize,
    pub status: PlayerStatus,
}

/// Immutable public view of a game. Never contains hand contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub game_id: String,
    pub mode: DurakMode,
    pub phase: Phase,
    pub trump: Suit,
    /// The face-up bottom card while it is still in the deck
    pub trump_card: Option<Card>,
    pub deck_count: usize,
    pub attack_cards: Vec<Card>,
    pub defense_cards: Vec<Option<Card>>,
    pub discard_count: usize,
    pub attacker_id: PlayerId,
    pub defender_id: PlayerId,
    pub current_actor_id: Option<PlayerId>,
    pub players: Vec<PlayerView>,
    /// Always `None` in Durak: everyone except the loser is a co-equal winner.
    pub winner_id: Option<PlayerId>,
    pub loser_id: Option<PlayerId>,
    pub move_count: usize,
}

/// What one player is allowed to see and do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerPerspective {
    pub player_id: PlayerId,
    pub snapshot: SessionSnapshot,
    pub hand: Vec<Card>,
    pub legal_actions: Vec<PlayerAction>,
}

/// One table's authoritative state: the turn machine plus bookkeeping.
///
/// Callers serialise access; `Game` itself is plain data.
#[derive(Debug, Clone)]
pub struct Game {
    id: String,
    config: GameConfig,
    seed: Option<u64>,
    initial_deck: Vec<Card>,
    machine: TurnMachine,
    history: Vec<ActionRecord>,
    last_events: Vec<TurnEvent>,
}

impl Game {
    /// Starts a game on a freshly shuffled deck.
    pub fn new(
        id: impl Into<String>,
        config: GameConfig,
        players: Vec<Player>,
    ) -> Result<Self, GameError> {
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut game = Self::with_deck(id, config, Deck::new_with_seed(seed), players)?;
        game.seed = Some(seed);
        Ok(game)
    }

    /// Starts a game on an explicit deck order.
    pub fn with_deck(
        id: impl Into<String>,
        config: GameConfig,
        deck: Deck,
        players: Vec<Player>,
    ) -> Result<Self, GameError> {
        let initial_deck = deck.cards().to_vec();
        let machine = TurnMachine::new(config.mode, deck, players)?;
        let id = id.into();
        tracing::info!(
            game_id = %id,
            mode = ?config.mode,
            players = machine.players().len(),
            trump = %machine.trump_card(),
            "game started"
        );
        Ok(Self {
            id,
            config,
            seed: config.seed,
            initial_deck,
            machine,
            history: Vec::new(),
            last_events: Vec::new(),
        })
    }

    /// Rebuilds a game from its record by replaying every action.
    pub fn replay(record: &GameRecord) -> Result<Self, GameError> {
        let mode = match record.variant {
            GameVariant::Durak(mode) => mode,
            GameVariant::Poker(_) => {
                return Err(GameError::InvalidSetup(
                    "poker records cannot be replayed".into(),
                ))
            }
        };
        let players = record
            .players
            .iter()
            .enumerate()
            .map(|(seat, s)| Player::new(s.id.clone(), s.name.clone(), s.is_bot, seat, 0))
            .collect();
        let config = GameConfig {
            mode,
            stake: record.stake,
            seed: record.seed,
        };
        let deck = Deck::from_cards(record.initial_deck.clone())?;
        let mut game = Self::with_deck(record.game_id.clone(), config, deck, players)?;
        for a in &record.actions {
            game.apply_action(&a.player_id, a.action.clone())?;
        }
        Ok(game)
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn config(&self) -> &GameConfig {
        &self.config
    }
    pub fn machine(&self) -> &TurnMachine {
        &self.machine
    }
    pub fn history(&self) -> &[ActionRecord] {
        &self.history
    }
    /// Events produced by the most recent accepted action.
    pub fn last_events(&self) -> &[TurnEvent] {
        &self.last_events
    }
    pub fn is_finished(&self) -> bool {
        self.machine.is_finished()
    }

    /// Validates and applies `action` for `player_id`.
    ///
    /// On error the game is unchanged and stays usable.
    pub fn apply_action(
        &mut self,
        player_id: &str,
        action: PlayerAction,
    ) -> Result<SessionSnapshot, GameError> {
        let seat = self.seat(player_id)?;
        let phase = self.machine.phase();
        match self.machine.apply(seat, action.clone()) {
            Ok(events) => {
                self.history.push(ActionRecord {
                    seq: self.history.len() as u32 + 1,
                    player_id: player_id.to_string(),
                    phase,
                    action,
                });
                self.last_events = events;
                Ok(self.snapshot())
            }
            Err(e) => {
                tracing::warn!(game_id = %self.id, player_id, error = %e, "action rejected");
                Err(e)
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let m = &self.machine;
        let id_at = |seat: usize| m.players()[seat].id().clone();
        SessionSnapshot {
            game_id: self.id.clone(),
            mode: m.mode(),
            phase: m.phase(),
            trump: m.trump(),
            trump_card: m.deck().bottom(),
            deck_count: m.deck().remaining(),
            attack_cards: m.table().attack_cards(),
            defense_cards: m.table().defense_cards(),
            discard_count: m.table().discard_pile().len(),
            attacker_id: id_at(m.attacker()),
            defender_id: id_at(m.defender()),
            current_actor_id: m.current_actor().map(id_at),
            players: m
                .players()
                .iter()
                .map(|p| PlayerView {
                    id: p.id().clone(),
                    name: p.display_name().to_string(),
                    card_count: p.card_count(),
                    is_bot: p.is_bot(),
                    seat: p.seat(),
                    status: p.status(),
                })
                .collect(),
            winner_id: None,
            loser_id: m.loser().map(id_at),
            move_count: self.history.len(),
        }
    }

    pub fn hand_of(&self, player_id: &str) -> Result<Vec<Card>, GameError> {
        let seat = self.seat(player_id)?;
        Ok(self.machine.players()[seat].hand().to_vec())
    }

    pub fn legal_actions(&self, player_id: &str) -> Result<Vec<PlayerAction>, GameError> {
        let seat = self.seat(player_id)?;
        Ok(self.machine.legal_actions(seat))
    }

    pub fn perspective(&self, player_id: &str) -> Result<PlayerPerspective, GameError> {
        Ok(PlayerPerspective {
            player_id: player_id.to_string(),
            snapshot: self.snapshot(),
            hand: self.hand_of(player_id)?,
            legal_actions: self.legal_actions(player_id)?,
        })
    }

    pub fn current_actor(&self) -> Option<PlayerId> {
        self.machine
            .current_actor()
            .map(|s| self.machine.players()[s].id().clone())
    }

    pub fn loser(&self) -> Option<PlayerId> {
        self.machine
            .loser()
            .map(|s| self.machine.players()[s].id().clone())
    }

    /// Stake deltas, available once the game is finished.
    pub fn settlement(&self) -> Option<Settlement> {
        self.is_finished().then(|| {
            Settlement::compute(
                self.machine.players(),
                self.machine.loser(),
                self.config.stake,
            )
        })
    }

    pub fn record(&self) -> GameRecord {
        GameRecord {
            game_id: self.id.clone(),
            seed: self.seed,
            variant: GameVariant::Durak(self.config.mode),
            stake: self.config.stake,
            players: self
                .machine
                .players()
                .iter()
                .map(|p| SeatRecord {
                    id: p.id().clone(),
                    name: p.display_name().to_string(),
                    is_bot: p.is_bot(),
                })
                .collect(),
            initial_deck: self.initial_deck.clone(),
            trump_card: self.machine.trump_card(),
            actions: self.history.clone(),
            loser: self.loser(),
            settlement: self.settlement(),
            ts: None,
            meta: None,
        }
    }

    fn seat(&self, player_id: &str) -> Result<usize, GameError> {
        self.machine
            .seat_of(player_id)
            .ok_or_else(|| GameError::UnknownPlayer(player_id.to_string()))
    }
}
