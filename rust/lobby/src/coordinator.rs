use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use deckflow_engine::game::{GameConfig, PlayerPerspective, SessionSnapshot};
use deckflow_engine::machine::{TurnEvent, MAX_PLAYERS, MIN_PLAYERS};
use deckflow_engine::player::{PlayerAction, PlayerId};
use deckflow_engine::rules::GameVariant;
use uuid::Uuid;

use crate::errors::LobbyError;
use crate::events::{EventBus, LobbyEvent, PlayerInfo};
use crate::history::HistoryStore;
use crate::room::{Account, Member, Room, RoomConfig, RoomId, RoomStatus, RoomSummary};
use crate::session::{TableSession, TurnReport};
use crate::settings::SettingsStore;

/// Largest stake whose pot still fits in a settlement delta at a full table.
pub const MAX_STAKE: u64 = i64::MAX as u64 / MAX_PLAYERS as u64;

/// A room and, once it is full, the game played in it.
///
/// Lock order is `room` before `session`; the game mutex inside the session
/// is never held while `room` is being acquired.
#[derive(Debug)]
struct RoomHandle {
    room: Mutex<Room>,
    session: RwLock<Option<Arc<TableSession>>>,
}

impl RoomHandle {
    fn room(&self) -> Result<MutexGuard<'_, Room>, LobbyError> {
        self.room.lock().map_err(|_| LobbyError::StoragePoisoned)
    }

    fn session(&self) -> Result<Option<Arc<TableSession>>, LobbyError> {
        self.session
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| LobbyError::StoragePoisoned)
    }
}

/// Waiting rooms, seat filling and game start.
///
/// Independent rooms share nothing mutable; joins to one room are serialized
/// by that room's mutex and actions by its session's game mutex.
#[derive(Debug, Clone)]
pub struct Coordinator {
    rooms: Arc<RwLock<HashMap<RoomId, Arc<RoomHandle>>>>,
    event_bus: EventBus,
    history: Arc<HistoryStore>,
    settings: Arc<SettingsStore>,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new(
            EventBus::new(),
            Arc::new(HistoryStore::new()),
            Arc::new(SettingsStore::new()),
        )
    }
}

impl Coordinator {
    pub fn new(
        event_bus: EventBus,
        history: Arc<HistoryStore>,
        settings: Arc<SettingsStore>,
    ) -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            event_bus,
            history,
            settings,
        }
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn history(&self) -> Arc<HistoryStore> {
        Arc::clone(&self.history)
    }

    pub fn settings(&self) -> Arc<SettingsStore> {
        Arc::clone(&self.settings)
    }

    /// Opens a room, seating `host` first when given.
    ///
    /// Demo rooms get every remaining seat filled with bots right away, so a
    /// demo room with a host starts immediately.
    pub fn create_room(
        &self,
        config: RoomConfig,
        host: Option<&Account>,
    ) -> Result<RoomSummary, LobbyError> {
        let settings = self.settings.get()?;
        if !config.variant.is_durak() {
            return Err(LobbyError::UnsupportedVariant(config.variant));
        }
        let lo = settings.min_capacity.max(MIN_PLAYERS);
        let hi = settings.max_capacity.min(MAX_PLAYERS);
        if !(lo..=hi).contains(&config.capacity) {
            return Err(LobbyError::InvalidRoom(format!(
                "capacity {} outside {lo}..={hi}",
                config.capacity
            )));
        }
        if config.name.trim().is_empty() {
            return Err(LobbyError::InvalidRoom("room name cannot be empty".into()));
        }

        let stake = config.stake.unwrap_or(settings.default_stake);
        if stake > MAX_STAKE {
            return Err(LobbyError::InvalidRoom(format!(
                "stake {stake} exceeds {MAX_STAKE}"
            )));
        }

        let id: RoomId = Uuid::new_v4().to_string();
        let mut room = Room::new(id.clone(), config, stake);
        if let Some(host) = host {
            room.seat(host)?;
        }
        if room.is_demo() {
            let mut n = 0;
            while !room.is_full() {
                n += 1;
                let bot = Member::bot(format!("bot-{n}"), stake.max(settings.demo_refill_floor));
                if room.is_seated(&bot.id) {
                    continue;
                }
                room.seat_bot(bot)?;
            }
        }

        let handle = Arc::new(RoomHandle {
            room: Mutex::new(room),
            session: RwLock::new(None),
        });
        // locked before the room becomes visible to joins
        let mut room = handle.room()?;
        self.rooms
            .write()
            .map_err(|_| LobbyError::StoragePoisoned)?
            .insert(id.clone(), Arc::clone(&handle));

        tracing::info!(
            room_id = %id,
            variant = %room.variant(),
            capacity = room.capacity(),
            stake,
            demo = room.is_demo(),
            "room created"
        );
        self.event_bus.broadcast(
            &id,
            LobbyEvent::RoomCreated {
                room: room.summary(),
            },
        );
        for m in room.members() {
            self.event_bus.broadcast(
                &id,
                LobbyEvent::PlayerJoined {
                    room_id: id.clone(),
                    player_id: m.id.clone(),
                    is_bot: m.is_bot,
                },
            );
        }
        if room.is_full() {
            self.start(&handle, &mut room)?;
        }
        Ok(room.summary())
    }

    /// Seats `account`; the join that fills the room starts the game.
    pub fn join_room(&self, room_id: &str, account: &Account) -> Result<RoomSummary, LobbyError> {
        let handle = self.handle(room_id)?;
        let mut room = handle.room()?;
        room.seat(account)?;
        tracing::info!(
            room_id,
            player_id = %account.id,
            seated = room.members().len(),
            capacity = room.capacity(),
            "player joined"
        );
        self.event_bus.broadcast(
            room.id(),
            LobbyEvent::PlayerJoined {
                room_id: room.id().clone(),
                player_id: account.id.clone(),
                is_bot: false,
            },
        );
        if room.is_full() {
            self.start(&handle, &mut room)?;
        }
        Ok(room.summary())
    }

    /// Leaves a waiting room, or forfeits once the game is running.
    pub fn leave_room(&self, room_id: &str, player_id: &str) -> Result<RoomSummary, LobbyError> {
        let handle = self.handle(room_id)?;
        {
            let mut room = handle.room()?;
            match room.status() {
                RoomStatus::Waiting => {
                    room.remove(player_id)?;
                    tracing::info!(room_id, player_id, "player left");
                    self.event_bus.broadcast(
                        room.id(),
                        LobbyEvent::PlayerLeft {
                            room_id: room.id().clone(),
                            player_id: player_id.to_string(),
                        },
                    );
                    if !room.has_humans() {
                        self.close(&mut room);
                    }
                    return Ok(room.summary());
                }
                RoomStatus::Closed => {
                    return Err(LobbyError::RoomNotJoinable {
                        room_id: room.id().clone(),
                        status: room.status(),
                    })
                }
                RoomStatus::InProgress => {}
            }
        }
        tracing::info!(room_id, player_id, "player left a running game");
        self.apply_action(room_id, player_id, PlayerAction::Forfeit)?;
        self.event_bus.broadcast(
            &room_id.to_string(),
            LobbyEvent::PlayerLeft {
                room_id: room_id.to_string(),
                player_id: player_id.to_string(),
            },
        );
        let summary = handle.room()?.summary();
        Ok(summary)
    }

    /// Applies one action in a running room and returns the resulting public view.
    pub fn apply_action(
        &self,
        room_id: &str,
        player_id: &str,
        action: PlayerAction,
    ) -> Result<SessionSnapshot, LobbyError> {
        let handle = self.handle(room_id)?;
        let session = self.running_session(&handle)?;
        if session.is_bot(player_id) {
            return Err(LobbyError::BotControlled(player_id.to_string()));
        }
        // room before game, so events leave in the order actions were applied
        let mut room = handle.room()?;
        let report = session.apply(player_id, action)?;
        self.publish(&mut room, &report)?;
        Ok(report.snapshot)
    }

    pub fn snapshot(&self, room_id: &str) -> Result<SessionSnapshot, LobbyError> {
        let handle = self.handle(room_id)?;
        self.running_session(&handle)?.snapshot()
    }

    /// Snapshot plus the player's own hand and legal actions.
    pub fn view_for(&self, room_id: &str, player_id: &str) -> Result<PlayerPerspective, LobbyError> {
        let handle = self.handle(room_id)?;
        self.running_session(&handle)?.perspective(player_id)
    }

    /// Every room not yet closed, oldest first.
    pub fn list_rooms(&self) -> Result<Vec<RoomSummary>, LobbyError> {
        let handles: Vec<Arc<RoomHandle>> = self
            .rooms
            .read()
            .map_err(|_| LobbyError::StoragePoisoned)?
            .values()
            .cloned()
            .collect();
        let mut rooms = Vec::with_capacity(handles.len());
        for handle in handles {
            let summary = handle.room()?.summary();
            if summary.status != RoomStatus::Closed {
                rooms.push(summary);
            }
        }
        rooms.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(rooms)
    }

    pub fn room(&self, room_id: &str) -> Result<RoomSummary, LobbyError> {
        let handle = self.handle(room_id)?;
        let summary = handle.room()?.summary();
        Ok(summary)
    }

    /// Variants a room can currently be opened with.
    pub fn playable(variant: GameVariant) -> bool {
        variant.is_durak()
    }

    fn handle(&self, room_id: &str) -> Result<Arc<RoomHandle>, LobbyError> {
        self.rooms
            .read()
            .map_err(|_| LobbyError::StoragePoisoned)?
            .get(room_id)
            .cloned()
            .ok_or_else(|| LobbyError::RoomNotFound(room_id.to_string()))
    }

    fn running_session(&self, handle: &RoomHandle) -> Result<Arc<TableSession>, LobbyError> {
        match handle.session()? {
            Some(session) => Ok(session),
            None => {
                let room = handle.room()?;
                Err(LobbyError::RoomNotJoinable {
                    room_id: room.id().clone(),
                    status: room.status(),
                })
            }
        }
    }

    fn start(&self, handle: &RoomHandle, room: &mut Room) -> Result<(), LobbyError> {
        if room.status() != RoomStatus::Waiting {
            return Ok(());
        }
        let settings = self.settings.get()?;
        let GameVariant::Durak(mode) = room.variant() else {
            return Err(LobbyError::UnsupportedVariant(room.variant()));
        };
        let config = GameConfig {
            mode,
            stake: room.stake(),
            seed: room.seed(),
        };
        let session = Arc::new(TableSession::start(
            room.id().clone(),
            config,
            room.players(),
            &settings.bot_strategy,
            settings.max_bot_steps,
        )?);
        *handle
            .session
            .write()
            .map_err(|_| LobbyError::StoragePoisoned)? = Some(Arc::clone(&session));
        room.set_status(RoomStatus::InProgress);

        tracing::info!(room_id = %room.id(), players = room.members().len(), "game started");
        self.event_bus.broadcast(
            room.id(),
            LobbyEvent::GameStarted {
                room_id: room.id().clone(),
                players: room
                    .members()
                    .iter()
                    .enumerate()
                    .map(|(seat, m)| PlayerInfo {
                        id: m.id.clone(),
                        name: m.display_name.clone(),
                        seat,
                        is_bot: m.is_bot,
                    })
                    .collect(),
            },
        );

        let report = session.run_bots()?;
        self.publish(room, &report)
    }

    fn publish(&self, room: &mut Room, report: &TurnReport) -> Result<(), LobbyError> {
        let room_id = room.id().clone();
        for event in &report.events {
            let lobby_event = match event {
                TurnEvent::Played { player_id, action } => LobbyEvent::ActionApplied {
                    room_id: room_id.clone(),
                    player_id: player_id.clone(),
                    action: action.clone(),
                },
                TurnEvent::RoundResolved {
                    outcome,
                    defender_id,
                    ..
                } => LobbyEvent::RoundResolved {
                    room_id: room_id.clone(),
                    outcome: *outcome,
                    defender_id: defender_id.clone(),
                },
                _ => continue,
            };
            self.event_bus.broadcast(&room_id, lobby_event);
        }

        let Some(finished) = &report.finished else {
            return Ok(());
        };
        tracing::info!(
            room_id = %room_id,
            loser = ?finished.loser_id,
            moves = finished.record.actions.len(),
            "game finished"
        );
        self.history.add_game(finished.record.clone())?;
        self.event_bus.broadcast(
            &room_id,
            LobbyEvent::GameFinished {
                room_id: room_id.clone(),
                loser_id: finished.loser_id.clone(),
                settlement: finished.settlement.clone(),
            },
        );
        self.close(room);
        Ok(())
    }

    fn close(&self, room: &mut Room) {
        room.set_status(RoomStatus::Closed);
        tracing::info!(room_id = %room.id(), "room closed");
        self.event_bus.broadcast(
            room.id(),
            LobbyEvent::RoomClosed {
                room_id: room.id().clone(),
            },
        );
    }

    #[cfg(test)]
    fn seated_ids(&self, room_id: &str) -> Result<Vec<PlayerId>, LobbyError> {
        let handle = self.handle(room_id)?;
        let room = handle.room()?;
        Ok(room.members().iter().map(|m| m.id.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckflow_engine::rules::{DurakMode, PokerMode};

    fn human(id: &str) -> Account {
        Account {
            real_balance: 1_000,
            demo_balance: 10_000,
            ..Account::new(id, id)
        }
    }

    #[test]
    fn demo_room_with_host_starts_at_creation() {
        let lobby = Coordinator::default();
        let config = RoomConfig {
            capacity: 4,
            demo: true,
            seed: Some(12),
            ..Default::default()
        };
        let summary = lobby.create_room(config, Some(&human("h"))).expect("create");
        assert_eq!(summary.status, RoomStatus::InProgress);
        assert_eq!(summary.seated, 4);
        assert_eq!(
            lobby.seated_ids(&summary.id).expect("seated"),
            vec!["h", "bot-1", "bot-2", "bot-3"]
        );
    }

    #[test]
    fn poker_rooms_are_refused() {
        let lobby = Coordinator::default();
        let config = RoomConfig {
            variant: GameVariant::Poker(PokerMode::TexasHoldem),
            ..Default::default()
        };
        assert!(matches!(
            lobby.create_room(config, None),
            Err(LobbyError::UnsupportedVariant(_))
        ));
        assert!(!Coordinator::playable(GameVariant::Poker(PokerMode::Omaha)));
        assert!(Coordinator::playable(GameVariant::Durak(DurakMode::Transfer)));
    }

    #[test]
    fn capacity_outside_the_table_limits_is_refused() {
        let lobby = Coordinator::default();
        for capacity in [1, 7] {
            let config = RoomConfig {
                capacity,
                ..Default::default()
            };
            assert!(matches!(
                lobby.create_room(config, None),
                Err(LobbyError::InvalidRoom(_))
            ));
        }
    }

    #[test]
    fn stakes_too_large_to_settle_are_refused() {
        let lobby = Coordinator::default();
        let config = RoomConfig {
            stake: Some(MAX_STAKE + 1),
            ..Default::default()
        };
        assert!(matches!(
            lobby.create_room(config, None),
            Err(LobbyError::InvalidRoom(_))
        ));
        let config = RoomConfig {
            stake: Some(MAX_STAKE),
            ..Default::default()
        };
        assert_eq!(lobby.create_room(config, None).expect("create").stake, MAX_STAKE);
    }

    #[test]
    fn starting_a_running_room_again_keeps_its_game() {
        let lobby = Coordinator::default();
        let config = RoomConfig {
            capacity: 3,
            demo: true,
            seed: Some(4),
            ..Default::default()
        };
        let summary = lobby.create_room(config, Some(&human("h"))).expect("create");
        let handle = lobby.handle(&summary.id).expect("handle");
        let before = handle.session().expect("session").expect("running");
        let mut events = lobby.event_bus().subscribe(summary.id.clone());
        {
            let mut room = handle.room().expect("room");
            lobby.start(&handle, &mut room).expect("second start");
        }
        let after = handle.session().expect("session").expect("running");
        assert!(Arc::ptr_eq(&before, &after));
        assert!(events.drain().is_empty());
        assert_eq!(lobby.room(&summary.id).expect("room").status, RoomStatus::InProgress);
    }

    #[test]
    fn waiting_room_empties_and_closes() {
        let lobby = Coordinator::default();
        let room = lobby
            .create_room(
                RoomConfig {
                    capacity: 3,
                    ..Default::default()
                },
                Some(&human("a")),
            )
            .expect("create");
        let summary = lobby.leave_room(&room.id, "a").expect("leave");
        assert_eq!(summary.status, RoomStatus::Closed);
        assert!(lobby.list_rooms().expect("list").is_empty());
        assert!(matches!(
            lobby.join_room(&room.id, &human("b")),
            Err(LobbyError::RoomNotJoinable { .. })
        ));
    }

    #[test]
    fn snapshot_requires_a_running_game() {
        let lobby = Coordinator::default();
        let room = lobby
            .create_room(RoomConfig::default(), None)
            .expect("create");
        assert!(matches!(
            lobby.snapshot(&room.id),
            Err(LobbyError::RoomNotJoinable {
                status: RoomStatus::Waiting,
                ..
            })
        ));
        assert!(matches!(
            lobby.snapshot("missing"),
            Err(LobbyError::RoomNotFound(_))
        ));
    }
}
