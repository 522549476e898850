use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use deckflow_engine::machine::RoundOutcome;
use deckflow_engine::player::{PlayerAction, PlayerId};
use deckflow_engine::settlement::Settlement;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::room::{RoomId, RoomSummary};

// Bounded so a stalled subscriber cannot grow memory; it is dropped instead.
const EVENT_CHANNEL_BUFFER: usize = 1000;

pub type EventSender = mpsc::Sender<LobbyEvent>;
pub type EventReceiver = mpsc::Receiver<LobbyEvent>;

/// Receiving end of a room subscription. Dropping it unsubscribes.
pub struct EventSubscription {
    bus: EventBus,
    room_id: RoomId,
    subscriber_id: usize,
    pub receiver: EventReceiver,
}

impl EventSubscription {
    pub fn receiver(&mut self) -> &mut EventReceiver {
        &mut self.receiver
    }

    /// Everything queued so far, without waiting.
    pub fn drain(&mut self) -> Vec<LobbyEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.room_id, self.subscriber_id);
    }
}

/// Per-room fan-out of [`LobbyEvent`]s. Cloning shares the subscriber table.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

type SubscriberMap = HashMap<RoomId, Vec<(usize, EventSender)>>;

#[derive(Debug, Default)]
struct EventBusInner {
    subscribers: RwLock<SubscriberMap>,
    next_id: AtomicUsize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, room_id: RoomId) -> EventSubscription {
        let (subscriber_id, receiver) = self.subscribe_raw(room_id.clone());
        EventSubscription {
            bus: self.clone(),
            room_id,
            subscriber_id,
            receiver,
        }
    }

    fn subscribe_raw(&self, room_id: RoomId) -> (usize, EventReceiver) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        self.write().entry(room_id.clone()).or_default().push((id, tx));

        tracing::debug!(room_id = %room_id, subscriber_id = id, "subscribed to room events");
        (id, rx)
    }

    /// Never blocks: subscribers whose channel is full or closed are dropped.
    pub fn broadcast(&self, room_id: &RoomId, event: LobbyEvent) {
        tracing::debug!(room_id = %room_id, event = event.kind(), "broadcasting room event");

        let Some(list) = self.read().get(room_id).cloned() else {
            return;
        };

        let mut failed = Vec::new();
        for (id, sender) in list {
            if let Err(e) = sender.try_send(event.clone()) {
                tracing::warn!(
                    room_id = %room_id,
                    subscriber_id = id,
                    error = %e,
                    "dropping room subscriber"
                );
                failed.push(id);
            }
        }
        if !failed.is_empty() {
            self.remove_subscribers(room_id, &failed);
        }
    }

    pub fn unsubscribe(&self, room_id: &RoomId, subscriber_id: usize) {
        self.remove_subscribers(room_id, &[subscriber_id]);
    }

    pub fn drop_room(&self, room_id: &RoomId) {
        self.write().remove(room_id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.read().values().map(|list| list.len()).sum()
    }

    fn remove_subscribers(&self, room_id: &RoomId, ids: &[usize]) {
        let mut guard = self.write();
        if let Some(list) = guard.get_mut(room_id) {
            list.retain(|(id, _)| !ids.contains(id));
            if list.is_empty() {
                guard.remove(room_id);
            }
        }
    }

    // the map stays consistent across a panic, so a poisoned lock is still usable
    fn read(&self) -> RwLockReadGuard<'_, SubscriberMap> {
        self.inner
            .subscribers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SubscriberMap> {
        self.inner
            .subscribers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Seat information announced when a game starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub seat: usize,
    pub is_bot: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LobbyEvent {
    RoomCreated {
        room: RoomSummary,
    },
    PlayerJoined {
        room_id: RoomId,
        player_id: PlayerId,
        is_bot: bool,
    },
    PlayerLeft {
        room_id: RoomId,
        player_id: PlayerId,
    },
    GameStarted {
        room_id: RoomId,
        players: Vec<PlayerInfo>,
    },
    ActionApplied {
        room_id: RoomId,
        player_id: PlayerId,
        action: PlayerAction,
    },
    RoundResolved {
        room_id: RoomId,
        outcome: RoundOutcome,
        defender_id: PlayerId,
    },
    GameFinished {
        room_id: RoomId,
        loser_id: Option<PlayerId>,
        settlement: Settlement,
    },
    RoomClosed {
        room_id: RoomId,
    },
}

impl LobbyEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            LobbyEvent::RoomCreated { .. } => "room_created",
            LobbyEvent::PlayerJoined { .. } => "player_joined",
            LobbyEvent::PlayerLeft { .. } => "player_left",
            LobbyEvent::GameStarted { .. } => "game_started",
            LobbyEvent::ActionApplied { .. } => "action_applied",
            LobbyEvent::RoundResolved { .. } => "round_resolved",
            LobbyEvent::GameFinished { .. } => "game_finished",
            LobbyEvent::RoomClosed { .. } => "room_closed",
        }
    }
}
