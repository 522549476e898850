use chrono::{DateTime, Utc};
use deckflow_engine::player::{Player, PlayerId};
use deckflow_engine::rules::GameVariant;
use serde::{Deserialize, Serialize};

use crate::errors::LobbyError;

pub type RoomId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Waiting,
    InProgress,
    Closed,
}

/// What a host picks when opening a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    pub name: String,
    pub variant: GameVariant,
    pub capacity: usize,
    /// `None` takes the lobby default
    pub stake: Option<u64>,
    /// Demo rooms play for demo balance and fill empty seats with bots
    pub demo: bool,
    /// Deck seed for reproducible tables
    pub seed: Option<u64>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            name: "Table".to_string(),
            variant: GameVariant::default(),
            capacity: 2,
            stake: None,
            demo: false,
            seed: None,
        }
    }
}

/// A user's account as handed to the lobby by its owner. The lobby only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: PlayerId,
    pub display_name: String,
    pub real_balance: u64,
    pub demo_balance: u64,
}

impl Account {
    pub fn new(id: impl Into<PlayerId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            real_balance: 0,
            demo_balance: 0,
        }
    }

    pub fn balance_for(&self, demo: bool) -> u64 {
        if demo {
            self.demo_balance
        } else {
            self.real_balance
        }
    }

    /// Tops the demo balance up to `floor` when it is at or below it.
    /// Returns the amount credited.
    pub fn refill_demo(&mut self, floor: u64) -> u64 {
        if self.demo_balance > floor {
            return 0;
        }
        let credited = floor - self.demo_balance;
        self.demo_balance = floor;
        credited
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: PlayerId,
    pub display_name: String,
    pub is_bot: bool,
    /// Balance relevant to this room (demo or real) at the time of seating
    pub balance: u64,
}

impl Member {
    pub fn bot(id: impl Into<PlayerId>, balance: u64) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            is_bot: true,
            balance,
        }
    }
}

/// One row of the lobby listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub id: RoomId,
    pub name: String,
    pub variant: GameVariant,
    pub seated: usize,
    pub capacity: usize,
    pub stake: u64,
    pub demo: bool,
    pub status: RoomStatus,
    pub created_at: DateTime<Utc>,
}

/// Waiting-room membership. Seat order is join order.
#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    name: String,
    variant: GameVariant,
    capacity: usize,
    stake: u64,
    demo: bool,
    seed: Option<u64>,
    members: Vec<Member>,
    status: RoomStatus,
    created_at: DateTime<Utc>,
}

impl Room {
    pub fn new(id: RoomId, config: RoomConfig, stake: u64) -> Self {
        Self {
            id,
            name: config.name,
            variant: config.variant,
            capacity: config.capacity,
            stake,
            demo: config.demo,
            seed: config.seed,
            members: Vec::with_capacity(config.capacity),
            status: RoomStatus::Waiting,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }
    pub fn variant(&self) -> GameVariant {
        self.variant
    }
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    pub fn stake(&self) -> u64 {
        self.stake
    }
    pub fn is_demo(&self) -> bool {
        self.demo
    }
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
    pub fn members(&self) -> &[Member] {
        &self.members
    }
    pub fn status(&self) -> RoomStatus {
        self.status
    }
    pub fn is_full(&self) -> bool {
        self.members.len() >= self.capacity
    }
    pub fn open_seats(&self) -> usize {
        self.capacity.saturating_sub(self.members.len())
    }
    pub fn is_seated(&self, player_id: &str) -> bool {
        self.members.iter().any(|m| m.id == player_id)
    }
    pub fn has_humans(&self) -> bool {
        self.members.iter().any(|m| !m.is_bot)
    }

    /// Seats a human. A full room reports `RoomFull` whatever its status;
    /// membership is frozen once the room leaves `Waiting`.
    pub fn seat(&mut self, account: &Account) -> Result<(), LobbyError> {
        if self.is_full() {
            return Err(LobbyError::RoomFull {
                room_id: self.id.clone(),
                capacity: self.capacity,
            });
        }
        self.ensure_waiting()?;
        if self.is_seated(&account.id) {
            return Err(LobbyError::AlreadySeated(account.id.clone()));
        }
        let available = account.balance_for(self.demo);
        if available < self.stake {
            return Err(LobbyError::InsufficientBalance {
                required: self.stake,
                available,
            });
        }
        self.members.push(Member {
            id: account.id.clone(),
            display_name: account.display_name.clone(),
            is_bot: false,
            balance: available,
        });
        Ok(())
    }

    pub fn seat_bot(&mut self, member: Member) -> Result<(), LobbyError> {
        self.ensure_waiting()?;
        if self.is_full() {
            return Err(LobbyError::RoomFull {
                room_id: self.id.clone(),
                capacity: self.capacity,
            });
        }
        if self.is_seated(&member.id) {
            return Err(LobbyError::AlreadySeated(member.id));
        }
        self.members.push(member);
        Ok(())
    }

    pub fn remove(&mut self, player_id: &str) -> Result<Member, LobbyError> {
        self.ensure_waiting()?;
        let idx = self
            .members
            .iter()
            .position(|m| m.id == player_id)
            .ok_or_else(|| LobbyError::NotSeated(player_id.to_string()))?;
        Ok(self.members.remove(idx))
    }

    pub(crate) fn set_status(&mut self, status: RoomStatus) {
        self.status = status;
    }

    /// Engine players in seat order.
    pub fn players(&self) -> Vec<Player> {
        self.members
            .iter()
            .enumerate()
            .map(|(seat, m)| {
                Player::new(m.id.clone(), m.display_name.clone(), m.is_bot, seat, m.balance)
            })
            .collect()
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            variant: self.variant,
            seated: self.members.len(),
            capacity: self.capacity,
            stake: self.stake,
            demo: self.demo,
            status: self.status,
            created_at: self.created_at,
        }
    }

    fn ensure_waiting(&self) -> Result<(), LobbyError> {
        if self.status == RoomStatus::Waiting {
            Ok(())
        } else {
            Err(LobbyError::RoomNotJoinable {
                room_id: self.id.clone(),
                status: self.status,
            })
        }
    }
}
