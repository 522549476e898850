use serde::{Deserialize, Serialize};

use crate::player::{Player, PlayerId, PlayerStatus};

/// Balance change for one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementEntry {
    pub player_id: PlayerId,
    pub delta: i64,
}

/// Stake redistribution at game end. Entries follow seat order and always
/// sum to zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub entries: Vec<SettlementEntry>,
}

impl Settlement {
    /// The durak and every forfeiter pay `stake` into a pot that is split
    /// evenly among everyone else. The remainder of an uneven split goes to
    /// the earliest seats. Nobody pays when there is nobody to pay.
    ///
    /// `stake` is clamped so that the whole pot fits in an `i64`.
    pub fn compute(players: &[Player], loser: Option<usize>, stake: u64) -> Self {
        let payer = |seat: usize, p: &Player| {
            Some(seat) == loser || p.status() == PlayerStatus::Forfeited
        };
        let payers = players
            .iter()
            .enumerate()
            .filter(|(s, p)| payer(*s, p))
            .count();
        let payees: Vec<usize> = players
            .iter()
            .enumerate()
            .filter(|(s, p)| !payer(*s, p))
            .map(|(s, _)| s)
            .collect();

        let mut entries: Vec<SettlementEntry> = players
            .iter()
            .map(|p| SettlementEntry {
                player_id: p.id().clone(),
                delta: 0,
            })
            .collect();
        if payees.is_empty() || payers == 0 || stake == 0 {
            return Self { entries };
        }

        let cap = i64::MAX / players.len() as i64;
        let stake = i64::try_from(stake).map_or(cap, |s| s.min(cap));
        let pot = stake.saturating_mul(payers as i64);
        let share = pot / payees.len() as i64;
        let remainder = (pot % payees.len() as i64) as usize;

        for (seat, entry) in entries.iter_mut().enumerate() {
            if payer(seat, &players[seat]) {
                entry.delta = -stake;
            }
        }
        for (rank, seat) in payees.iter().enumerate() {
            entries[*seat].delta = share + i64::from(rank < remainder);
        }
        Self { entries }
    }

    pub fn delta_for(&self, player_id: &str) -> i64 {
        self.entries
            .iter()
            .find(|e| e.player_id == player_id)
            .map(|e| e.delta)
            .unwrap_or(0)
    }

    pub fn total(&self) -> i64 {
        self.entries.iter().map(|e| e.delta).sum()
    }
}
