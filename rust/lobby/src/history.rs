use std::collections::BTreeMap;
use std::sync::RwLock;

use deckflow_engine::logger::GameRecord;
use deckflow_engine::player::PlayerId;
use deckflow_engine::rules::GameVariant;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Finished games, oldest first.
#[derive(Debug, Default)]
pub struct HistoryStore {
    games: RwLock<Vec<GameRecord>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_game(&self, record: GameRecord) -> Result<(), HistoryError> {
        let mut games = self
            .games
            .write()
            .map_err(|_| HistoryError::StoragePoisoned)?;
        games.push(record);
        Ok(())
    }

    /// Newest first; defaults to 100 games.
    pub fn get_recent_games(&self, limit: Option<usize>) -> Result<Vec<GameRecord>, HistoryError> {
        let games = self
            .games
            .read()
            .map_err(|_| HistoryError::StoragePoisoned)?;
        let limit = limit.unwrap_or(100);
        Ok(games.iter().rev().take(limit).cloned().collect())
    }

    pub fn get_game(&self, game_id: &str) -> Result<GameRecord, HistoryError> {
        let games = self
            .games
            .read()
            .map_err(|_| HistoryError::StoragePoisoned)?;
        games
            .iter()
            .find(|g| g.game_id == game_id)
            .cloned()
            .ok_or_else(|| HistoryError::NotFound(game_id.to_string()))
    }

    pub fn filter_games(&self, filter: &GameFilter) -> Result<Vec<GameRecord>, HistoryError> {
        let games = self
            .games
            .read()
            .map_err(|_| HistoryError::StoragePoisoned)?;
        Ok(games.iter().filter(|g| filter.matches(g)).cloned().collect())
    }

    pub fn calculate_stats(&self) -> Result<GameStatistics, HistoryError> {
        let games = self
            .games
            .read()
            .map_err(|_| HistoryError::StoragePoisoned)?;

        if games.is_empty() {
            return Ok(GameStatistics::default());
        }

        let mut stats = GameStatistics {
            total_games: games.len(),
            ..Default::default()
        };
        let mut total_actions = 0usize;
        for game in games.iter() {
            total_actions += game.actions.len();
            match &game.loser {
                Some(loser) => *stats.losses.entry(loser.clone()).or_default() += 1,
                None => stats.without_loser += 1,
            }
            if let Some(settlement) = &game.settlement {
                stats.total_paid_out += settlement
                    .entries
                    .iter()
                    .filter(|e| e.delta > 0)
                    .map(|e| e.delta.unsigned_abs())
                    .sum::<u64>();
            }
        }
        stats.avg_actions = total_actions as f64 / games.len() as f64;
        Ok(stats)
    }

    pub fn total_games(&self) -> Result<usize, HistoryError> {
        let games = self
            .games
            .read()
            .map_err(|_| HistoryError::StoragePoisoned)?;
        Ok(games.len())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameFilter {
    /// Games the player sat in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_id: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<GameVariant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loser: Option<PlayerId>,
    /// RFC3339 bounds, compared lexically against `ts`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
}

impl GameFilter {
    fn matches(&self, game: &GameRecord) -> bool {
        if let Some(player_id) = &self.player_id {
            if !game.players.iter().any(|p| &p.id == player_id) {
                return false;
            }
        }

        if let Some(variant) = self.variant {
            if game.variant != variant {
                return false;
            }
        }

        if let Some(loser) = &self.loser {
            if game.loser.as_ref() != Some(loser) {
                return false;
            }
        }

        if let (Some(ts), Some(from)) = (&game.ts, &self.date_from) {
            if ts < from {
                return false;
            }
        }

        if let (Some(ts), Some(to)) = (&game.ts, &self.date_to) {
            if ts > to {
                return false;
            }
        }

        true
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GameStatistics {
    pub total_games: usize,
    /// Games that ended through forfeits with nobody left holding cards
    pub without_loser: usize,
    pub losses: BTreeMap<PlayerId, usize>,
    pub avg_actions: f64,
    /// Sum of positive settlement deltas
    pub total_paid_out: u64,
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("History storage poisoned")]
    StoragePoisoned,
    #[error("Game not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckflow_engine::deck::Deck;
    use deckflow_engine::logger::{ActionRecord, SeatRecord};
    use deckflow_engine::machine::Phase;
    use deckflow_engine::player::PlayerAction;
    use deckflow_engine::rules::{DurakMode, PokerMode};
    use deckflow_engine::settlement::{Settlement, SettlementEntry};

    fn record(id: &str, loser: Option<&str>, ts: &str) -> GameRecord {
        let deck = Deck::new_with_seed(1);
        GameRecord {
            game_id: id.to_string(),
            seed: Some(1),
            variant: GameVariant::Durak(DurakMode::Classic),
            stake: 10,
            players: ["a", "b"]
                .iter()
                .map(|p| SeatRecord {
                    id: p.to_string(),
                    name: p.to_uppercase(),
                    is_bot: false,
                })
                .collect(),
            initial_deck: deck.cards().to_vec(),
            trump_card: deck.cards()[deck.cards().len() - 1],
            actions: vec![ActionRecord {
                seq: 1,
                player_id: "a".into(),
                phase: Phase::Attack,
                action: PlayerAction::Forfeit,
            }],
            loser: loser.map(str::to_string),
            settlement: Some(Settlement {
                entries: vec![
                    SettlementEntry {
                        player_id: "a".into(),
                        delta: -10,
                    },
                    SettlementEntry {
                        player_id: "b".into(),
                        delta: 10,
                    },
                ],
            }),
            ts: Some(ts.to_string()),
            meta: None,
        }
    }

    #[test]
    fn recent_games_are_newest_first() {
        let store = HistoryStore::new();
        store.add_game(record("g1", Some("a"), "2025-01-01T00:00:00Z")).expect("add");
        store.add_game(record("g2", Some("b"), "2025-01-02T00:00:00Z")).expect("add");
        let recent = store.get_recent_games(Some(1)).expect("recent");
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].game_id, "g2");
        assert_eq!(store.total_games().expect("count"), 2);
    }

    #[test]
    fn missing_game_is_not_found() {
        let store = HistoryStore::new();
        assert!(matches!(store.get_game("nope"), Err(HistoryError::NotFound(_))));
    }

    #[test]
    fn filters_combine() {
        let store = HistoryStore::new();
        store.add_game(record("g1", Some("a"), "2025-01-01T00:00:00Z")).expect("add");
        store.add_game(record("g2", Some("b"), "2025-02-01T00:00:00Z")).expect("add");
        store.add_game(record("g3", None, "2025-03-01T00:00:00Z")).expect("add");

        let by_loser = GameFilter {
            loser: Some("b".into()),
            ..Default::default()
        };
        let got: Vec<_> = store
            .filter_games(&by_loser)
            .expect("filter")
            .into_iter()
            .map(|g| g.game_id)
            .collect();
        assert_eq!(got, vec!["g2"]);

        let since_feb = GameFilter {
            player_id: Some("a".into()),
            date_from: Some("2025-02-01T00:00:00Z".into()),
            ..Default::default()
        };
        assert_eq!(store.filter_games(&since_feb).expect("filter").len(), 2);

        let poker = GameFilter {
            variant: Some(GameVariant::Poker(PokerMode::Omaha)),
            ..Default::default()
        };
        assert!(store.filter_games(&poker).expect("filter").is_empty());
    }

    #[test]
    fn stats_count_losses_and_payouts() {
        let store = HistoryStore::new();
        assert_eq!(store.calculate_stats().expect("stats"), GameStatistics::default());

        store.add_game(record("g1", Some("a"), "2025-01-01T00:00:00Z")).expect("add");
        store.add_game(record("g2", Some("a"), "2025-01-02T00:00:00Z")).expect("add");
        store.add_game(record("g3", None, "2025-01-03T00:00:00Z")).expect("add");
        let stats = store.calculate_stats().expect("stats");
        assert_eq!(stats.total_games, 3);
        assert_eq!(stats.losses.get("a"), Some(&2));
        assert_eq!(stats.without_loser, 1);
        assert_eq!(stats.total_paid_out, 30);
        assert!((stats.avg_actions - 1.0).abs() < f64::EPSILON);
    }
}
