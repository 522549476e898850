use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::machine::Phase;
use crate::player::{PlayerAction, PlayerId};
use crate::rules::GameVariant;
use crate::settlement::Settlement;

/// A single accepted action.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// 1-based position in the game
    pub seq: u32,
    pub player_id: PlayerId,
    /// Phase the action was played in
    pub phase: Phase,
    pub action: PlayerAction,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SeatRecord {
    pub id: PlayerId,
    pub name: String,
    pub is_bot: bool,
}

/// Complete record of one game. Holds the initial deck order so the game can
/// be replayed without the seed.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Format: YYYYMMDD-NNNNNN
    pub game_id: String,
    pub seed: Option<u64>,
    pub variant: GameVariant,
    #[serde(default)]
    pub stake: u64,
    /// Seat order
    pub players: Vec<SeatRecord>,
    pub initial_deck: Vec<Card>,
    pub trump_card: Card,
    pub actions: Vec<ActionRecord>,
    pub loser: Option<PlayerId>,
    #[serde(default)]
    pub settlement: Option<Settlement>,
    /// RFC3339, filled by [`GameLogger::write`] when missing
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

pub fn format_game_id(yyyymmdd: &str, seq: u32) -> String {
    format!("{}-{:06}", yyyymmdd, seq)
}

use chrono::{SecondsFormat, Utc};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Appends game records to a JSONL file, one record per line.
pub struct GameLogger {
    writer: Option<BufWriter<File>>,
    date: String,
    seq: u32,
}

impl GameLogger {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let f = File::create(path)?;
        Ok(Self {
            writer: Some(BufWriter::new(f)),
            date: Utc::now().format("%Y%m%d").to_string(),
            seq: 0,
        })
    }

    /// In-memory logger for id generation only.
    pub fn with_seq_for_test(date: &str) -> Self {
        Self {
            writer: None,
            date: date.to_string(),
            seq: 0,
        }
    }

    pub fn next_id(&mut self) -> String {
        self.seq += 1;
        format_game_id(&self.date, self.seq)
    }

    pub fn write(&mut self, record: &GameRecord) -> std::io::Result<()> {
        let mut rec = record.clone();
        if rec.ts.is_none() {
            rec.ts = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        let line = serde_json::to_string(&rec).map_err(std::io::Error::other)?;
        if let Some(w) = &mut self.writer {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        Ok(())
    }
}
