use std::sync::RwLock;

use deckflow_engine::machine::{MAX_PLAYERS, MIN_PLAYERS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lobby-wide knobs applied when rooms are created and played.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LobbySettings {
    /// Smallest table a host may open
    pub min_capacity: usize,
    /// Largest table a host may open
    pub max_capacity: usize,
    /// Strategy name passed to `deckflow_ai::create_bot` for filler seats
    pub bot_strategy: String,
    /// Demo balances at or below this are topped up to it on request
    pub demo_refill_floor: u64,
    /// Stake used when a room is created without one
    pub default_stake: u64,
    /// Upper bound on consecutive bot moves driven by a single request
    pub max_bot_steps: usize,
}

impl Default for LobbySettings {
    fn default() -> Self {
        Self {
            min_capacity: MIN_PLAYERS,
            max_capacity: MAX_PLAYERS,
            bot_strategy: "random".to_string(),
            demo_refill_floor: 10_000,
            default_stake: 100,
            max_bot_steps: 10_000,
        }
    }
}

impl LobbySettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.min_capacity < MIN_PLAYERS || self.max_capacity > MAX_PLAYERS {
            return Err(SettingsError::InvalidValue(format!(
                "capacity must stay between {MIN_PLAYERS} and {MAX_PLAYERS}"
            )));
        }

        if self.min_capacity > self.max_capacity {
            return Err(SettingsError::InvalidValue(
                "min_capacity cannot exceed max_capacity".to_string(),
            ));
        }

        if self.bot_strategy.is_empty() {
            return Err(SettingsError::InvalidValue(
                "bot_strategy cannot be empty".to_string(),
            ));
        }

        if self.max_bot_steps == 0 {
            return Err(SettingsError::InvalidValue(
                "max_bot_steps must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug)]
pub struct SettingsStore {
    settings: RwLock<LobbySettings>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self {
            settings: RwLock::new(LobbySettings::default()),
        }
    }

    pub fn with_settings(settings: LobbySettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            settings: RwLock::new(settings),
        })
    }

    pub fn get(&self) -> Result<LobbySettings, SettingsError> {
        self.settings
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| SettingsError::StoragePoisoned)
    }

    pub fn update(&self, new_settings: LobbySettings) -> Result<LobbySettings, SettingsError> {
        new_settings.validate()?;

        let mut guard = self
            .settings
            .write()
            .map_err(|_| SettingsError::StoragePoisoned)?;
        *guard = new_settings.clone();
        tracing::info!(settings = ?new_settings, "lobby settings updated");
        Ok(new_settings)
    }

    /// Update a single field by name, e.g. from an admin form.
    pub fn update_field(
        &self,
        field: &str,
        value: serde_json::Value,
    ) -> Result<LobbySettings, SettingsError> {
        let mut current = self.get()?;
        let number = |name: &str| {
            value
                .as_u64()
                .ok_or_else(|| SettingsError::InvalidValue(format!("{name} must be a number")))
        };

        match field {
            "min_capacity" => current.min_capacity = number(field)? as usize,
            "max_capacity" => current.max_capacity = number(field)? as usize,
            "demo_refill_floor" => current.demo_refill_floor = number(field)?,
            "default_stake" => current.default_stake = number(field)?,
            "max_bot_steps" => current.max_bot_steps = number(field)? as usize,
            "bot_strategy" => {
                let strategy = value.as_str().ok_or_else(|| {
                    SettingsError::InvalidValue("bot_strategy must be a string".to_string())
                })?;
                current.bot_strategy = strategy.to_string();
            }
            _ => {
                return Err(SettingsError::InvalidValue(format!(
                    "unknown field: {}",
                    field
                )))
            }
        }

        self.update(current)
    }

    pub fn reset(&self) -> Result<LobbySettings, SettingsError> {
        self.update(LobbySettings::default())
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
    #[error("Settings storage poisoned")]
    StoragePoisoned,
}
