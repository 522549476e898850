use std::fs;

use deckflow_engine::machine::{MAX_PLAYERS, MIN_PLAYERS};
use deckflow_engine::rules::GameVariant;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub seed: Option<u64>,
    pub players: usize,
    pub variant: GameVariant,
    pub bot_strategy: String,
    pub games: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            players: 2,
            variant: GameVariant::default(),
            bot_strategy: "random".into(),
            games: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub seed: ValueSource,
    pub players: ValueSource,
    pub variant: ValueSource,
    pub bot_strategy: ValueSource,
    pub games: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            seed: ValueSource::Default,
            players: ValueSource::Default,
            variant: ValueSource::Default,
            bot_strategy: ValueSource::Default,
            games: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {e}"),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {e}"),
            ConfigError::Invalid(msg) => f.write_str(msg),
        }
    }
}

/// Resolves the configuration from the process environment.
pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    load_from(|key| std::env::var(key).ok())
}

/// Defaults, then the TOML file named by `DECKFLOW_CONFIG`, then the
/// `DECKFLOW_*` variables. Empty variables are ignored.
pub fn load_from<F>(env: F) -> Result<ConfigResolved, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();
    let var = |key: &str| env(key).filter(|v| !v.is_empty());

    if let Some(path) = var("DECKFLOW_CONFIG") {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
        if let Some(v) = f.players {
            cfg.players = v;
            sources.players = ValueSource::File;
        }
        if let Some(v) = f.variant {
            cfg.variant = parse_variant(&v)?;
            sources.variant = ValueSource::File;
        }
        if let Some(v) = f.bot_strategy {
            cfg.bot_strategy = v;
            sources.bot_strategy = ValueSource::File;
        }
        if let Some(v) = f.games {
            cfg.games = v;
            sources.games = ValueSource::File;
        }
    }

    if let Some(seed) = var("DECKFLOW_SEED") {
        cfg.seed = Some(
            seed.parse()
                .map_err(|_| ConfigError::Invalid(format!("Invalid seed: {seed}")))?,
        );
        sources.seed = ValueSource::Env;
    }
    if let Some(players) = var("DECKFLOW_PLAYERS") {
        cfg.players = players
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("Invalid players: {players}")))?;
        sources.players = ValueSource::Env;
    }
    if let Some(variant) = var("DECKFLOW_VARIANT") {
        cfg.variant = parse_variant(&variant)?;
        sources.variant = ValueSource::Env;
    }
    if let Some(bot) = var("DECKFLOW_BOT") {
        cfg.bot_strategy = bot;
        sources.bot_strategy = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    players: Option<usize>,
    #[serde(default)]
    variant: Option<String>,
    #[serde(default)]
    bot_strategy: Option<String>,
    #[serde(default)]
    games: Option<u64>,
}

fn parse_variant(s: &str) -> Result<GameVariant, ConfigError> {
    s.parse().map_err(ConfigError::Invalid)
}

pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&cfg.players) {
        return Err(ConfigError::Invalid(format!(
            "Invalid configuration: players must be between {MIN_PLAYERS} and {MAX_PLAYERS}"
        )));
    }
    if cfg.games == 0 {
        return Err(ConfigError::Invalid(
            "Invalid configuration: games must be >=1".into(),
        ));
    }
    deckflow_ai::create_bot(&cfg.bot_strategy, None)
        .map_err(|e| ConfigError::Invalid(format!("Invalid configuration: {e}")))?;
    Ok(())
}
