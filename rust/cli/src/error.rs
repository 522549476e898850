//! Error types for the `deckflow` command line.
//!
//! Commands that check many records at once collect failures as
//! [`BatchValidationError`] values and report them together.

use std::fmt;

use deckflow_engine::errors::GameError;
use deckflow_lobby::LobbyError;

use crate::config::ConfigError;

/// Every failure a command can end with.
#[derive(Debug)]
pub enum CliError {
    /// Reading input, writing output or touching the record file failed
    Io(std::io::Error),

    /// Bad arguments or unreadable records
    InvalidInput(String),

    /// Configuration could not be resolved
    Config(String),

    /// The engine or lobby refused the request
    Engine(String),

    /// Run stopped early; maps to exit code 130
    Interrupted(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Engine(msg) => write!(f, "Engine error: {}", msg),
            CliError::Interrupted(msg) => write!(f, "Interrupted: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        CliError::Io(error)
    }
}

impl From<GameError> for CliError {
    fn from(error: GameError) -> Self {
        CliError::Engine(error.to_string())
    }
}

impl From<LobbyError> for CliError {
    fn from(error: LobbyError) -> Self {
        CliError::Engine(error.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        CliError::Config(error.to_string())
    }
}

/// One failed item of a batch, identified by `item_context`.
///
/// ```rust
/// use deckflow_cli::BatchValidationError;
///
/// let error = BatchValidationError {
///     item_context: 3,
///     message: "settlement does not sum to zero".to_string(),
/// };
/// assert_eq!(error.to_string(), "3: settlement does not sum to zero");
/// ```
#[derive(Debug)]
pub struct BatchValidationError<T> {
    pub item_context: T,
    pub message: String,
}

impl<T: fmt::Display> fmt::Display for BatchValidationError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.item_context, self.message)
    }
}
