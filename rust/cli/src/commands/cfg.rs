//! `deckflow cfg`: the resolved configuration as JSON, each value paired
//! with its source (`default`, `file` or `env`).

use std::io::Write;

use crate::config::{self, ConfigResolved};
use crate::error::CliError;

pub fn handle_cfg_command(resolved: &ConfigResolved, out: &mut dyn Write) -> Result<(), CliError> {
    let ConfigResolved { config, sources } = resolved;
    let display = serde_json::json!({
        "seed": {
            "value": config.seed,
            "source": sources.seed,
        },
        "players": {
            "value": config.players,
            "source": sources.players,
        },
        "variant": {
            "value": config.variant.to_string(),
            "source": sources.variant,
        },
        "bot_strategy": {
            "value": config.bot_strategy,
            "source": sources.bot_strategy,
        },
        "games": {
            "value": config.games,
            "source": sources.games,
        }
    });
    let json_str = serde_json::to_string_pretty(&display).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}

/// Resolves from the process environment and prints.
pub fn load_and_print(out: &mut dyn Write) -> Result<(), CliError> {
    let resolved = config::load_with_sources()?;
    handle_cfg_command(&resolved, out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_value_has_a_source() {
        let resolved = config::load_from(|key: &str| match key {
            "DECKFLOW_PLAYERS" => Some("3".to_string()),
            _ => None,
        })
        .unwrap();
        let mut out = Vec::new();
        handle_cfg_command(&resolved, &mut out).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["players"]["value"], 3);
        assert_eq!(json["players"]["source"], "env");
        assert_eq!(json["variant"]["value"], "durak-classic");
        assert_eq!(json["seed"]["value"], serde_json::Value::Null);
        assert_eq!(json["games"]["source"], "default");
    }
}
