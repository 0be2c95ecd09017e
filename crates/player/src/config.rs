//! Player configuration from environment variables
//!
//! `.env` files are loaded by the binary via `dotenvy` before this runs.

use std::str::FromStr;
use std::time::Duration;

use ttrpg_domain::{CharacterId, LocationId};

use crate::application::services::CombatConfig;
use crate::infrastructure::http_client::DEFAULT_STORY_ENGINE_URL;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Everything the binary needs to start a combat session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    pub story_engine_url: String,
    pub character_id: CharacterId,
    pub location_id: LocationId,
    pub npc_template_ids: Vec<String>,
    pub combat: CombatConfig,
}

impl PlayerConfig {
    /// Read from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through `lookup`; unset or blank variables fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = CombatConfig::default();

        let npc_template_ids = get("COMBAT_NPC_TEMPLATES")
            .unwrap_or_else(|| "goblin_scout".to_string())
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            story_engine_url: get("STORY_ENGINE_URL")
                .unwrap_or_else(|| DEFAULT_STORY_ENGINE_URL.to_string()),
            character_id: parse(&get, "PLAYER_CHARACTER_ID", CharacterId::new(1))?,
            location_id: parse(&get, "COMBAT_LOCATION_ID", LocationId::new(1))?,
            npc_template_ids,
            combat: CombatConfig {
                settle_delay: millis(&get, "COMBAT_SETTLE_DELAY_MS", defaults.settle_delay)?,
                request_timeout: millis(
                    &get,
                    "COMBAT_REQUEST_TIMEOUT_MS",
                    defaults.request_timeout,
                )?,
                retry_delay: millis(&get, "COMBAT_RETRY_DELAY_MS", defaults.retry_delay)?,
                log_capacity: parse(&get, "COMBAT_LOG_CAPACITY", defaults.log_capacity)?,
            },
        })
    }
}

fn parse<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

fn millis<G>(get: &G, key: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let default_ms = u64::try_from(default.as_millis()).unwrap_or(u64::MAX);
    parse(get, key, default_ms).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<PlayerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PlayerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config(&[]).unwrap();
        assert_eq!(config.story_engine_url, "http://127.0.0.1:8003");
        assert_eq!(config.character_id, CharacterId::new(1));
        assert_eq!(config.location_id, LocationId::new(1));
        assert_eq!(config.npc_template_ids, vec!["goblin_scout"]);
        assert_eq!(config.combat, CombatConfig::default());
        assert_eq!(config.combat.settle_delay, Duration::from_secs(3));
        assert_eq!(config.combat.log_capacity, 10);
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("STORY_ENGINE_URL", "http://engine:9000"),
            ("PLAYER_CHARACTER_ID", "4"),
            ("COMBAT_NPC_TEMPLATES", "goblin_scout, wolf ,"),
            ("COMBAT_SETTLE_DELAY_MS", "500"),
            ("COMBAT_LOG_CAPACITY", "25"),
            ("COMBAT_RETRY_DELAY_MS", " "),
        ])
        .unwrap();

        assert_eq!(config.story_engine_url, "http://engine:9000");
        assert_eq!(config.character_id, CharacterId::new(4));
        assert_eq!(config.npc_template_ids, vec!["goblin_scout", "wolf"]);
        assert_eq!(config.combat.settle_delay, Duration::from_millis(500));
        assert_eq!(config.combat.retry_delay, Duration::from_secs(1));
        assert_eq!(config.combat.log_capacity, 25);
    }

    #[test]
    fn malformed_numbers_are_errors() {
        assert_eq!(
            config(&[("COMBAT_REQUEST_TIMEOUT_MS", "ten seconds")]),
            Err(ConfigError::Invalid {
                key: "COMBAT_REQUEST_TIMEOUT_MS",
                value: "ten seconds".into()
            })
        );
        assert!(config(&[("PLAYER_CHARACTER_ID", "player_1")]).is_err());
    }
}
