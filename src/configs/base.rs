use serde::{Deserialize, Serialize};

use super::{LoggingConfig, NarrationConfig, PlayerConfig};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub narration: NarrationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load `config.toml` from the working directory. Missing file means
    /// all defaults.
    pub fn load() -> Result<Self, toml::de::Error> {
        let config_str = std::fs::read_to_string("config.toml").unwrap_or_default();
        Self::parse(&config_str)
    }

    pub fn parse(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}
