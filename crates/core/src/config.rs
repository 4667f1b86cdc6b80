use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::interaction::InteractionConfig;
use crate::render::RenderConfig;
use crate::viewer::KeyConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid viewer config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid viewer config: {0}")]
    Invalid(String),
}

/// Everything a host can tune about a view. Missing fields take their
/// defaults, so a config file only needs the keys it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub interaction: InteractionConfig,
    pub render: RenderConfig,
    pub keys: KeyConfig,
}

impl ViewerConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.interaction.validate().map_err(ConfigError::Invalid)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
