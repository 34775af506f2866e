//! Tunables for roll sessions.

use serde::{Deserialize, Serialize};

use crate::error::LitmResult;
use crate::power::{BURN_VALUE, PowerCalculator};

/// Configuration shared by every roll session of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Power added per burned tag.
    pub burn_value: i32,
    /// Power added per step of might.
    pub might_weight: i32,
    /// Players may roll without GM moderation.
    pub skip_moderation: bool,
    /// Cap on fellowship experience gained from weaknesses.
    pub max_fellowship_experience: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            burn_value: BURN_VALUE,
            might_weight: 3,
            skip_moderation: true,
            max_fellowship_experience: 3,
        }
    }
}

impl EngineConfig {
    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> LitmResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the power per burned tag.
    pub fn with_burn_value(mut self, burn_value: i32) -> Self {
        self.burn_value = burn_value;
        self
    }

    /// Set the power per step of might.
    pub fn with_might_weight(mut self, might_weight: i32) -> Self {
        self.might_weight = might_weight;
        self
    }

    /// Require GM moderation for player rolls.
    pub fn with_moderation(mut self) -> Self {
        self.skip_moderation = false;
        self
    }

    /// The power calculator these settings describe.
    pub fn calculator(&self) -> PowerCalculator {
        PowerCalculator {
            burn_value: self.burn_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.burn_value, 3);
        assert_eq!(cfg.might_weight, 3);
        assert!(cfg.skip_moderation);
        assert_eq!(cfg.max_fellowship_experience, 3);
    }

    #[test]
    fn builder_methods() {
        let cfg = EngineConfig::default()
            .with_burn_value(4)
            .with_might_weight(2)
            .with_moderation();
        assert_eq!(cfg.calculator().burn_value, 4);
        assert_eq!(cfg.might_weight, 2);
        assert!(!cfg.skip_moderation);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = EngineConfig::from_json(r#"{"skipModeration": false}"#).unwrap();
        assert!(!cfg.skip_moderation);
        assert_eq!(cfg.burn_value, 3);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(EngineConfig::from_json("{").is_err());
    }
}
