//! Bot configuration with documented constants
//!
//! All tunable numbers of the dispatch core are collected here with an
//! explanation of what they influence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{CommanderError, Result};
use crate::order::DEFAULT_RADIUS;

/// Configuration for one bot session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    // === ORDERS ===
    /// Proximity radius given to orders that do not specify one (map units)
    ///
    /// Used both as the jitter radius of near-location orders and as the
    /// assignee search radius of orders with an assignee location.
    /// Orders built through the typed constructors start at
    /// [`DEFAULT_RADIUS`]; the strategy loader and the orders a session
    /// creates for its own workers read this value instead.
    pub default_radius: f32,

    /// Radius around the home townhall in which new army units get their
    /// assigned location
    ///
    /// Small on purpose: army units should gather close to their base
    /// without stacking on a single point.
    pub army_spawn_jitter: f32,

    // === ECONOMY ===
    /// Number of mineral workers moved onto a gas structure when it finishes
    pub gas_workers_per_structure: usize,

    /// A geyser with any gas structure closer than this is considered claimed
    pub geyser_claim_radius: f32,

    // === REACTIONS ===
    /// Health fraction under which a damaged blink-capable unit blinks home
    pub blink_health_fraction: f32,

    // === DETERMINISM ===
    /// Seed of the session RNG used for every jittered location
    pub seed: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            default_radius: DEFAULT_RADIUS,
            army_spawn_jitter: 2.5,
            gas_workers_per_structure: 3,
            geyser_claim_radius: 1.0,
            blink_health_fraction: 0.5,
            seed: 0x5eed,
        }
    }
}

impl BotConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from a TOML string; missing keys keep their defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: BotConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.default_radius <= 0.0 || self.army_spawn_jitter < 0.0 {
            return Err(CommanderError::Config(format!(
                "radii must be positive (default_radius = {}, army_spawn_jitter = {})",
                self.default_radius, self.army_spawn_jitter
            )));
        }

        if !(0.0..=1.0).contains(&self.blink_health_fraction) {
            return Err(CommanderError::Config(format!(
                "blink_health_fraction ({}) must lie in [0, 1]",
                self.blink_health_fraction
            )));
        }

        if self.geyser_claim_radius < 0.0 {
            return Err(CommanderError::Config("geyser_claim_radius must not be negative".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(BotConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_radius_matches_order_constructors() {
        assert_eq!(BotConfig::default().default_radius, DEFAULT_RADIUS);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = BotConfig::from_toml("seed = 42\ngas_workers_per_structure = 2\n").unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.gas_workers_per_structure, 2);
        assert_eq!(config.default_radius, 12.0);
    }

    #[test]
    fn test_invalid_blink_fraction_rejected() {
        let result = BotConfig::from_toml("blink_health_fraction = 1.5\n");
        assert!(matches!(result, Err(CommanderError::Config(_))));
    }

    #[test]
    fn test_negative_radius_rejected() {
        let config = BotConfig {
            default_radius: -1.0,
            ..BotConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
