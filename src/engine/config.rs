//! Engine configuration options.
//!
//! One struct, validated once at construction. Everything here is a plain
//! value so a config can be cloned into tests and tweaked per scenario.

use thiserror::Error;

use crate::math::Fixed;
use crate::risk::RiskParams;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Practice balance granted to every user at registration.
    pub starting_balance: Fixed,
    /// Risk parameters shared by every trading pair.
    pub risk: RiskParams,
    /// Maximum number of events to retain in memory. Oldest drain first.
    pub max_events: usize,
    /// Enable verbose logging.
    pub verbose: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_balance: Fixed::from_int(10_000),
            risk: RiskParams::default(),
            max_events: 10_000,
            verbose: false,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.starting_balance.is_zero() {
            return Err(ConfigError::ZeroStartingBalance);
        }
        if self.max_events == 0 {
            return Err(ConfigError::ZeroEventCapacity);
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Starting balance must be positive")]
    ZeroStartingBalance,

    #[error("Event capacity must be positive")]
    ZeroEventCapacity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_starting_balance() {
        let config = EngineConfig {
            starting_balance: Fixed::ZERO,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroStartingBalance));
    }

    #[test]
    fn rejects_zero_event_capacity() {
        let config = EngineConfig {
            max_events: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroEventCapacity));
    }
}
