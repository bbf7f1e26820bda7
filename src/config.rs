//! World configuration

use serde::{Deserialize, Serialize};

use crate::entity::DrainOrder;
use crate::error::{EcsError, Result};
use crate::storage::INDEX_BLOCKS;

/// Sizing and queue behaviour for a [`World`](crate::World).
///
/// ```
/// use sparse_ecs::config::WorldConfig;
/// use sparse_ecs::entity::DrainOrder;
///
/// let config = WorldConfig::from_json_str(r#"{ "drain_order": "fifo" }"#).unwrap();
/// assert_eq!(config.drain_order, DrainOrder::Fifo);
/// assert_eq!(config.initial_entity_capacity, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Entity table slots allocated up front; the table doubles past this
    pub initial_entity_capacity: usize,
    /// Block index length given to every store at registration
    pub index_blocks: usize,
    /// Order in which the admit, reconsider and evict queues drain
    pub drain_order: DrainOrder,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            initial_entity_capacity: 64,
            index_blocks: INDEX_BLOCKS,
            drain_order: DrainOrder::Lifo,
        }
    }
}

impl WorldConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.initial_entity_capacity == 0 {
            return Err(EcsError::Config(
                "initial_entity_capacity must be at least 1".into(),
            ));
        }
        if self.index_blocks == 0 {
            return Err(EcsError::Config("index_blocks must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(WorldConfig::from_json_str("{}").unwrap(), WorldConfig::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = WorldConfig {
            initial_entity_capacity: 1024,
            index_blocks: 4,
            drain_order: DrainOrder::Fifo,
        };
        let json = config.to_json_string().unwrap();
        assert!(json.contains("\"fifo\""));
        assert_eq!(WorldConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_zero_sizes() {
        let err = WorldConfig::from_json_str(r#"{ "index_blocks": 0 }"#).unwrap_err();
        assert!(matches!(err, EcsError::Config(_)));
        assert!(WorldConfig::from_json_str(r#"{ "initial_entity_capacity": 0 }"#).is_err());
    }

    #[test]
    fn test_malformed_json() {
        let err = WorldConfig::from_json_str(r#"{ "drain_order": "sideways" }"#).unwrap_err();
        assert!(err.to_string().starts_with("Config error:"));
    }
}
