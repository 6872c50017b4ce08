//! # Memory Budget Configuration
//!
//! Every allocator in the engine has a fixed budget decided up front;
//! exceeding one at runtime is treated as a configuration error, not a
//! recoverable fault. This module is where those budgets live.
//!
//! Budgets are plain data: serializable, defaulted, and loadable from TOML
//! so capacity planning can live next to the rest of the application config.

use serde::{Deserialize, Serialize};

use crate::render::mesh_stream::StreamPolicy;

/// Errors raised while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The TOML source failed to parse or did not match the schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A budget value fails validation
    #[error("Invalid config value: {reason}")]
    Invalid {
        /// Description of the failed validation
        reason: String,
    },
}

/// Fixed per-frame and persistent memory budgets.
///
/// Pool capacities must account for growable-list growth waste: every list
/// growth abandons its previous view inside the shared pool until the next
/// reset, so the worst case is cumulative, not the peak live element count.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Frame arena capacity in bytes
    pub frame_arena_bytes: usize,
    /// Shared draw-surface pool capacity, in surfaces, per view
    pub surface_pool_capacity: usize,
    /// Dynamic ring buffer capacity in bytes
    pub ring_buffer_bytes: u64,
    /// Per-flush vertex byte budget for the mesh stream
    pub stream_vertex_budget: u64,
    /// Per-flush index byte budget for the mesh stream
    pub stream_index_budget: u64,
    /// Lifetime policy of the mesh-stream cursors
    pub stream_policy: StreamPolicy,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            frame_arena_bytes: 16 * 1024 * 1024,
            surface_pool_capacity: 4096,
            ring_buffer_bytes: 8 * 1024 * 1024,
            stream_vertex_budget: 64 * 1024 * 1024,
            stream_index_budget: 16 * 1024 * 1024,
            stream_policy: StreamPolicy::Persistent,
        }
    }
}

impl MemoryConfig {
    /// Parse a configuration from TOML text and validate the budgets.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every budget is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_arena_bytes == 0 {
            return Err(ConfigError::Invalid {
                reason: "frame_arena_bytes must be non-zero".to_string(),
            });
        }
        if self.surface_pool_capacity == 0 {
            return Err(ConfigError::Invalid {
                reason: "surface_pool_capacity must be non-zero".to_string(),
            });
        }
        if self.ring_buffer_bytes == 0 {
            return Err(ConfigError::Invalid {
                reason: "ring_buffer_bytes must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(MemoryConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_toml_overrides_defaults() {
        let config = MemoryConfig::from_toml_str(
            r#"
            frame_arena_bytes = 1048576
            surface_pool_capacity = 256
            stream_policy = "initial_load_only"
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.frame_arena_bytes, 1_048_576);
        assert_eq!(config.surface_pool_capacity, 256);
        assert_eq!(config.stream_policy, StreamPolicy::InitialLoadOnly);
        // Unspecified fields keep their defaults
        assert_eq!(config.ring_buffer_bytes, MemoryConfig::default().ring_buffer_bytes);
    }

    #[test]
    fn test_zero_budget_rejected() {
        let result = MemoryConfig::from_toml_str("frame_arena_bytes = 0");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }
}
