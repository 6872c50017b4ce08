//! Core engine modules
//!
//! Configuration types shared by the frame driver and the memory subsystems.

pub mod config;

pub use config::{ConfigError, MemoryConfig};
