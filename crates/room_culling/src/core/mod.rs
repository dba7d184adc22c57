//! # Core Module
//!
//! Shared configuration records used by both engines.
//!
//! ## Organization
//!
//! - **Config**: culling and channel configuration with clamping validation

pub mod config;

// Re-export commonly used config types
pub use config::{
    ChannelConfig,
    Config,
    ConfigError,
    CullingConfig,
    RoomSystemConfig,
};
