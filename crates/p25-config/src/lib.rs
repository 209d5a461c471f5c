//! Console configuration management
//!
//! This crate provides configuration loading and parsing for the P25 console engine:
//! - TOML configuration file parsing
//! - Console-wide network identity and hold limits
//! - Per-channel talkgroup and key binding, including key material

pub mod console_config;
pub mod console_config_channel;
pub mod toml_config;

pub use console_config::*;
pub use console_config_channel::CfgChannel;
pub use toml_config::*;
