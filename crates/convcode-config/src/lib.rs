//! Coder profile management
//!
//! This crate provides configuration loading and parsing for the convcode
//! engine:
//! - TOML configuration file parsing
//! - Named coder profiles for well-known codes

pub mod profile;
pub mod toml_config;

pub use profile::*;
pub use toml_config::*;
