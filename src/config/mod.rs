//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig, IdleTimeoutsConfig)
//! - [`listen`]: Network listener configuration (ListenConfig)
//! - [`limits`]: Per-connection and actor limits (LimitsConfig)
//! - [`validation`]: Startup checks returning every problem found

mod limits;
mod listen;
mod types;
mod validation;

pub use types::Config;
pub use validation::validate;
