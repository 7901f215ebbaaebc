//! Core shared library for the HelixQL grammar tooling.
//!
//! This crate exposes the pieces every other crate in the workspace leans
//! on: the common error type, configuration loading and logging setup.

pub mod config;
pub mod errors;
pub mod logging;

pub use config::{load_core_config, CoreConfig};
pub use errors::{ConfigError, HelixError};
