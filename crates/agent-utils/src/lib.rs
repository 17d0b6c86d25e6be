//! Shared utilities for invest-agent-rs
//!
//! This crate provides the process-wide pieces every binary in the workspace
//! needs at startup: tracing setup and the read-only [`AppConfig`].

pub mod config;
pub mod logging;

pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use logging::{Verbosity, init_tracing, init_tracing_with_level};
