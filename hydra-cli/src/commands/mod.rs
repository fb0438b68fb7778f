//! CLI command implementations.
//!
//! - [`config`] - Configuration management (path, show, init)
//! - [`system`] - Hardware detection report

pub mod config;
pub mod system;
