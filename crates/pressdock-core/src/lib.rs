//! # Pressdock Core
//!
//! Core utilities, configuration management, logging, and common functionality
//! for the pressdock provisioning tool.
//!
//! This crate provides:
//!
//! - **Configuration**: the optional `pressdock.yml` project file
//! - **Logging**: `tracing` subscriber setup
//! - **Terminal**: timestamped progress lines
//! - **Process Execution**: the system [`util::SystemRunner`]
//! - **File Operations**: path expansion, file counting
//! - **Time Utilities**: formatting durations and clock prefixes
//!
//! ## Example
//!
//! ```no_run
//! use pressdock_core::config::ProjectConfig;
//!
//! let config = ProjectConfig::load("pressdock.yml")?;
//! pressdock_core::log::init(&config.logging)?;
//! # Ok::<(), pressdock_types::PressdockError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod log;
pub mod term;
pub mod util;
pub mod time;

// Re-export commonly used items
pub use config::{ProjectConfig, DEFAULT_CONFIG_FILE};
pub use pressdock_types::{PressdockError, Result};

/// pressdock application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// pressdock application name
pub const APP_NAME: &str = "pressdock";
