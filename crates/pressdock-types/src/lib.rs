//! # Pressdock Types
//!
//! Core types, traits, and enums shared across all pressdock crates.
//!
//! This crate provides the fundamental building blocks for the pressdock
//! provisioning tool, including:
//!
//! - Type-safe wrappers for store keys, service names and slugs
//! - The provisioning state machine and step policies
//! - The command runner seam used to reach external tools
//! - Typed configuration sections
//! - Error types and result aliases
//!
//! ## Example
//!
//! ```
//! use pressdock_types::{ProvisionState, ServiceName};
//!
//! let helper = ServiceName::new("wpcli").unwrap();
//! assert_eq!(helper.as_str(), "wpcli");
//!
//! assert!(ProvisionState::Init.can_transition_to(ProvisionState::ConfigReady));
//! assert!(ProvisionState::ThemeDeploying.can_transition_to(ProvisionState::Failed));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod identifiers;
pub mod enums;
pub mod traits;
pub mod config;

// Re-export common types for convenience
pub use errors::{PressdockError, Result};
pub use identifiers::{ConfigKey, ServiceName, Slug};
pub use enums::{LogLevel, ProvisionState, StepPolicy};
pub use traits::{CommandOutput, CommandRunner, Invocation};
