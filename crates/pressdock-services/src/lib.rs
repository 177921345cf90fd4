//! # Pressdock Services
//!
//! Clients for the external tools pressdock drives:
//! - **Compose**: `docker compose` start/stop/exec/cp
//! - **WP-CLI**: WordPress administration inside the helper service
//! - **Template**: one-time rendering of the compose file

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compose;
pub mod wpcli;
pub mod template;

#[cfg(test)]
mod testing;

pub use compose::{Compose, ComposeConfig};
pub use wpcli::{SiteInstall, WpCli};
