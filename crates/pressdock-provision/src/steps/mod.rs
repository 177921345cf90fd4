//! Provisioning steps, one module per sequencer phase.

pub mod base;
pub mod plugins;
pub mod theme;
pub mod preferences;

use pressdock_core::ProjectConfig;
use pressdock_secrets::SiteCredentials;
use pressdock_services::{Compose, WpCli};

/// Everything a step needs to talk to the running stack.
pub struct StepContext<'a> {
    /// Project configuration
    pub config: &'a ProjectConfig,
    /// Site values from the credential store
    pub credentials: &'a SiteCredentials,
    /// Orchestrator client (redacting)
    pub compose: &'a Compose,
    /// WP-CLI client bound to the helper service
    pub wp: &'a WpCli,
}
