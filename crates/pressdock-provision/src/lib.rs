//! # Pressdock Provision
//!
//! The provisioning sequence for a local WordPress stack:
//! - **Poller**: bounded readiness waits
//! - **Steps**: idempotent check-then-act and upsert primitives, and the
//!   concrete core, plugin, theme and preference steps
//! - **Sequencer**: the state machine tying it together, with guaranteed
//!   helper cleanup
//! - **Report**: a record of what a run did

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod poller;
pub mod step;
pub mod steps;
pub mod sequencer;
pub mod report;

#[cfg(test)]
mod testing;

pub use poller::{wait_until_ready, RetryPolicy};
pub use report::ProvisionReport;
pub use sequencer::{HelperGuard, Sequencer};
pub use step::{StepOutcome, StepRecord};
