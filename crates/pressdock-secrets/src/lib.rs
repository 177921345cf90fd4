//! # Pressdock Secrets
//!
//! Credential store and secret generation.
//!
//! - [`store::EnvStore`]: the append-only `KEY="value"` file
//! - [`random`]: lowercase hex secrets of a fixed byte length
//! - [`plan::CredentialPlan`]: the 17 keys a WordPress stack needs
//! - [`validator`]: format checks for hand-edited stores

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod store;
pub mod random;
pub mod plan;
pub mod validator;

pub use store::EnvStore;
pub use plan::{CredentialPlan, SiteCredentials};
pub use random::random_hex;
