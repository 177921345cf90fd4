//! Credential store validation.
//!
//! Hand-edited stores can drift from the generated formats. Validation only
//! reports; pressdock never rewrites a key that is already present.

use crate::plan::{CredentialPlan, Seed};
use crate::random::is_hex_secret;
use crate::store::EnvStore;

/// Summary of validation results.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ValidationSummary {
    /// Keys that match their planned format
    pub ok: Vec<String>,
    /// Keys that are missing
    pub missing: Vec<String>,
    /// Keys present in a different format (key, warning)
    pub warnings: Vec<(String, String)>,
}

impl ValidationSummary {
    /// Check if every planned key is present.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Get total count of planned keys.
    pub fn total(&self) -> usize {
        self.ok.len() + self.missing.len() + self.warnings.len()
    }
}

/// Compare a store against a plan.
pub fn check(plan: &CredentialPlan, store: &EnvStore) -> ValidationSummary {
    let mut summary = ValidationSummary::default();

    for entry in plan.entries() {
        let key = entry.key.to_string();
        match (store.get(entry.key), &entry.seed) {
            (None, _) => summary.missing.push(key),
            (Some(value), Seed::Random(bytes)) if !is_hex_secret(value, *bytes) => {
                summary.warnings.push((
                    key,
                    format!("expected {} lowercase hex characters, found {}", bytes * 2, value.len()),
                ));
            }
            (Some(value), Seed::Default(_)) if value.is_empty() => {
                summary.warnings.push((key, "value is empty".to_string()));
            }
            _ => summary.ok.push(key),
        }
    }

    summary
}
