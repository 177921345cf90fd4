//! Record of one provisioning run.

use chrono::{DateTime, Utc};
use pressdock_types::{PressdockError, ProvisionState};
use serde::Serialize;

use crate::step::{StepOutcome, StepRecord};

/// Provisioning run record.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionReport {
    /// Start timestamp
    pub started_at: DateTime<Utc>,

    /// End timestamp
    pub finished_at: Option<DateTime<Utc>>,

    /// States entered, in order, starting with `Init`
    pub states: Vec<ProvisionState>,

    /// Credential keys generated by this run
    pub generated_keys: Vec<String>,

    /// Whether the compose file was rendered by this run
    pub rendered_compose: bool,

    /// Attempt at which the database answered
    pub readiness_attempts: Option<u32>,

    /// Steps executed after the database became ready
    pub steps: Vec<StepRecord>,

    /// Whether the helper service was stopped
    pub helper_stopped: bool,

    /// Error category if failed
    pub error_kind: Option<&'static str>,

    /// Error message if failed
    pub error: Option<String>,
}

impl ProvisionReport {
    /// Create a record for a run starting now.
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            states: vec![ProvisionState::Init],
            generated_keys: Vec::new(),
            rendered_compose: false,
            readiness_attempts: None,
            steps: Vec::new(),
            helper_stopped: false,
            error_kind: None,
            error: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> ProvisionState {
        self.states.last().copied().unwrap_or(ProvisionState::Init)
    }

    /// Mark the run as finished.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Mark the run as failed.
    pub fn fail(&mut self, error: &PressdockError) {
        self.error_kind = Some(error.kind());
        self.error = Some(error.to_string());
        self.finish();
    }

    /// Whether the run reached `Done`.
    pub fn is_success(&self) -> bool {
        self.state() == ProvisionState::Done
    }

    /// Elapsed time, up to now for a running sequence.
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at.unwrap_or_else(Utc::now) - self.started_at
    }

    /// Steps that changed something.
    pub fn changed_steps(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps.iter().filter(|s| s.outcome.changed())
    }

    /// Steps whose failure was tolerated.
    pub fn tolerated_steps(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, StepOutcome::Tolerated(_)))
    }
}

impl Default for ProvisionReport {
    fn default() -> Self {
        Self::new()
    }
}
