//! Idempotent step primitives.
//!
//! Every provisioning action is either guarded by a read-only check
//! ([`ensure`]) or written as find-then-update-or-create ([`upsert`]), so a
//! rerun against a provisioned site changes nothing.

use pressdock_types::{Result, StepPolicy};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use tracing::{debug, warn};

/// What a step did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "outcome", content = "detail")]
pub enum StepOutcome {
    /// The check found the work already done
    Skipped,
    /// The action ran
    Applied,
    /// A new object was created
    Created(u64),
    /// An existing object was updated in place
    Updated(u64),
    /// A best-effort action failed and was ignored
    Tolerated(String),
}

impl StepOutcome {
    /// Whether the step changed anything.
    pub fn changed(&self) -> bool {
        matches!(self, StepOutcome::Applied | StepOutcome::Created(_) | StepOutcome::Updated(_))
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Skipped => f.write_str("already done"),
            StepOutcome::Applied => f.write_str("applied"),
            StepOutcome::Created(id) => write!(f, "created #{}", id),
            StepOutcome::Updated(id) => write!(f, "updated #{}", id),
            StepOutcome::Tolerated(reason) => write!(f, "ignored failure: {}", reason),
        }
    }
}

/// A named step and its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    /// Human-readable step name
    pub name: String,
    /// What happened
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

impl StepRecord {
    /// Create a new record.
    pub fn new(name: impl Into<String>, outcome: StepOutcome) -> Self {
        Self {
            name: name.into(),
            outcome,
        }
    }
}

/// Run `action` only when `check` reports the work is not done yet.
pub async fn ensure<C, CF, A, AF>(name: &str, check: C, action: A) -> Result<StepRecord>
where
    C: FnOnce() -> CF,
    CF: Future<Output = Result<bool>>,
    A: FnOnce() -> AF,
    AF: Future<Output = Result<()>>,
{
    if check().await? {
        debug!("{}: already done", name);
        return Ok(StepRecord::new(name, StepOutcome::Skipped));
    }

    action().await?;
    Ok(StepRecord::new(name, StepOutcome::Applied))
}

/// Update the object `find` locates, or create it.
///
/// Exactly one of `update` and `create` runs. Returns the record together
/// with the object id, which callers usually need to link the object.
pub async fn upsert<F, FF, U, UF, C, CF>(
    name: &str,
    find: F,
    update: U,
    create: C,
) -> Result<(StepRecord, u64)>
where
    F: FnOnce() -> FF,
    FF: Future<Output = Result<Option<u64>>>,
    U: FnOnce(u64) -> UF,
    UF: Future<Output = Result<()>>,
    C: FnOnce() -> CF,
    CF: Future<Output = Result<u64>>,
{
    match find().await? {
        Some(id) => {
            update(id).await?;
            debug!("{}: updated #{}", name, id);
            Ok((StepRecord::new(name, StepOutcome::Updated(id)), id))
        }
        None => {
            let id = create().await?;
            debug!("{}: created #{}", name, id);
            Ok((StepRecord::new(name, StepOutcome::Created(id)), id))
        }
    }
}

/// Record a write that reports success as a boolean.
///
/// A `false` result under [`StepPolicy::BestEffort`] becomes
/// [`StepOutcome::Tolerated`]; fatal writes never get here with `false`
/// because the client already returned an error.
pub fn record_write(name: &str, policy: StepPolicy, applied: bool) -> StepRecord {
    if applied {
        StepRecord::new(name, StepOutcome::Applied)
    } else {
        if !policy.is_best_effort() {
            warn!("{}: fatal write reported failure without an error", name);
        }
        StepRecord::new(name, StepOutcome::Tolerated("command exited non-zero".to_string()))
    }
}
