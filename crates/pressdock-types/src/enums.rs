//! Common enumerations used throughout pressdock.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::errors::{PressdockError, Result};

/// Log level enumeration for the logging system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Detailed trace messages
    Trace,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl FromStr for LogLevel {
    type Err = PressdockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(PressdockError::Validation(format!("Invalid log level: {}", s))),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_directive())
    }
}

/// States of the provisioning sequence.
///
/// The happy path visits every state from [`ProvisionState::Init`] to
/// [`ProvisionState::Done`] in declaration order. [`ProvisionState::Failed`]
/// is reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProvisionState {
    /// Nothing done yet
    Init,
    /// Credential store loaded and completed
    ConfigReady,
    /// Start command issued to the orchestrator
    StackStarting,
    /// Orchestrator accepted the start command
    StackReady,
    /// Polling the database
    WaitingForDependency,
    /// Database answered its probe
    DependencyReady,
    /// Checking or installing WordPress core
    BaseInstalling,
    /// Installing and activating plugins
    PluginsInstalling,
    /// Copying and activating the custom theme
    ThemeDeploying,
    /// Writing options, theme mods and custom CSS
    PreferencesApplying,
    /// Transient CLI helper stopped
    HelperStopped,
    /// Sequence completed
    Done,
    /// Sequence aborted
    Failed,
}

impl ProvisionState {
    /// All states of the happy path, in order.
    pub const SEQUENCE: [ProvisionState; 12] = [
        ProvisionState::Init,
        ProvisionState::ConfigReady,
        ProvisionState::StackStarting,
        ProvisionState::StackReady,
        ProvisionState::WaitingForDependency,
        ProvisionState::DependencyReady,
        ProvisionState::BaseInstalling,
        ProvisionState::PluginsInstalling,
        ProvisionState::ThemeDeploying,
        ProvisionState::PreferencesApplying,
        ProvisionState::HelperStopped,
        ProvisionState::Done,
    ];

    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProvisionState::Done | ProvisionState::Failed)
    }

    /// Whether `next` is a legal transition from this state.
    ///
    /// Forward moves along the happy path are legal; `BaseInstalling` may be
    /// entered and left without work, and `Failed` is reachable from any
    /// non-terminal state.
    pub fn can_transition_to(&self, next: ProvisionState) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == ProvisionState::Failed {
            return true;
        }
        let position = |s: ProvisionState| Self::SEQUENCE.iter().position(|x| *x == s);
        match (position(*self), position(next)) {
            (Some(from), Some(to)) => to == from + 1,
            _ => false,
        }
    }
}

impl fmt::Display for ProvisionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProvisionState::Init => "init",
            ProvisionState::ConfigReady => "config-ready",
            ProvisionState::StackStarting => "stack-starting",
            ProvisionState::StackReady => "stack-ready",
            ProvisionState::WaitingForDependency => "waiting-for-dependency",
            ProvisionState::DependencyReady => "dependency-ready",
            ProvisionState::BaseInstalling => "base-installing",
            ProvisionState::PluginsInstalling => "plugins-installing",
            ProvisionState::ThemeDeploying => "theme-deploying",
            ProvisionState::PreferencesApplying => "preferences-applying",
            ProvisionState::HelperStopped => "helper-stopped",
            ProvisionState::Done => "done",
            ProvisionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// How a step failure affects the rest of the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepPolicy {
    /// Failure aborts the sequence
    Fatal,
    /// Failure is logged and the sequence continues
    BestEffort,
}

impl StepPolicy {
    /// Whether failures under this policy are tolerated.
    pub fn is_best_effort(&self) -> bool {
        matches!(self, StepPolicy::BestEffort)
    }
}

impl Default for StepPolicy {
    fn default() -> Self {
        StepPolicy::Fatal
    }
}
