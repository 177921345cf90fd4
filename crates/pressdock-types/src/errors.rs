//! Error types for pressdock operations.

use thiserror::Error;

/// The main error type for pressdock operations.
///
/// Every variant except [`PressdockError::Io`], [`PressdockError::Yaml`] and
/// [`PressdockError::Json`] maps to one category of the provisioning error
/// taxonomy. All of them are fatal for the run that raised them; best-effort
/// steps never surface an error at all.
#[derive(Error, Debug)]
pub enum PressdockError {
    /// A required tool, template, or source directory is absent
    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    /// Configuration or credential store error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A dependency never answered its readiness probe
    #[error("{target} was not ready after {attempts} attempts")]
    ReadinessTimeout {
        /// What was being probed
        target: String,
        /// Number of probe invocations made
        attempts: u32,
    },

    /// An external command exited non-zero
    #[error("Step '{step}' failed: `{command}` exited with status {status}{}", format_stderr(.stderr))]
    StepExecution {
        /// Name of the provisioning step
        step: String,
        /// Command line, with secrets redacted
        command: String,
        /// Exit status reported by the process
        status: i32,
        /// Diagnostic output of the external tool
        stderr: String,
    },

    /// Compose template rendering error
    #[error("Template error: {0}")]
    Template(String),

    /// Secret generation error
    #[error("Secret error: {0}")]
    Secret(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The run was interrupted by the operator
    #[error("Interrupted")]
    Interrupted,

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal bug - should never happen in production
    #[error("Bug detected: {0}\n\nThis is an internal error. Please report this issue at:\nhttps://github.com/pressdock/pressdock/issues")]
    Bug(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("\n{}", trimmed)
    }
}

impl PressdockError {
    /// Short category name, used in run reports.
    pub fn kind(&self) -> &'static str {
        match self {
            PressdockError::MissingDependency(_) => "missing-dependency",
            PressdockError::Config(_) => "config",
            PressdockError::ReadinessTimeout { .. } => "readiness-timeout",
            PressdockError::StepExecution { .. } => "step-execution",
            PressdockError::Template(_) => "template",
            PressdockError::Secret(_) => "secret",
            PressdockError::Validation(_) => "validation",
            PressdockError::Interrupted => "interrupted",
            PressdockError::Io(_) => "io",
            PressdockError::Yaml(_) => "yaml",
            PressdockError::Json(_) => "json",
            PressdockError::Bug(_) => "bug",
            PressdockError::Other(_) => "other",
        }
    }
}

/// A specialized Result type for pressdock operations.
pub type Result<T> = std::result::Result<T, PressdockError>;

/// Helper macro to create and return a PressdockError::Bug
///
/// This should be used for conditions that should never occur
/// in normal operation and indicate a bug in pressdock itself.
///
/// # Example
///
/// ```ignore
/// if some_impossible_condition {
///     bug!("This should never happen: {:?}", condition);
/// }
/// ```
#[macro_export]
macro_rules! bug {
    ($msg:expr) => {
        return Err($crate::PressdockError::Bug($msg.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::PressdockError::Bug(format!($fmt, $($arg)*)))
    };
}

/// Helper macro to bail out with a PressdockError
///
/// This is used for expected error conditions.
///
/// # Example
///
/// ```ignore
/// if !template.exists() {
///     bail!(MissingDependency, "compose template not found: {:?}", template);
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($variant:ident, $msg:expr) => {
        return Err($crate::PressdockError::$variant($msg.to_string()))
    };
    ($variant:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::PressdockError::$variant(format!($fmt, $($arg)*)))
    };
    ($msg:expr) => {
        return Err($crate::PressdockError::Other($msg.to_string()))
    };
}
