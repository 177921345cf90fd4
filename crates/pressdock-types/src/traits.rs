//! Core trait definitions for pressdock abstractions.

use async_trait::async_trait;
use std::fmt;
use crate::errors::Result;

/// A fully specified external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to execute (looked up on `PATH`)
    pub program: String,
    /// Arguments, passed verbatim
    pub args: Vec<String>,
    /// Values that must never appear in logs or error messages
    pub redact: Vec<String>,
    /// Text fed to the program's standard input; `None` closes it
    pub stdin: Option<String>,
}

impl Invocation {
    /// Create an invocation without arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            redact: Vec::new(),
            stdin: None,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Mark a value as secret for display purposes.
    pub fn redacting(mut self, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        if !secret.is_empty() {
            self.redact.push(secret);
        }
        self
    }

    /// Feed `input` to standard input instead of passing it as an argument.
    ///
    /// Large bodies belong here; argv is bounded by the system's `ARG_MAX`.
    pub fn with_stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Command line for logs, with secrets masked.
    pub fn display_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        self.mask(&line)
    }

    /// Replace every secret of this invocation found in `text`.
    pub fn mask(&self, text: &str) -> String {
        let mut masked = text.to_string();
        for secret in &self.redact {
            masked = masked.replace(secret.as_str(), "***REDACTED***");
        }
        masked
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_line())
    }
}

/// Captured result of an external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit status (`-1` when terminated by a signal)
    pub status: i32,
    /// Standard output, trimmed
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl CommandOutput {
    /// Successful output with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given status and stderr.
    pub fn failed(status: i32, stderr: impl Into<String>) -> Self {
        Self {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Check if the command exited with status zero.
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Trait for executing external commands.
///
/// Implementations only return `Err` when the process could not be started;
/// a non-zero exit status is reported through [`CommandOutput::status`] and
/// interpreted by the caller. No retries happen at this layer.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion and capture its output.
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput>;
}
