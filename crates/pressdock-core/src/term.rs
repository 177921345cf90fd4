//! Terminal output for operator-facing progress messages.
//!
//! Progress lines go to stdout with a wall-clock prefix, independent of the
//! tracing subscriber, so the operator always sees which step is running.

use colored::*;
use std::io::{self, IsTerminal};

use crate::time::clock;

/// Check if we're running in a controlling terminal.
pub fn in_controlling_terminal() -> bool {
    io::stdout().is_terminal()
}

/// Disable colors when stdout is not a terminal.
pub fn configure_colors() {
    if !in_controlling_terminal() {
        colored::control::set_override(false);
    }
}

/// Format a progress line: `[HH:MM:SS] ==> message`.
pub fn progress_line(message: &str) -> String {
    format!("[{}] {} {}", clock().dimmed(), "==>".cyan().bold(), message)
}

/// Announce the start of a major step.
pub fn step(message: &str) {
    println!("{}", progress_line(message));
}

/// Report a successful outcome.
pub fn success(message: &str) {
    println!("[{}] {} {}", clock().dimmed(), "✓".green().bold(), message);
}

/// Report a tolerated problem.
pub fn warn(message: &str) {
    println!("[{}] {} {}", clock().dimmed(), "!".yellow().bold(), message);
}
