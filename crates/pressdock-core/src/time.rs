//! Time and duration utilities.

use chrono::{Duration, Local};

/// Format a duration in human-readable form.
pub fn pretty_duration(duration: Duration) -> String {
    let secs = duration.num_seconds();

    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        format!("{}h {}m", hours, mins)
    }
}

/// Wall-clock time of day used to prefix progress messages.
pub fn clock() -> String {
    Local::now().format("%H:%M:%S").to_string()
}
