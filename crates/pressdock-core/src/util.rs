//! Common utility functions.

pub mod process;
pub mod fs;

// Re-export commonly used items
pub use process::SystemRunner;
pub use fs::{expand_path, slurp, count_files};
