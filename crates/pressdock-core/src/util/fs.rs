//! Filesystem utilities.

use pressdock_types::Result;
use std::path::{Path, PathBuf};
use std::fs;
use walkdir::WalkDir;

/// Expand path with tilde.
pub fn expand_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();

    // Handle tilde expansion
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }

    path.to_path_buf()
}

/// Read entire file as string (slurp).
pub fn slurp(path: impl AsRef<Path>) -> Result<String> {
    fs::read_to_string(path).map_err(Into::into)
}

/// Count regular files below a directory, following no symlinks.
pub fn count_files(dir: impl AsRef<Path>) -> Result<usize> {
    let mut count = 0;
    for entry in WalkDir::new(dir.as_ref()) {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() {
            count += 1;
        }
    }
    Ok(count)
}
