//! Persisted credential store.
//!
//! The store is a dotenv-style file of `KEY="value"` lines shared between
//! pressdock and the compose stack. It is human-editable and machine-appended:
//! pressdock only ever appends keys it generated, and never rewrites a key
//! that is already present.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use pressdock_types::{ConfigKey, PressdockError, Result};
use regex::Regex;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::random::random_hex;

static ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:export\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*=(.*)$").unwrap()
});

/// Key-value credential store backed by an append-only file.
#[derive(Debug, Clone)]
pub struct EnvStore {
    path: PathBuf,
    entries: IndexMap<String, String>,
    pending: Vec<String>,
    existed: bool,
}

impl EnvStore {
    /// Load the store from `path`.
    ///
    /// A missing file yields an empty store. A file that exists but cannot
    /// be read or contains an unparseable line is a `Config` error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut entries = IndexMap::new();
        let existed = path.exists();

        if existed {
            let content = fs::read_to_string(&path).map_err(|e| {
                PressdockError::Config(format!("Failed to read credential store {:?}: {}", path, e))
            })?;

            for (index, line) in content.lines().enumerate() {
                if let Some((key, value)) = parse_line(line).map_err(|reason| {
                    PressdockError::Config(format!("{:?} line {}: {}", path, index + 1, reason))
                })? {
                    entries.insert(key, value);
                }
            }
            debug!("Loaded {} entries from {:?}", entries.len(), path);
        }

        Ok(Self {
            path,
            entries,
            pending: Vec::new(),
            existed,
        })
    }

    /// Backing file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the backing file existed when the store was loaded.
    pub fn existed(&self) -> bool {
        self.existed
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Look up a value that must be present.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| {
            PressdockError::Config(format!("{} is not set in {:?}", key, self.path))
        })
    }

    /// Check if a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in file order, followed by entries added this run.
    pub fn entries(&self) -> &IndexMap<String, String> {
        &self.entries
    }

    /// Keys added this run and not yet persisted, in creation order.
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    /// Set `key` to `value` unless it is already present.
    ///
    /// Returns whether the key was added.
    pub fn ensure_default(&mut self, key: &str, value: impl Into<String>) -> Result<bool> {
        if !ConfigKey::is_valid(key) {
            return Err(PressdockError::Validation(format!("Invalid store key '{}'", key)));
        }
        if self.entries.contains_key(key) {
            return Ok(false);
        }

        let value = value.into();
        if value.contains(['\n', '\r']) {
            return Err(PressdockError::Validation(format!(
                "Value for {} must be a single line",
                key
            )));
        }

        self.entries.insert(key.to_string(), value);
        self.pending.push(key.to_string());
        Ok(true)
    }

    /// Set `key` to a fresh hex secret of `length` bytes unless present.
    ///
    /// Returns whether the key was added.
    pub fn ensure_random(&mut self, key: &str, length: usize) -> Result<bool> {
        if self.entries.contains_key(key) {
            return Ok(false);
        }
        let secret = random_hex(length)?;
        self.ensure_default(key, secret)
    }

    /// Append pending entries to the backing file and clear them.
    ///
    /// Returns the keys written, in creation order.
    pub fn persist_appended(&mut self) -> Result<Vec<String>> {
        if self.pending.is_empty() {
            return Ok(Vec::new());
        }

        let mut block = String::new();
        if self.needs_leading_newline()? {
            block.push('\n');
        }
        for key in &self.pending {
            let value = &self.entries[key.as_str()];
            block.push_str(&format!("{}=\"{}\"\n", key, escape_value(value)));
        }

        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let write_err = |e: std::io::Error| {
            PressdockError::Config(format!("Failed to write credential store {:?}: {}", self.path, e))
        };
        let mut file = options.open(&self.path).map_err(write_err)?;
        file.write_all(block.as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;

        info!("Persisted {} new entries to {:?}", self.pending.len(), self.path);
        self.existed = true;
        Ok(std::mem::take(&mut self.pending))
    }

    fn needs_leading_newline(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        let bytes = fs::read(&self.path).map_err(|e| {
            PressdockError::Config(format!("Failed to read credential store {:?}: {}", self.path, e))
        })?;
        Ok(bytes.last().map_or(false, |b| *b != b'\n'))
    }
}

/// Escape a value for the double-quoted store form.
pub fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Parse one store line. Blank lines and comments yield `None`.
fn parse_line(line: &str) -> std::result::Result<Option<(String, String)>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let caps = ASSIGNMENT
        .captures(line)
        .ok_or_else(|| "expected KEY=\"value\"".to_string())?;
    let key = caps[1].to_string();
    let value = parse_value(&caps[2])?;

    Ok(Some((key, value)))
}

fn parse_value(raw: &str) -> std::result::Result<String, String> {
    let raw = raw.trim();

    if let Some(rest) = raw.strip_prefix('"') {
        let mut value = String::new();
        let mut chars = rest.chars();
        loop {
            match chars.next() {
                Some('\\') => match chars.next() {
                    Some(c @ ('"' | '\\')) => value.push(c),
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => return Err("unterminated escape".to_string()),
                },
                Some('"') => break,
                Some(c) => value.push(c),
                None => return Err("missing closing quote".to_string()),
            }
        }
        let trailing = chars.as_str().trim();
        if trailing.is_empty() || trailing.starts_with('#') {
            Ok(value)
        } else {
            Err(format!("unexpected text after closing quote: {}", trailing))
        }
    } else if let Some(rest) = raw.strip_prefix('\'') {
        rest.strip_suffix('\'')
            .map(str::to_string)
            .ok_or_else(|| "missing closing quote".to_string())
    } else {
        Ok(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::is_hex_secret;
    use proptest::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = EnvStore::load(temp_dir.path().join(".env")).unwrap();

        assert!(store.is_empty());
        assert!(!store.existed());
    }

    #[test]
    fn test_parses_quoted_unquoted_and_comments() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".env");
        fs::write(
            &path,
            "# generated\n\nWP_TITLE=\"My \\\"Dev\\\" Site\"\nexport WP_ADMIN_USER=admin\nNOTE='a b'\n",
        )
        .unwrap();

        let store = EnvStore::load(&path).unwrap();
        assert_eq!(store.get("WP_TITLE"), Some("My \"Dev\" Site"));
        assert_eq!(store.get("WP_ADMIN_USER"), Some("admin"));
        assert_eq!(store.get("NOTE"), Some("a b"));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_unparseable_line_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".env");
        fs::write(&path, "GOOD=\"1\"\nthis is not an assignment\n").unwrap();

        let err = EnvStore::load(&path).unwrap_err();
        assert!(matches!(err, PressdockError::Config(ref m) if m.contains("line 2")));
    }

    #[test]
    fn test_unterminated_quote_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".env");
        fs::write(&path, "BROKEN=\"abc\n").unwrap();

        assert!(matches!(EnvStore::load(&path), Err(PressdockError::Config(_))));
    }

    #[test]
    fn test_existing_keys_never_overwritten() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".env");
        fs::write(&path, "MYSQL_PASSWORD=\"keepme\"\n").unwrap();

        let mut store = EnvStore::load(&path).unwrap();
        assert!(!store.ensure_random("MYSQL_PASSWORD", 32).unwrap());
        assert!(!store.ensure_default("MYSQL_PASSWORD", "other").unwrap());
        assert_eq!(store.get("MYSQL_PASSWORD"), Some("keepme"));
        assert!(store.pending().is_empty());
    }

    #[test]
    fn test_persist_appends_in_creation_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".env");
        fs::write(&path, "EXISTING=\"yes\"").unwrap();

        let mut store = EnvStore::load(&path).unwrap();
        store.ensure_default("WP_TITLE", "Say \"hi\"").unwrap();
        store.ensure_random("AUTH_KEY", 64).unwrap();

        let written = store.persist_appended().unwrap();
        assert_eq!(written, vec!["WP_TITLE".to_string(), "AUTH_KEY".to_string()]);
        assert!(store.pending().is_empty());

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "EXISTING=\"yes\"");
        assert_eq!(lines[1], "WP_TITLE=\"Say \\\"hi\\\"\"");
        assert!(lines[2].starts_with("AUTH_KEY=\""));

        let reloaded = EnvStore::load(&path).unwrap();
        assert_eq!(reloaded.get("WP_TITLE"), Some("Say \"hi\""));
        assert!(is_hex_secret(reloaded.get("AUTH_KEY").unwrap(), 64));
    }

    #[test]
    fn test_rerun_is_stable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".env");

        let mut first = EnvStore::load(&path).unwrap();
        first.ensure_random("NONCE_SALT", 64).unwrap();
        first.persist_appended().unwrap();
        let before = fs::read_to_string(&path).unwrap();

        let mut second = EnvStore::load(&path).unwrap();
        second.ensure_random("NONCE_SALT", 64).unwrap();
        assert!(second.persist_appended().unwrap().is_empty());

        assert_eq!(fs::read_to_string(&path).unwrap(), before);
        assert_eq!(second.get("NONCE_SALT"), first.get("NONCE_SALT"));
    }

    #[cfg(unix)]
    #[test]
    fn test_new_store_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".env");
        let mut store = EnvStore::load(&path).unwrap();
        store.ensure_default("WP_URL", "http://localhost:8080").unwrap();
        store.persist_appended().unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_rejects_invalid_keys_and_multiline_values() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = EnvStore::load(temp_dir.path().join(".env")).unwrap();

        assert!(store.ensure_default("BAD-KEY", "x").is_err());
        assert!(store.ensure_default("GOOD_KEY", "two\nlines").is_err());
        assert!(store.is_empty());
    }

    proptest! {
        #[test]
        fn prop_stored_form_round_trips(value in "[^\r\n]{0,40}") {
            let line = format!("KEY=\"{}\"", escape_value(&value));
            let parsed = parse_line(&line).unwrap().unwrap();
            prop_assert_eq!(parsed.1, value);
        }
    }
}
