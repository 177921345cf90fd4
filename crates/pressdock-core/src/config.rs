//! Project configuration for pressdock.
//!
//! A project is described by an optional `pressdock.yml` next to the compose
//! template. Every section is optional; missing values fall back to the
//! defaults in [`pressdock_types::config`]. Relative paths are resolved
//! against the directory holding the configuration file.
//!
//! ## Example
//!
//! ```yaml
//! site:
//!   url: http://localhost:8081
//!   title: Agency Sandbox
//! plugins:
//!   - contact-form-7
//!   - query-monitor
//! theme:
//!   slug: agency
//! readiness:
//!   max_attempts: 60
//! ```

use pressdock_types::{PressdockError, Result, Slug};
use pressdock_types::config::{
    default_plugins, AppearanceConfig, DiscussionConfig, LogConfig, PathsConfig,
    ReadinessConfig, ServicesConfig, SiteConfig, ThemeConfig,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::util::fs::expand_path;

static FILE_MODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-7]{3,4}$").unwrap());
static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap());

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "pressdock.yml";

/// Complete project configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// File locations
    pub paths: PathsConfig,
    /// Compose service names
    pub services: ServicesConfig,
    /// Database readiness wait
    pub readiness: ReadinessConfig,
    /// Defaults for plain site values
    pub site: SiteConfig,
    /// Required plugins, in install order
    pub plugins: Vec<Slug>,
    /// Custom theme deployment
    pub theme: ThemeConfig,
    /// Presentation options
    pub appearance: AppearanceConfig,
    /// Editorial preferences
    pub discussion: DiscussionConfig,
    /// Logging
    pub logging: LogConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            services: ServicesConfig::default(),
            readiness: ReadinessConfig::default(),
            site: SiteConfig::default(),
            plugins: default_plugins(),
            theme: ThemeConfig::default(),
            appearance: AppearanceConfig::default(),
            discussion: DiscussionConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Load configuration from a file path.
    ///
    /// If the file doesn't exist, the defaults are used. Relative paths are
    /// resolved against the file's directory in both cases.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = expand_path(path);

        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| PressdockError::Config(format!("Failed to read {:?}: {}", path, e)))?;

            if content.trim().is_empty() {
                Self::default()
            } else {
                serde_yaml::from_str(&content)
                    .map_err(|e| PressdockError::Config(format!("Failed to parse {:?}: {}", path, e)))?
            }
        } else {
            tracing::debug!("No configuration at {:?}, using defaults", path);
            Self::default()
        };

        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        config.resolve_paths(&base);
        config.validate()?;

        Ok(config)
    }

    /// Resolve relative and `~` paths against `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &Path| -> PathBuf {
            let expanded = expand_path(p);
            if expanded.is_absolute() {
                expanded
            } else {
                base.join(expanded)
            }
        };

        self.paths.env_file = resolve(&self.paths.env_file);
        self.paths.compose_template = resolve(&self.paths.compose_template);
        self.paths.compose_file = resolve(&self.paths.compose_file);
        self.paths.theme_source = resolve(&self.paths.theme_source);
        if let Some(css) = &self.appearance.custom_css {
            self.appearance.custom_css = Some(resolve(css));
        }
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.readiness.max_attempts == 0 {
            problems.push("readiness.max_attempts must be at least 1".to_string());
        }

        let services = self.services.all();
        let distinct: HashSet<_> = services.iter().map(|s| s.as_str()).collect();
        if distinct.len() != services.len() {
            problems.push("services must have three distinct names".to_string());
        }

        let mut seen = HashSet::new();
        for plugin in &self.plugins {
            if !seen.insert(plugin.as_str()) {
                problems.push(format!("plugin '{}' listed more than once", plugin));
            }
        }

        if !self.site.url.starts_with("http://") && !self.site.url.starts_with("https://") {
            problems.push(format!("site.url '{}' must start with http:// or https://", self.site.url));
        }
        if !self.site.admin_email.contains('@') {
            problems.push(format!("site.admin_email '{}' is not an email address", self.site.admin_email));
        }
        for (field, value) in [
            ("site.title", &self.site.title),
            ("site.admin_user", &self.site.admin_user),
            ("site.database_name", &self.site.database_name),
            ("site.database_user", &self.site.database_user),
        ] {
            if value.trim().is_empty() {
                problems.push(format!("{} must not be empty", field));
            }
        }

        if !self.theme.themes_dir.starts_with('/') {
            problems.push("theme.themes_dir must be an absolute path".to_string());
        }
        if self.theme.owner.is_empty() || self.theme.owner.contains(char::is_whitespace) {
            problems.push(format!("theme.owner '{}' is not a valid owner", self.theme.owner));
        }
        for (field, mode) in [("theme.dir_mode", &self.theme.dir_mode), ("theme.file_mode", &self.theme.file_mode)] {
            if !FILE_MODE.is_match(mode) {
                problems.push(format!("{} '{}' is not an octal mode", field, mode));
            }
        }

        for (field, color) in [
            ("appearance.header_text_color", &self.appearance.header_text_color),
            ("appearance.background_color", &self.appearance.background_color),
        ] {
            if !HEX_COLOR.is_match(color) {
                problems.push(format!("{} '{}' must be a hex color without '#'", field, color));
            }
        }
        if self.appearance.color_scheme.trim().is_empty() {
            problems.push("appearance.color_scheme must not be empty".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(PressdockError::Config(format!(
                "Validation failed: {}",
                problems.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ProjectConfig::load(temp_dir.path().join("pressdock.yml")).unwrap();

        assert_eq!(config.readiness.max_attempts, 30);
        assert_eq!(config.readiness.delay(), Duration::from_secs(2));
        assert_eq!(config.plugins.len(), 3);
        assert_eq!(config.paths.env_file, temp_dir.path().join(".env"));
    }

    #[test]
    fn test_partial_file_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pressdock.yml");
        fs::write(
            &path,
            "site:\n  title: Agency Sandbox\nplugins: [query-monitor]\nreadiness:\n  max_attempts: 5\n",
        )
        .unwrap();

        let config = ProjectConfig::load(&path).unwrap();
        assert_eq!(config.site.title, "Agency Sandbox");
        assert_eq!(config.site.url, "http://localhost:8080");
        assert_eq!(config.plugins, vec![Slug::new("query-monitor").unwrap()]);
        assert_eq!(config.readiness.max_attempts, 5);
        assert_eq!(config.readiness.delay_secs, 2);
    }

    #[test]
    fn test_unparseable_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pressdock.yml");
        fs::write(&path, "site: [unclosed\n").unwrap();

        let err = ProjectConfig::load(&path).unwrap_err();
        assert!(matches!(err, PressdockError::Config(_)));
    }

    #[test]
    fn test_validation_collects_problems() {
        let mut config = ProjectConfig::default();
        config.readiness.max_attempts = 0;
        config.theme.dir_mode = "rwx".to_string();
        config.plugins.push(config.plugins[0].clone());

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("max_attempts"));
        assert!(err.contains("dir_mode"));
        assert!(err.contains("more than once"));
    }

    #[test]
    fn test_absolute_paths_untouched() {
        let mut config = ProjectConfig::default();
        config.paths.theme_source = PathBuf::from("/srv/theme");
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.paths.theme_source, PathBuf::from("/srv/theme"));
        assert_eq!(config.paths.compose_file, PathBuf::from("/project/docker-compose.yml"));
    }
}
