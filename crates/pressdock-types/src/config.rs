//! Configuration types and structures.
//!
//! Every section deserializes with defaults for missing fields, so an empty
//! (or absent) project file yields a working configuration. Unknown fields
//! are rejected so typos surface before anything is dispatched.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use crate::identifiers::{ServiceName, Slug};
use crate::LogLevel;

/// Locations of the files pressdock reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Persisted credential store
    pub env_file: PathBuf,
    /// Compose template rendered on first use
    pub compose_template: PathBuf,
    /// Rendered compose file
    pub compose_file: PathBuf,
    /// Authoritative custom theme source tree
    pub theme_source: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            env_file: PathBuf::from(".env"),
            compose_template: PathBuf::from("docker-compose.yml.template"),
            compose_file: PathBuf::from("docker-compose.yml"),
            theme_source: PathBuf::from("theme"),
        }
    }
}

/// Names of the services declared in the compose file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServicesConfig {
    /// MariaDB service
    pub database: ServiceName,
    /// WordPress application service
    pub application: ServiceName,
    /// Transient WP-CLI helper service
    pub helper: ServiceName,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            database: ServiceName("db".to_string()),
            application: ServiceName("wordpress".to_string()),
            helper: ServiceName("wpcli".to_string()),
        }
    }
}

impl ServicesConfig {
    /// All services, in start order.
    pub fn all(&self) -> [&ServiceName; 3] {
        [&self.database, &self.application, &self.helper]
    }
}

/// Readiness wait settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReadinessConfig {
    /// Maximum number of probe invocations
    pub max_attempts: u32,
    /// Fixed delay between probes, in seconds
    pub delay_secs: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            delay_secs: 2,
        }
    }
}

impl ReadinessConfig {
    /// Fixed delay between probes.
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

/// Defaults for the plain (non-secret) credential store values.
///
/// These only seed keys that are absent from the store; once persisted,
/// the store wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Public site URL
    pub url: String,
    /// Site title
    pub title: String,
    /// Administrator login
    pub admin_user: String,
    /// Administrator email
    pub admin_email: String,
    /// Database name
    pub database_name: String,
    /// Database user
    pub database_user: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".to_string(),
            title: "Local WordPress".to_string(),
            admin_user: "admin".to_string(),
            admin_email: "admin@example.com".to_string(),
            database_name: "wordpress".to_string(),
            database_user: "wordpress".to_string(),
        }
    }
}

/// Custom theme deployment settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Theme directory name and stylesheet slug
    pub slug: Slug,
    /// Themes directory inside the application service
    pub themes_dir: String,
    /// Owner applied recursively after copying
    pub owner: String,
    /// Mode applied to directories
    pub dir_mode: String,
    /// Mode applied to files
    pub file_mode: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            slug: Slug("pressdock-theme".to_string()),
            themes_dir: "/var/www/html/wp-content/themes".to_string(),
            owner: "www-data:www-data".to_string(),
            dir_mode: "755".to_string(),
            file_mode: "644".to_string(),
        }
    }
}

impl ThemeConfig {
    /// Deployed theme directory inside the application service.
    pub fn target_dir(&self) -> String {
        format!("{}/{}", self.themes_dir.trim_end_matches('/'), self.slug)
    }
}

/// Presentation settings applied after theme activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppearanceConfig {
    /// Value of the `color_scheme` option
    pub color_scheme: String,
    /// `header_textcolor` theme mod (hex without `#`)
    pub header_text_color: String,
    /// `background_color` theme mod (hex without `#`)
    pub background_color: String,
    /// File holding the custom CSS body; built-in stylesheet when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_css: Option<PathBuf>,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            color_scheme: "dark".to_string(),
            header_text_color: "ffffff".to_string(),
            background_color: "1e1e1e".to_string(),
            custom_css: None,
        }
    }
}

/// Editorial (discussion) preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscussionConfig {
    /// Comments open on new posts
    pub comments_open: bool,
    /// Pingbacks/trackbacks open on new posts
    pub pings_open: bool,
    /// Hold comments for moderation
    pub moderation: bool,
    /// Show avatars
    pub show_avatars: bool,
}

impl Default for DiscussionConfig {
    fn default() -> Self {
        Self {
            comments_open: false,
            pings_open: false,
            moderation: true,
            show_avatars: false,
        }
    }
}

/// Log configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Minimum level for pressdock's own targets
    pub level: LogLevel,
    /// Log format (pretty, json, compact)
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line format
    Pretty,
    /// JSON format for machine parsing
    Json,
    /// Compact single-line format
    Compact,
}

/// Default plugin list, in install order.
pub fn default_plugins() -> Vec<Slug> {
    ["contact-form-7", "wordpress-seo", "wp-mail-smtp"]
        .into_iter()
        .map(|s| Slug(s.to_string()))
        .collect()
}
