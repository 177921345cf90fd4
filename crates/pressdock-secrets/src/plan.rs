//! Credential plan: the keys a WordPress stack needs and how to seed them.

use pressdock_types::config::SiteConfig;
use pressdock_types::Result;
use tracing::info;

use crate::store::EnvStore;

/// Store key names.
pub mod keys {
    /// Database name
    pub const MYSQL_DATABASE: &str = "MYSQL_DATABASE";
    /// Database user
    pub const MYSQL_USER: &str = "MYSQL_USER";
    /// Database user password
    pub const MYSQL_PASSWORD: &str = "MYSQL_PASSWORD";
    /// Database root password
    pub const MYSQL_ROOT_PASSWORD: &str = "MYSQL_ROOT_PASSWORD";
    /// Public site URL
    pub const WP_URL: &str = "WP_URL";
    /// Site title
    pub const WP_TITLE: &str = "WP_TITLE";
    /// Administrator login
    pub const WP_ADMIN_USER: &str = "WP_ADMIN_USER";
    /// Administrator password
    pub const WP_ADMIN_PASSWORD: &str = "WP_ADMIN_PASSWORD";
    /// Administrator email
    pub const WP_ADMIN_EMAIL: &str = "WP_ADMIN_EMAIL";

    /// WordPress authentication keys and salts.
    pub const SALTS: [&str; 8] = [
        "AUTH_KEY",
        "SECURE_AUTH_KEY",
        "LOGGED_IN_KEY",
        "NONCE_KEY",
        "AUTH_SALT",
        "SECURE_AUTH_SALT",
        "LOGGED_IN_SALT",
        "NONCE_SALT",
    ];
}

/// Bytes of entropy for each salt.
pub const SALT_BYTES: usize = 64;
/// Bytes of entropy for the database user password.
pub const DB_PASSWORD_BYTES: usize = 32;
/// Bytes of entropy for the database root password.
pub const DB_ROOT_PASSWORD_BYTES: usize = 32;
/// Bytes of entropy for the administrator password.
pub const ADMIN_PASSWORD_BYTES: usize = 16;

/// How a planned key gets its first value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seed {
    /// Plain default value
    Default(String),
    /// Hex secret of this many bytes
    Random(usize),
}

/// One key of the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedKey {
    /// Store key
    pub key: &'static str,
    /// Initial value source
    pub seed: Seed,
}

/// Ordered list of every key the stack needs.
#[derive(Debug, Clone)]
pub struct CredentialPlan {
    entries: Vec<PlannedKey>,
}

impl CredentialPlan {
    /// The standard plan for a WordPress site.
    pub fn for_site(site: &SiteConfig) -> Self {
        let default = |key, value: &str| PlannedKey {
            key,
            seed: Seed::Default(value.to_string()),
        };
        let random = |key, bytes| PlannedKey {
            key,
            seed: Seed::Random(bytes),
        };

        let mut entries = vec![
            default(keys::MYSQL_DATABASE, &site.database_name),
            default(keys::MYSQL_USER, &site.database_user),
            random(keys::MYSQL_PASSWORD, DB_PASSWORD_BYTES),
            random(keys::MYSQL_ROOT_PASSWORD, DB_ROOT_PASSWORD_BYTES),
            default(keys::WP_URL, &site.url),
            default(keys::WP_TITLE, &site.title),
            default(keys::WP_ADMIN_USER, &site.admin_user),
            random(keys::WP_ADMIN_PASSWORD, ADMIN_PASSWORD_BYTES),
            default(keys::WP_ADMIN_EMAIL, &site.admin_email),
        ];
        entries.extend(keys::SALTS.iter().map(|key| random(*key, SALT_BYTES)));

        Self { entries }
    }

    /// Planned keys, in seeding order.
    pub fn entries(&self) -> &[PlannedKey] {
        &self.entries
    }

    /// Seed every absent key and persist the new ones.
    ///
    /// Returns the keys generated by this call.
    pub fn apply(&self, store: &mut EnvStore) -> Result<Vec<String>> {
        for entry in &self.entries {
            match &entry.seed {
                Seed::Default(value) => store.ensure_default(entry.key, value.as_str())?,
                Seed::Random(bytes) => store.ensure_random(entry.key, *bytes)?,
            };
        }

        let generated = store.persist_appended()?;
        if !generated.is_empty() {
            info!("Generated {} credential entries: {}", generated.len(), generated.join(", "));
        }
        Ok(generated)
    }
}

/// Typed view of the store values the provisioning steps consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteCredentials {
    /// Public site URL
    pub url: String,
    /// Site title
    pub title: String,
    /// Administrator login
    pub admin_user: String,
    /// Administrator password
    pub admin_password: String,
    /// Administrator email
    pub admin_email: String,
    /// Database root password, used by the readiness probe
    pub db_root_password: String,
}

impl SiteCredentials {
    /// Extract the values from a completed store.
    pub fn from_store(store: &EnvStore) -> Result<Self> {
        Ok(Self {
            url: store.require(keys::WP_URL)?.to_string(),
            title: store.require(keys::WP_TITLE)?.to_string(),
            admin_user: store.require(keys::WP_ADMIN_USER)?.to_string(),
            admin_password: store.require(keys::WP_ADMIN_PASSWORD)?.to_string(),
            admin_email: store.require(keys::WP_ADMIN_EMAIL)?.to_string(),
            db_root_password: store.require(keys::MYSQL_ROOT_PASSWORD)?.to_string(),
        })
    }

    /// Values that must be masked in logs.
    pub fn secrets(&self) -> [&str; 2] {
        [self.admin_password.as_str(), self.db_root_password.as_str()]
    }
}
