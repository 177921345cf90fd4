//! Type-safe identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::errors::{PressdockError, Result};

/// A validated credential store key.
///
/// Keys must:
/// - Start with an ASCII letter or underscore
/// - Contain only ASCII letters, digits, and underscores
///
/// # Example
///
/// ```
/// use pressdock_types::ConfigKey;
///
/// let key = ConfigKey::new("MYSQL_PASSWORD").unwrap();
/// assert_eq!(key.as_str(), "MYSQL_PASSWORD");
///
/// assert!(ConfigKey::new("1PASSWORD").is_err());
/// assert!(ConfigKey::new("MY-KEY").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConfigKey(String);

impl ConfigKey {
    /// Create a new validated key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key doesn't meet validation requirements.
    pub fn new(key: impl AsRef<str>) -> Result<Self> {
        let key = key.as_ref();
        if !Self::is_valid(key) {
            return Err(PressdockError::Validation(format!(
                "Invalid key '{}': must start with a letter or underscore and contain only \
                letters, digits, and underscores",
                key
            )));
        }
        Ok(Self(key.to_string()))
    }

    /// Check if a key is valid without allocating.
    pub fn is_valid(key: &str) -> bool {
        let mut chars = key.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// Get the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConfigKey {
    type Err = PressdockError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ConfigKey {
    type Error = PressdockError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ConfigKey> for String {
    fn from(key: ConfigKey) -> Self {
        key.0
    }
}

/// A validated compose service name.
///
/// Service names follow the compose rules: lowercase letters, digits,
/// dashes and underscores, starting with a letter or digit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceName(pub(crate) String);

impl ServiceName {
    /// Create a new validated service name.
    pub fn new(name: impl AsRef<str>) -> Result<Self> {
        let name = name.as_ref();
        if !Self::is_valid(name) {
            return Err(PressdockError::Validation(format!(
                "Invalid service name '{}': must contain only lowercase letters, digits, \
                dashes, and underscores, and must start with a letter or digit",
                name
            )));
        }
        Ok(Self(name.to_string()))
    }

    /// Check if a name is valid without allocating.
    pub fn is_valid(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_lowercase() || first.is_ascii_digit() => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ServiceName {
    type Err = PressdockError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ServiceName {
    type Error = PressdockError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ServiceName> for String {
    fn from(name: ServiceName) -> Self {
        name.0
    }
}

/// A validated WordPress slug (plugin, theme, or option name).
///
/// Slugs are lowercase ASCII letters, digits, dashes and underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(pub(crate) String);

impl Slug {
    /// Create a new validated slug.
    pub fn new(slug: impl AsRef<str>) -> Result<Self> {
        let slug = slug.as_ref();
        if slug.is_empty()
            || !slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(PressdockError::Validation(format!(
                "Invalid slug '{}': must be non-empty lowercase letters, digits, dashes, or underscores",
                slug
            )));
        }
        Ok(Self(slug.to_string()))
    }

    /// Get the slug as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Slug {
    type Error = PressdockError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_config_key_validation() {
        assert!(ConfigKey::new("AUTH_KEY").is_ok());
        assert!(ConfigKey::new("_private").is_ok());
        assert!(ConfigKey::new("").is_err());
        assert!(ConfigKey::new("WP URL").is_err());
        assert!(ConfigKey::new("KEY=").is_err());
    }

    #[test]
    fn test_service_name_validation() {
        assert!(ServiceName::new("wpcli").is_ok());
        assert!(ServiceName::new("db_1").is_ok());
        assert!(ServiceName::new("WordPress").is_err());
        assert!(ServiceName::new("-db").is_err());
    }

    #[test]
    fn test_slug_deserialize_rejects_invalid() {
        let ok: Slug = serde_yaml::from_str("wordpress-seo").unwrap();
        assert_eq!(ok.as_str(), "wordpress-seo");
        assert!(serde_yaml::from_str::<Slug>("Not A Slug").is_err());
    }

    proptest! {
        #[test]
        fn prop_generated_keys_are_accepted(key in "[A-Za-z_][A-Za-z0-9_]{0,30}") {
            prop_assert!(ConfigKey::new(&key).is_ok());
        }
    }
}
