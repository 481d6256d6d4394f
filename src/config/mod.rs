//! Process-wide capture configuration
//!
//! Loaded once (from a YAML file or the bundled defaults) and then shared
//! read-only, usually behind an `Arc`, by every capture in the process.

use crate::dom::attributes::AttributeValue;
use crate::error::{Result, SnapshotError};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const BUNDLED_YAML: &str = include_str!("default.yaml");

static BUNDLED: Lazy<SnapshotConfig> = Lazy::new(|| {
    SnapshotConfig::from_yaml_str(BUNDLED_YAML).expect("bundled default.yaml must be a valid configuration")
});

/// Everything a capture needs to know up front
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Computed CSS properties requested for every element
    #[serde(default)]
    pub css_attributes: Vec<String>,

    /// Platform default values that are omitted from snapshots
    #[serde(default)]
    pub defaults: DefaultRules,

    /// Which attributes feed stable identifiers
    #[serde(default)]
    pub identity: IdentityConfig,

    #[serde(default)]
    pub screenshot: ScreenshotConfig,
}

/// Default-value rules: `all` applies to every tag, `tags` per tag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultRules {
    /// Treat empty strings as defaults
    #[serde(default)]
    pub omit_empty: bool,

    #[serde(default)]
    pub all: BTreeMap<String, AttributeValue>,

    #[serde(default)]
    pub tags: BTreeMap<String, BTreeMap<String, AttributeValue>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Attribute names that participate in identifier computation
    #[serde(default = "default_identity_attributes")]
    pub attributes: Vec<String>,

    /// Number of hex digits of the attribute hash kept in an identifier
    #[serde(default = "default_hash_length")]
    pub hash_length: usize,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            attributes: default_identity_attributes(),
            hash_length: default_hash_length(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenshotConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_identity_attributes() -> Vec<String> {
    ["id", "name", "type", "class", "text", "href", "src", "alt", "title", "role", "aria-label", "placeholder"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_hash_length() -> usize {
    8
}

fn default_true() -> bool {
    true
}

impl SnapshotConfig {
    /// The configuration shipped with the crate
    pub fn bundled() -> Self {
        BUNDLED.clone()
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: SnapshotConfig =
            serde_yaml::from_str(yaml).map_err(|e| SnapshotError::Config(format!("Failed to parse YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        log::debug!("Loaded snapshot configuration from {}", path.display());
        Self::from_yaml_str(&content)
            .map_err(|e| SnapshotError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load `path` if given, the bundled defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::bundled()),
        }
    }

    /// Builder method: replace the requested CSS properties
    pub fn with_css_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.css_attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method: replace the default-value rules
    pub fn with_defaults(mut self, defaults: DefaultRules) -> Self {
        self.defaults = defaults;
        self
    }

    /// Builder method: toggle screenshots
    pub fn with_screenshots(mut self, enabled: bool) -> Self {
        self.screenshot.enabled = enabled;
        self
    }

    fn validate(&self) -> Result<()> {
        if let Some(bad) = self
            .css_attributes
            .iter()
            .find(|name| name.trim().is_empty() || name.contains(char::is_whitespace))
        {
            return Err(SnapshotError::Config(format!("Invalid CSS attribute name '{}'", bad)));
        }

        if !(4..=40).contains(&self.identity.hash_length) {
            return Err(SnapshotError::Config(format!(
                "identity.hash_length must be between 4 and 40, got {}",
                self.identity.hash_length
            )));
        }

        Ok(())
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self::bundled()
    }
}
