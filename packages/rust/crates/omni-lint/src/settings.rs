//! YAML settings for the type-name rule.
//!
//! ```yaml
//! type_names:
//!   enabled: true
//!   categories: [member, method, property, parameter]
//!   severity: warning
//! ```
//!
//! Absent keys keep the defaults of [`RuleConfig`]. [`LintSettings::load_merged`]
//! layers a user file over a system file, user winning.

use std::path::Path;

use serde::Deserialize;

use crate::error::LintError;
use crate::finding::{Category, Severity};
use crate::rule::RuleConfig;

/// Root of the settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LintSettings {
    /// Type-name rule section.
    #[serde(default)]
    pub type_names: TypeNameSettings,
}

/// `type_names:` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TypeNameSettings {
    /// Turn the rule off entirely.
    pub enabled: Option<bool>,
    /// Enabled categories.
    pub categories: Option<Vec<Category>>,
    /// Severity attached to findings.
    pub severity: Option<Severity>,
}

impl TypeNameSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            enabled: overlay.enabled.or(self.enabled),
            categories: overlay.categories.or(self.categories),
            severity: overlay.severity.or(self.severity),
        }
    }
}

impl LintSettings {
    /// Parse settings from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`LintError::Settings`] on malformed YAML or unknown values.
    pub fn from_yaml_str(raw: &str) -> Result<Self, LintError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Read and parse one settings file.
    ///
    /// # Errors
    ///
    /// Returns [`LintError::Io`] if the file cannot be read, or
    /// [`LintError::Settings`] if it does not parse.
    pub fn load(path: &Path) -> Result<Self, LintError> {
        let raw = std::fs::read_to_string(path).map_err(|source| LintError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Load `system` then `user`; missing or broken files are skipped with a warning.
    #[must_use]
    pub fn load_merged(system: &Path, user: &Path) -> Self {
        Self::load_or_default(system).merge(Self::load_or_default(user))
    }

    fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => settings,
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %error,
                    "failed to load lint settings; ignoring file"
                );
                Self::default()
            }
        }
    }

    /// Overlay `overlay` on `self`; keys set in `overlay` win.
    #[must_use]
    pub fn merge(self, overlay: Self) -> Self {
        Self {
            type_names: self.type_names.merge(overlay.type_names),
        }
    }

    /// Rule configuration, or `None` when the rule is disabled.
    #[must_use]
    pub fn rule_config(&self) -> Option<RuleConfig> {
        let section = &self.type_names;
        if section.enabled == Some(false) {
            return None;
        }
        let defaults = RuleConfig::default();
        Some(RuleConfig {
            categories: section.categories.clone().unwrap_or(defaults.categories),
            severity: section.severity.unwrap_or(defaults.severity),
        })
    }
}
