//! Configuration options for validation behavior
//!
//! [`ValidatorConfig`] holds per-validator settings, [`ValidateOptions`]
//! the settings of a single `validate` call.

use crate::constraints::default_groups;
use crate::errors::{ConfigError, ConfigResult};
use std::str::FromStr;

// ============================================================================
// Enumeration Mode
// ============================================================================

/// Which properties of an object the JSON introspectors enumerate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EnumerationMode {
    /// Properties with declared constraints, whether present in the model or not (default)
    #[default]
    Validators,
    /// Properties present in the model
    Model,
    /// Declared properties followed by the remaining model properties
    Union,
}

impl FromStr for EnumerationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "validators" => Ok(Self::Validators),
            "model" => Ok(Self::Model),
            "union" => Ok(Self::Union),
            _ => Err(ConfigError::UnknownEnumerationMode(s.to_string())),
        }
    }
}

// ============================================================================
// Validator Config
// ============================================================================

/// Settings shared by every run of a [`Validator`](crate::Validator)
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ValidatorConfig {
    /// Groups evaluated when a call does not name any
    pub default_groups: Vec<String>,
}

impl ValidatorConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the groups evaluated when a call does not name any
    pub fn default_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_groups = groups.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            default_groups: default_groups(),
        }
    }
}

// ============================================================================
// Validate Options
// ============================================================================

/// Options of a single validation run
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ValidateOptions {
    /// Stop at the first invalid property
    pub eager: bool,
    /// Groups to evaluate; `None` uses the validator's default groups
    pub groups: Option<Vec<String>>,
    /// Top-level properties to validate; `None` validates all of them
    pub props: Option<Vec<String>>,
}

impl ValidateOptions {
    /// Create options with defaults (not eager, default groups, all props)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set eager mode
    pub fn eager(mut self, eager: bool) -> Self {
        self.eager = eager;
        self
    }

    /// Evaluate only constraints in these groups
    pub fn groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = Some(groups.into_iter().map(Into::into).collect());
        self
    }

    /// Validate only these top-level properties
    pub fn props<I, S>(mut self, props: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.props = Some(props.into_iter().map(Into::into).collect());
        self
    }

    /// The property filter, with an empty list meaning no filter
    pub(crate) fn prop_filter(&self) -> Option<&[String]> {
        self.props.as_deref().filter(|props| !props.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumeration_mode_from_str() {
        assert_eq!("VALIDATORS".parse::<EnumerationMode>(), Ok(EnumerationMode::Validators));
        assert_eq!("model".parse::<EnumerationMode>(), Ok(EnumerationMode::Model));
        assert_eq!("Union".parse::<EnumerationMode>(), Ok(EnumerationMode::Union));
        assert_eq!(
            "BOTH".parse::<EnumerationMode>(),
            Err(ConfigError::UnknownEnumerationMode("BOTH".to_string()))
        );
    }

    #[test]
    fn test_config_defaults() {
        let config = ValidatorConfig::new();
        assert_eq!(config.default_groups, vec!["default".to_string()]);

        let config = ValidatorConfig::new().default_groups(["create"]);
        assert_eq!(config.default_groups, vec!["create".to_string()]);
    }

    #[test]
    fn test_options_builder() {
        let options = ValidateOptions::new().eager(true).groups(["A"]).props(["name"]);
        assert!(options.eager);
        assert_eq!(options.groups, Some(vec!["A".to_string()]));
        assert_eq!(options.prop_filter(), Some(&["name".to_string()][..]));

        let empty = ValidateOptions::new().props(Vec::<String>::new());
        assert_eq!(empty.prop_filter(), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_options_from_json() {
        let options: ValidateOptions =
            serde_json::from_value(serde_json::json!({ "eager": true, "groups": ["update"] })).unwrap();
        assert!(options.eager);
        assert_eq!(options.groups, Some(vec!["update".to_string()]));
        assert_eq!(options.props, None);

        let config: ValidatorConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(config.default_groups, vec!["default".to_string()]);

        let mode: EnumerationMode = serde_json::from_value(serde_json::json!("union")).unwrap();
        assert_eq!(mode, EnumerationMode::Union);
    }
}
