//! Registry configuration.
//!
//! # Design
//! - Every field has a default so an empty document or environment yields a
//!   usable configuration.
//! - Validation is separate from parsing; [`crate::Registry::with_config`]
//!   always validates.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Label attached to log records when none is configured.
pub const DEFAULT_LABEL: &str = "registry";
/// Per-topic listener count above which a leak warning is logged.
pub const DEFAULT_MAX_LISTENERS: usize = 10;

/// Environment variable overriding [`RegistryConfig::label`].
pub const LABEL_ENV: &str = "PULSE_REGISTRY_LABEL";
/// Environment variable overriding [`RegistryConfig::max_listeners`].
pub const MAX_LISTENERS_ENV: &str = "PULSE_MAX_LISTENERS";

/// Tunables for a [`crate::Registry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Registry name recorded on every log record.
    pub label: String,
    /// Leak-detection threshold per topic; `None` disables the warning.
    pub max_listeners: Option<usize>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            max_listeners: Some(DEFAULT_MAX_LISTENERS),
        }
    }
}

impl RegistryConfig {
    /// Parse a configuration from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] if the document does not match the
    /// expected shape or fails validation.
    pub fn from_json(value: &serde_json::Value) -> ConfigResult<Self> {
        let config = Self::deserialize(value).map_err(|err| ConfigError::InvalidField {
            field: "registry",
            value: Some(err.to_string()),
            reason: "malformed document",
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from `PULSE_*` environment variables.
    ///
    /// Unset variables keep their defaults, as does a blank threshold.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] if a variable cannot be parsed or
    /// the result fails validation.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let mut config = Self::default();
        if let Some(label) = lookup(LABEL_ENV) {
            config.label = label;
        }
        // A blank value counts as unset.
        if let Some(raw) = lookup(MAX_LISTENERS_ENV).filter(|raw| !raw.trim().is_empty()) {
            config.max_listeners = parse_max_listeners(&raw)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Check field invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] for an empty label or a zero threshold.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.label.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "label",
                value: Some(self.label.clone()),
                reason: "must not be empty",
            });
        }
        if self.max_listeners == Some(0) {
            return Err(ConfigError::InvalidField {
                field: "max_listeners",
                value: Some("0".to_string()),
                reason: "must be positive",
            });
        }
        Ok(())
    }
}

fn parse_max_listeners(raw: &str) -> ConfigResult<Option<usize>> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("off") || trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    trimmed
        .parse::<usize>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidField {
            field: "max_listeners",
            value: Some(raw.to_string()),
            reason: "expected a positive integer or `off`",
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key: &str| values.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let config = RegistryConfig::default();
        assert_eq!(config.label, DEFAULT_LABEL);
        assert_eq!(config.max_listeners, Some(DEFAULT_MAX_LISTENERS));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn from_json_fills_missing_fields() {
        let config = RegistryConfig::from_json(&json!({ "label": "ui" })).expect("config");
        assert_eq!(config.label, "ui");
        assert_eq!(config.max_listeners, Some(DEFAULT_MAX_LISTENERS));

        let disabled =
            RegistryConfig::from_json(&json!({ "max_listeners": null })).expect("config");
        assert_eq!(disabled.max_listeners, None);
    }

    #[test]
    fn from_json_rejects_unknown_fields_and_zero_threshold() {
        let unknown = RegistryConfig::from_json(&json!({ "capacity": 3 }));
        assert!(matches!(
            unknown,
            Err(ConfigError::InvalidField {
                field: "registry",
                ..
            })
        ));

        let zero = RegistryConfig::from_json(&json!({ "max_listeners": 0 }));
        assert_eq!(zero.map_err(|err| err.field()), Err("max_listeners"));
    }

    #[test]
    fn lookup_overrides_defaults() {
        let config = RegistryConfig::from_lookup(lookup_from(&[
            (LABEL_ENV, "workers"),
            (MAX_LISTENERS_ENV, " 25 "),
        ]))
        .expect("config");
        assert_eq!(config.label, "workers");
        assert_eq!(config.max_listeners, Some(25));
    }

    #[test]
    fn lookup_accepts_off_switch() {
        let config =
            RegistryConfig::from_lookup(lookup_from(&[(MAX_LISTENERS_ENV, "OFF")])).expect("config");
        assert_eq!(config.max_listeners, None);
    }

    #[test]
    fn lookup_rejects_garbage_and_blank_label() {
        let garbage = RegistryConfig::from_lookup(lookup_from(&[(MAX_LISTENERS_ENV, "many")]));
        assert_eq!(garbage.map_err(|err| err.reason()), Err("expected a positive integer or `off`"));

        let blank = RegistryConfig::from_lookup(lookup_from(&[(LABEL_ENV, "  ")]));
        assert_eq!(blank.map_err(|err| err.field()), Err("label"));
    }

    #[test]
    fn lookup_treats_blank_threshold_as_unset() {
        let config = RegistryConfig::from_lookup(lookup_from(&[
            (LABEL_ENV, "workers"),
            (MAX_LISTENERS_ENV, "   "),
        ]))
        .expect("config");
        assert_eq!(config.label, "workers");
        assert_eq!(config.max_listeners, Some(DEFAULT_MAX_LISTENERS));

        let empty =
            RegistryConfig::from_lookup(lookup_from(&[(MAX_LISTENERS_ENV, "")])).expect("config");
        assert_eq!(empty, RegistryConfig::default());
    }
}
