//! Error types for registry configuration.

use thiserror::Error;

/// Errors raised while building or validating a [`crate::RegistryConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Field contained an invalid value.
    #[error("invalid registry configuration field")]
    InvalidField {
        /// Field that failed validation.
        field: &'static str,
        /// Offending value when available.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
}

impl ConfigError {
    /// Name of the field that failed validation.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::InvalidField { field, .. } => field,
        }
    }

    /// Machine-readable reason for the failure.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidField { reason, .. } => reason,
        }
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_exposes_fields() {
        let err = ConfigError::InvalidField {
            field: "max_listeners",
            value: Some("0".into()),
            reason: "must be positive",
        };

        assert_eq!(err.field(), "max_listeners");
        assert_eq!(err.reason(), "must be positive");
        assert_eq!(err.to_string(), "invalid registry configuration field");
    }
}
