//! Engine configuration.

use std::time::Duration;

use crate::error::DomainError;

/// Number of undo entries retained when not configured otherwise.
pub const DEFAULT_MAX_HISTORY_SIZE: usize = 20;

/// Pacing delay before a skip-mode wait auto-resolves.
pub const DEFAULT_SKIP_DELAY: Duration = Duration::from_millis(100);

/// Project id used to key save slots when not configured otherwise.
pub const DEFAULT_PROJECT_ID: &str = "default";

/// Runtime configuration for one engine instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Namespaces save slots: records are keyed by `(project_id, slot)`.
    pub project_id: String,
    /// Upper bound on retained undo entries.
    pub max_history_size: usize,
    /// Delay before a continue wait auto-resolves in skip mode.
    pub skip_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            project_id: DEFAULT_PROJECT_ID.to_owned(),
            max_history_size: DEFAULT_MAX_HISTORY_SIZE,
            skip_delay: DEFAULT_SKIP_DELAY,
        }
    }
}

impl EngineConfig {
    /// Reads configuration from the process environment.
    ///
    /// Recognised variables: `TALESPIN_PROJECT_ID`, `TALESPIN_MAX_HISTORY`,
    /// `TALESPIN_SKIP_DELAY_MS`. Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a value is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DomainError> {
        let mut config = Self::default();

        if let Some(project_id) = lookup("TALESPIN_PROJECT_ID") {
            if project_id.trim().is_empty() {
                return Err(DomainError::Validation(
                    "TALESPIN_PROJECT_ID must not be empty".to_owned(),
                ));
            }
            config.project_id = project_id;
        }

        if let Some(raw) = lookup("TALESPIN_MAX_HISTORY") {
            config.max_history_size = raw.parse().map_err(|e| {
                DomainError::Validation(format!("TALESPIN_MAX_HISTORY must be a valid usize: {e}"))
            })?;
        }

        if let Some(raw) = lookup("TALESPIN_SKIP_DELAY_MS") {
            let millis: u64 = raw.parse().map_err(|e| {
                DomainError::Validation(format!(
                    "TALESPIN_SKIP_DELAY_MS must be a valid u64: {e}"
                ))
            })?;
            config.skip_delay = Duration::from_millis(millis);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_defaults_when_unset() {
        let config = EngineConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.max_history_size, 20);
    }

    #[test]
    fn test_from_lookup_reads_all_variables() {
        // Arrange
        let lookup = lookup_from(&[
            ("TALESPIN_PROJECT_ID", "lighthouse"),
            ("TALESPIN_MAX_HISTORY", "5"),
            ("TALESPIN_SKIP_DELAY_MS", "10"),
        ]);

        // Act
        let config = EngineConfig::from_lookup(lookup).unwrap();

        // Assert
        assert_eq!(config.project_id, "lighthouse");
        assert_eq!(config.max_history_size, 5);
        assert_eq!(config.skip_delay, Duration::from_millis(10));
    }

    #[test]
    fn test_from_lookup_rejects_invalid_numbers() {
        let result = EngineConfig::from_lookup(lookup_from(&[("TALESPIN_MAX_HISTORY", "lots")]));

        match result {
            Err(DomainError::Validation(msg)) => assert!(msg.contains("TALESPIN_MAX_HISTORY")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_from_lookup_rejects_blank_project_id() {
        let result = EngineConfig::from_lookup(lookup_from(&[("TALESPIN_PROJECT_ID", "  ")]));

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
