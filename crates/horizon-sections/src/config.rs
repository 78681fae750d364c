//! Synchronizer configuration.
//!
//! Defaults match the behavior most hosts want. Applications that keep their
//! settings in TOML can load a `[sections]`-style table directly:
//!
//! ```
//! use horizon_sections::SyncConfig;
//!
//! let config = SyncConfig::from_toml_str(r#"
//! name = "inbox"
//! yield_before_reload = false
//! "#).unwrap();
//!
//! assert_eq!(config.name, "inbox");
//! assert!(!config.yield_before_reload);
//! assert!(config.require_visible_content);
//! ```

use serde::{Deserialize, Serialize};

use horizon_sections_core::dispatch::DEFAULT_WARN_THRESHOLD;

use crate::error::{Result, SyncError};

/// Behavior switches for a [`SectionSynchronizer`](crate::SectionSynchronizer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Label recorded on tracing spans and used as the queue name.
    pub name: String,
    /// Yield the thread once before a full reload so in-flight view work can settle.
    pub yield_before_reload: bool,
    /// Treat "no visible cells" as unsafe for incremental updates.
    pub require_visible_content: bool,
    /// Pending-queue depth at which a warning is logged.
    pub queue_warn_threshold: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            name: "sections".to_string(),
            yield_before_reload: true,
            require_visible_content: true,
            queue_warn_threshold: DEFAULT_WARN_THRESHOLD,
        }
    }
}

impl SyncConfig {
    /// Create a configuration with the given name.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every field holds a usable value.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SyncError::invalid_config("name must not be empty"));
        }
        if self.queue_warn_threshold == 0 {
            return Err(SyncError::invalid_config(
                "queue_warn_threshold must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Set whether to yield before a full reload.
    pub fn yield_before_reload(mut self, enabled: bool) -> Self {
        self.yield_before_reload = enabled;
        self
    }

    /// Set whether an empty viewport forces a full reload.
    pub fn require_visible_content(mut self, required: bool) -> Self {
        self.require_visible_content = required;
        self
    }

    /// Set the queue depth warning threshold.
    pub fn queue_warn_threshold(mut self, threshold: usize) -> Self {
        self.queue_warn_threshold = threshold;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.name, "sections");
        assert!(config.yield_before_reload);
        assert!(config.require_visible_content);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        assert_eq!(SyncConfig::from_toml_str("").unwrap(), SyncConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = SyncConfig::from_toml_str("name = \"  \"").unwrap_err();
        assert!(matches!(err, SyncError::InvalidConfig(_)));

        let err = SyncConfig::from_toml_str("queue_warn_threshold = 0").unwrap_err();
        assert!(matches!(err, SyncError::InvalidConfig(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let err = SyncConfig::from_toml_str("name = ").unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));
    }

    #[test]
    fn test_builder_methods() {
        let config = SyncConfig::with_name("feed")
            .yield_before_reload(false)
            .require_visible_content(false)
            .queue_warn_threshold(8);
        assert_eq!(config.name, "feed");
        assert!(!config.yield_before_reload);
        assert!(!config.require_visible_content);
        assert_eq!(config.queue_warn_threshold, 8);
    }
}
