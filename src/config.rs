//! Loop configuration
//!
//! A [`LoopConfig`] can be built in code or loaded from a JSON file such as:
//!
//! ```json
//! { "microtask_budget": 500, "fail_on_unhandled_rejection": true }
//! ```
//!
//! Missing fields take their defaults. The microtask budget is off unless set.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tunables for an [`EventLoop`](crate::event_loop::EventLoop)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoopConfig {
    /// Maximum microtasks drained between two macrotasks; `None` means unbounded
    pub microtask_budget: Option<usize>,
    /// Report rejections nobody handled once the drain completes
    pub report_unhandled_rejections: bool,
    /// Treat an unhandled rejection as a failed run (non-zero CLI exit)
    pub fail_on_unhandled_rejection: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            microtask_budget: None,
            report_unhandled_rejections: true,
            fail_on_unhandled_rejection: false,
        }
    }
}

impl LoopConfig {
    /// Load a config from a JSON string
    pub fn load(json: &str) -> Result<Self> {
        let config: LoopConfig = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Failed to parse loop config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::load(&json)
    }

    /// Cap the number of microtasks one drain pass may run
    pub fn with_microtask_budget(mut self, budget: usize) -> Self {
        self.microtask_budget = Some(budget);
        self
    }

    /// Check the values are usable
    pub fn validate(&self) -> Result<()> {
        if self.microtask_budget == Some(0) {
            return Err(Error::Config(
                "microtask_budget must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoopConfig::default();
        assert_eq!(config.microtask_budget, None);
        assert!(config.report_unhandled_rejections);
        assert!(!config.fail_on_unhandled_rejection);
    }

    #[test]
    fn test_load_partial() {
        let config = LoopConfig::load(r#"{ "microtask_budget": 32 }"#).unwrap();
        assert_eq!(config.microtask_budget, Some(32));
        assert!(config.report_unhandled_rejections);
    }

    #[test]
    fn test_load_explicit_null_budget() {
        let config = LoopConfig::load(r#"{ "microtask_budget": null }"#).unwrap();
        assert_eq!(config.microtask_budget, None);
    }

    #[test]
    fn test_load_rejects_unknown_fields() {
        let err = LoopConfig::load(r#"{ "tick_rate": 5 }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_rejects_zero_budget() {
        let err = LoopConfig::load(r#"{ "microtask_budget": 0 }"#).unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loop.json");
        std::fs::write(&path, r#"{ "fail_on_unhandled_rejection": true }"#).unwrap();

        let config = LoopConfig::from_file(&path).unwrap();
        assert!(config.fail_on_unhandled_rejection);

        let missing = LoopConfig::from_file(dir.path().join("nope.json"));
        assert!(matches!(missing, Err(Error::Config(_))));
    }
}
