//! Builder configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default autosave debounce in milliseconds
pub const DEFAULT_AUTOSAVE_MS: u64 = 500;

/// Service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Quiet period before a batched text edit is written
    pub autosave_debounce_ms: u64,
    /// Write the `yes_no` and `days` lists when the store has none
    pub seed_default_lists: bool,
}

impl BuilderConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With autosave debounce
    #[inline]
    #[must_use]
    pub fn with_autosave_debounce_ms(mut self, millis: u64) -> Self {
        self.autosave_debounce_ms = millis;
        self
    }

    /// With default list seeding on or off
    #[inline]
    #[must_use]
    pub fn with_seed_default_lists(mut self, seed: bool) -> Self {
        self.seed_default_lists = seed;
        self
    }

    /// Autosave debounce as a duration
    #[inline]
    #[must_use]
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            autosave_debounce_ms: DEFAULT_AUTOSAVE_MS,
            seed_default_lists: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = BuilderConfig::new();
        assert_eq!(config.autosave_delay(), Duration::from_millis(500));
        assert!(config.seed_default_lists);
    }

    #[test]
    fn builders_override() {
        let config = BuilderConfig::new()
            .with_autosave_debounce_ms(50)
            .with_seed_default_lists(false);
        assert_eq!(config.autosave_debounce_ms, 50);
        assert!(!config.seed_default_lists);
    }
}
