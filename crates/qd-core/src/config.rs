//! Workbench configuration

use serde::{Deserialize, Serialize};

/// Default minimum length for view and snippet names
pub const DEFAULT_MIN_NAME_LENGTH: usize = 3;

/// Save workflow configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkbenchConfig {
    /// Minimum name length enforced by the validation gate
    pub min_name_length: usize,
}

impl WorkbenchConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With minimum name length
    #[inline]
    #[must_use]
    pub fn with_min_name_length(mut self, min: usize) -> Self {
        self.min_name_length = min;
        self
    }
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            min_name_length: DEFAULT_MIN_NAME_LENGTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_minimum_is_three() {
        assert_eq!(WorkbenchConfig::new().min_name_length, 3);
    }

    #[test]
    fn builder_overrides_minimum() {
        let config = WorkbenchConfig::new().with_min_name_length(5);
        assert_eq!(config.min_name_length, 5);
    }
}
