//! Table tuning parameters
//!
//! Every table carries its own copy, so tables with different tuning can
//! live side by side.

use crate::error::{ProbeSetError, Result};
use serde::{Deserialize, Serialize};

/// Capacity of a freshly created table
pub const DEFAULT_INITIAL_CAPACITY: usize = 7;

/// Load factor above which an insert triggers a rehash
pub const DEFAULT_LOAD_FACTOR_THRESHOLD: f64 = 0.5;

/// Hard bound on probe attempts per operation
pub const DEFAULT_MAX_PROBES: usize = 100;

/// Configuration passed to the table constructor
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Length of the slot array for a new or cleared table
    pub initial_capacity: usize,

    /// Threshold compared against both the combined and the live load factor
    pub load_factor_threshold: f64,

    /// Maximum number of probe attempts before giving up
    pub max_probes: usize,

    /// Forward frames of rebuild reinsertions into the caller's trace
    pub trace_rehash: bool,
}

impl TableConfig {
    /// Default configuration with a different initial capacity
    pub fn with_capacity(initial_capacity: usize) -> Self {
        TableConfig {
            initial_capacity,
            ..Self::default()
        }
    }

    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TableConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every field is in range
    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity == 0 {
            return Err(ProbeSetError::invalid_config(
                "initial_capacity must be positive",
            ));
        }
        if !(self.load_factor_threshold > 0.0 && self.load_factor_threshold < 1.0) {
            return Err(ProbeSetError::invalid_config(format!(
                "load_factor_threshold must be in (0, 1), got {}",
                self.load_factor_threshold
            )));
        }
        if self.max_probes == 0 {
            return Err(ProbeSetError::invalid_config(
                "max_probes must be positive",
            ));
        }
        Ok(())
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            load_factor_threshold: DEFAULT_LOAD_FACTOR_THRESHOLD,
            max_probes: DEFAULT_MAX_PROBES,
            trace_rehash: false,
        }
    }
}
