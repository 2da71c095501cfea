//! Error type for table operations

use thiserror::Error;

/// Errors raised by the table engine
#[derive(Error, Debug)]
pub enum ProbeSetError {
    /// Insert was called without a key
    #[error("invalid key: this table doesn't support absent keys")]
    InvalidKey,

    /// The probe bound ran out before a usable slot was reached
    #[error("probe sequence exhausted for key {key} after {attempts} attempts (last index {index})")]
    ProbeExhausted {
        /// Key the caller was inserting
        key: i64,
        /// Number of attempts made by the failing walk
        attempts: usize,
        /// Last index the failing walk produced
        index: usize,
    },

    /// Configuration values out of range
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// What was wrong
        message: String,
    },

    /// Slot layout that no sequence of operations could produce
    #[error("invalid layout: {message}")]
    InvalidLayout {
        /// What was wrong
        message: String,
    },

    /// Configuration document could not be parsed
    #[error("configuration parse error: {0}")]
    Config(#[from] serde_json::Error),
}

impl ProbeSetError {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        ProbeSetError::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, ProbeSetError>;
