//! Error type for sessions and wire decoding

use probeset_core::ProbeSetError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraceError {
    /// The table rejected the operation
    #[error(transparent)]
    Table(#[from] ProbeSetError),

    /// Bytes were not a valid protobuf message
    #[error("decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// Message decoded but describes an impossible table or trace
    #[error("invalid snapshot: {message}")]
    InvalidSnapshot { message: String },

    /// The committed table moved on after this replay was produced
    #[error("stale replay: committed table changed since the draft was taken")]
    StaleReplay,
}

impl TraceError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        TraceError::InvalidSnapshot {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TraceError>;
