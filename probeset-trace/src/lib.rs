//! Replay layer for probeset tables
//!
//! Provides:
//! - Draft/commit sessions mirroring how a visualiser drives the table
//! - Replays carrying frames plus the draft to commit afterwards
//! - Trace and snapshot serialization (protobuf)

pub mod error;
pub mod replay;
pub mod serialization;
pub mod session;

pub use error::{Result, TraceError};
pub use replay::{Action, Replay};
pub use serialization::{decode_snapshot, decode_trace, encode_snapshot, TraceRecord};
pub use session::{Session, TableStats};

// Re-export protobuf types
pub use serialization::proto;
