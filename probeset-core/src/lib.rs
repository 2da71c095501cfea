//! probeset - instrumented open-addressing hash set
//!
//! Core library providing:
//! - Linear, quadratic and double-hashing probe strategies chosen per call
//! - Tombstone deletion and prime-sized growth
//! - A replayable frame trace for every operation
//! - Layout fingerprints for comparing drafts against committed tables

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod frame;
pub mod hashtable;
pub mod prime;
pub mod probing;

pub use config::TableConfig;
pub use error::{ProbeSetError, Result};
pub use fingerprint::Fingerprint;
pub use frame::{Discard, Frame, FrameKind, FrameSink, Message, Trace};
pub use hashtable::{hash_index, HashTable, InsertOutcome, Rehash, Slot};
pub use prime::{is_prime, next_prime_over};
pub use probing::ProbeStrategy;

#[cfg(test)]
mod tests;
