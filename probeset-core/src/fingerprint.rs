//! Slot-layout fingerprints
//!
//! Provides:
//! - A 32-byte BLAKE3 digest over capacity, slot states and counters
//! - O(1) comparison between a committed table and a draft

use crate::hashtable::Slot;
use blake3::Hasher;
use std::fmt;

/// Raw digest bytes
pub type Digest = [u8; 32];

/// Fingerprint of a table's exact layout
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    digest: Digest,
}

impl Fingerprint {
    /// Hash a slot array together with its bookkeeping counters
    ///
    /// Layout-sensitive: the same keys at different indices hash differently.
    pub fn of_slots(slots: &[Slot], occupied: usize, tombstones: usize) -> Self {
        let mut hasher = Hasher::new();
        hasher.update(&(slots.len() as u64).to_le_bytes());
        hasher.update(&(occupied as u64).to_le_bytes());
        hasher.update(&(tombstones as u64).to_le_bytes());

        for slot in slots {
            match slot {
                Slot::Empty => {
                    hasher.update(&[0u8]);
                }
                Slot::Tombstone => {
                    hasher.update(&[1u8]);
                }
                Slot::Occupied(key) => {
                    hasher.update(&[2u8]);
                    hasher.update(&key.to_le_bytes());
                }
            }
        }

        Fingerprint {
            digest: *hasher.finalize().as_bytes(),
        }
    }

    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    /// Lowercase hex rendering of the digest
    pub fn to_hex(&self) -> String {
        self.digest.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..16])
    }
}
