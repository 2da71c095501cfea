//! Probe-sequence strategies
//!
//! A strategy maps `(start, attempt, capacity)` to the next index to examine.
//! The table hashes once; every later index comes from here.

use crate::hashtable::HashTable;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Collision resolution strategy, chosen per call
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProbeStrategy {
    /// `(start + attempt) mod capacity`
    #[default]
    Linear,
    /// `(start + attempt²) mod capacity`
    Quadratic,
    /// `(start + attempt * step) mod capacity`, step derived from `start`
    DoubleHashing,
}

impl ProbeStrategy {
    /// All strategies, in tag order
    pub const ALL: [ProbeStrategy; 3] = [
        ProbeStrategy::Linear,
        ProbeStrategy::Quadratic,
        ProbeStrategy::DoubleHashing,
    ];

    /// Next index for the table's current capacity
    #[inline]
    pub fn next(self, start: usize, attempt: usize, table: &HashTable) -> usize {
        self.index_for(start, attempt, table.capacity())
    }

    /// Next index for an explicit capacity
    ///
    /// `attempt` is 1-based; attempt 0 is the start index itself.
    pub fn index_for(self, start: usize, attempt: usize, capacity: usize) -> usize {
        debug_assert!(capacity > 0, "capacity must be positive");
        let start = start as u128;
        let attempt = attempt as u128;
        let capacity_wide = capacity as u128;

        let offset = match self {
            ProbeStrategy::Linear => attempt,
            ProbeStrategy::Quadratic => attempt * attempt,
            ProbeStrategy::DoubleHashing => attempt * Self::double_hash_step(start, capacity_wide),
        };

        ((start + offset) % capacity_wide) as usize
    }

    // Always in [1, capacity - 1], so never a multiple of a prime capacity
    fn double_hash_step(start: u128, capacity: u128) -> u128 {
        if capacity <= 1 {
            1
        } else {
            1 + start % (capacity - 1)
        }
    }

    /// Stable numeric tag
    pub fn tag(self) -> u32 {
        match self {
            ProbeStrategy::Linear => 0,
            ProbeStrategy::Quadratic => 1,
            ProbeStrategy::DoubleHashing => 2,
        }
    }

    /// Strategy for a numeric tag
    pub fn from_tag(tag: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.tag() == tag)
    }
}

impl fmt::Display for ProbeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProbeStrategy::Linear => "linear",
            ProbeStrategy::Quadratic => "quadratic",
            ProbeStrategy::DoubleHashing => "double-hashing",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear() {
        assert_eq!(ProbeStrategy::Linear.index_for(3, 1, 7), 4);
        assert_eq!(ProbeStrategy::Linear.index_for(6, 1, 7), 0);
        assert_eq!(ProbeStrategy::Linear.index_for(5, 3, 7), 1);
    }

    #[test]
    fn test_quadratic() {
        assert_eq!(ProbeStrategy::Quadratic.index_for(3, 1, 7), 4);
        assert_eq!(ProbeStrategy::Quadratic.index_for(3, 2, 7), 0);
        assert_eq!(ProbeStrategy::Quadratic.index_for(3, 3, 7), 5);
    }

    #[test]
    fn test_double_hashing_covers_prime_table() {
        for start in 0..11 {
            let mut seen: Vec<usize> = (0..11)
                .map(|attempt| ProbeStrategy::DoubleHashing.index_for(start, attempt, 11))
                .collect();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), 11, "start {start} does not visit every slot");
        }
    }

    #[test]
    fn test_capacity_one() {
        for strategy in ProbeStrategy::ALL {
            assert_eq!(strategy.index_for(0, 5, 1), 0);
        }
    }

    #[test]
    fn test_large_attempts_do_not_overflow() {
        let index = ProbeStrategy::Quadratic.index_for(usize::MAX - 1, usize::MAX, 13);
        assert!(index < 13);
    }

    #[test]
    fn test_tags() {
        for strategy in ProbeStrategy::ALL {
            assert_eq!(ProbeStrategy::from_tag(strategy.tag()), Some(strategy));
        }
        assert_eq!(ProbeStrategy::from_tag(9), None);
        assert_eq!(ProbeStrategy::DoubleHashing.to_string(), "double-hashing");
    }
}
