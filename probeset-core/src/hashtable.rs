//! Instrumented open-addressing hash set
//!
//! Provides:
//! - Insert, search and delete over integer keys with per-call probing strategy
//! - Tombstone deletion that keeps probe chains traversable
//! - Automatic growth to the next prime over twice the capacity
//! - A frame trace of every probe step for replay

use crate::config::TableConfig;
use crate::error::{ProbeSetError, Result};
use crate::fingerprint::Fingerprint;
use crate::frame::{Discard, Frame, FrameSink, Message, Trace};
use crate::prime::next_prime_over;
use crate::probing::ProbeStrategy;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::mem;

/// One position in the slot array
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Slot {
    /// Never occupied, or cleared by a rebuild
    #[default]
    Empty,
    /// Held a key that was deleted
    Tombstone,
    /// Holds a live key
    Occupied(i64),
}

impl Slot {
    pub fn key(&self) -> Option<i64> {
        match self {
            Slot::Occupied(key) => Some(*key),
            _ => None,
        }
    }

    pub fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied(_))
    }
}

/// Starting index for `key`: `|key mod capacity|`
#[inline]
pub fn hash_index(key: i64, capacity: usize) -> usize {
    (key % capacity as i64).unsigned_abs() as usize
}

/// What a rehash check did after an insert
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rehash {
    NotNeeded,
    Grown { from: usize, to: usize },
    TombstonesCleared { cleared: usize },
}

impl Rehash {
    fn message(self) -> Message {
        match self {
            Rehash::NotNeeded => Message::NoRehashNeeded,
            Rehash::Grown { to, .. } => Message::Resized { capacity: to },
            Rehash::TombstonesCleared { .. } => Message::TombstonesCleared,
        }
    }
}

/// Result of a successful insert call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Key written at `index` (an index into the pre-rehash array)
    Added { index: usize, rehash: Rehash },
    /// Key was already live at `index`; nothing changed
    AlreadyPresent { index: usize },
}

// Where a traversal stopped
enum Probe {
    Hit(usize),
    Vacant {
        index: usize,
        first_tombstone: Option<usize>,
    },
    Exhausted {
        index: usize,
        attempts: usize,
        first_tombstone: Option<usize>,
    },
}

/// Open-addressing set of `i64` keys
#[derive(Clone, Debug, PartialEq)]
pub struct HashTable {
    /// Slot array; its length is the capacity
    pub(crate) slots: Vec<Slot>,

    /// Number of `Occupied` slots
    pub(crate) occupied: usize,

    /// Number of `Tombstone` slots
    pub(crate) tombstones: usize,

    pub(crate) config: TableConfig,
}

impl HashTable {
    /// Empty table with the default configuration (capacity 7)
    pub fn new() -> Self {
        Self::empty(TableConfig::default())
    }

    /// Empty table with `capacity` slots and otherwise default tuning
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be positive");
        Self::empty(TableConfig::with_capacity(capacity))
    }

    /// Empty table from an explicit configuration
    pub fn with_config(config: TableConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::empty(config))
    }

    /// Rebuild a table from an existing slot layout
    ///
    /// Counters are derived from the slots. Fails on an empty array or
    /// duplicate live keys.
    pub fn from_slots(slots: Vec<Slot>, config: TableConfig) -> Result<Self> {
        config.validate()?;
        if slots.is_empty() {
            return Err(ProbeSetError::InvalidLayout {
                message: "slot array must not be empty".to_string(),
            });
        }

        let mut seen = HashSet::new();
        let mut occupied = 0;
        let mut tombstones = 0;
        for slot in &slots {
            match slot {
                Slot::Empty => {}
                Slot::Tombstone => tombstones += 1,
                Slot::Occupied(key) => {
                    if !seen.insert(*key) {
                        return Err(ProbeSetError::InvalidLayout {
                            message: format!("key {} appears more than once", key),
                        });
                    }
                    occupied += 1;
                }
            }
        }

        Ok(HashTable {
            slots,
            occupied,
            tombstones,
            config,
        })
    }

    fn empty(config: TableConfig) -> Self {
        HashTable {
            slots: vec![Slot::Empty; config.initial_capacity],
            occupied: 0,
            tombstones: 0,
            config,
        }
    }

    // === Operations ===

    /// Insert `key`, returning the frame trace
    ///
    /// An absent key fails with `InvalidKey` before any frame is produced.
    pub fn insert(&mut self, key: impl Into<Option<i64>>, strategy: ProbeStrategy) -> Result<Vec<Frame>> {
        let mut trace = Trace::new();
        self.insert_traced(key, strategy, &mut trace)?;
        Ok(trace.into_frames())
    }

    /// Search for `key`, returning the frame trace
    pub fn search(&self, key: i64, strategy: ProbeStrategy) -> Vec<Frame> {
        let mut trace = Trace::new();
        self.search_traced(key, strategy, &mut trace);
        trace.into_frames()
    }

    /// Delete `key`, returning the frame trace
    pub fn delete(&mut self, key: i64, strategy: ProbeStrategy) -> Vec<Frame> {
        let mut trace = Trace::new();
        self.delete_traced(key, strategy, &mut trace);
        trace.into_frames()
    }

    /// Insert `key`, streaming frames into `sink`
    ///
    /// The walk continues past tombstones to confirm the key is absent, so
    /// the `Searching` frames can run beyond the slot the key lands in: the
    /// `Adding` frame may point back at an earlier index.
    ///
    /// On `ProbeExhausted` the table is unchanged, but the probe frames
    /// already streamed stay in `sink`. The error names `key` even when the
    /// failing walk belonged to a reinsertion during a resize.
    pub fn insert_traced<S: FrameSink>(
        &mut self,
        key: impl Into<Option<i64>>,
        strategy: ProbeStrategy,
        sink: &mut S,
    ) -> Result<InsertOutcome> {
        let key = key.into().ok_or(ProbeSetError::InvalidKey)?;
        self.insert_key(key, strategy, sink)
    }

    /// Search for `key`, streaming frames into `sink`
    ///
    /// Returns the index holding the key, if found.
    pub fn search_traced<S: FrameSink>(&self, key: i64, strategy: ProbeStrategy, sink: &mut S) -> Option<usize> {
        match self.probe(key, strategy, sink) {
            Probe::Hit(index) => {
                debug!("search {} ({}): found at {}", key, strategy, index);
                sink.record(Frame::new(index, Message::Found));
                Some(index)
            }
            Probe::Vacant { index, .. } | Probe::Exhausted { index, .. } => {
                debug!("search {} ({}): not found, stopped at {}", key, strategy, index);
                sink.record(Frame::new(index, Message::NotFound));
                None
            }
        }
    }

    /// Delete `key`, streaming frames into `sink`
    ///
    /// Returns the index that became a tombstone, if the key was present.
    pub fn delete_traced<S: FrameSink>(&mut self, key: i64, strategy: ProbeStrategy, sink: &mut S) -> Option<usize> {
        match self.probe(key, strategy, sink) {
            Probe::Hit(index) => {
                self.slots[index] = Slot::Tombstone;
                self.tombstones += 1;
                self.occupied -= 1;
                debug!("delete {} ({}): tombstoned slot {}", key, strategy, index);
                sink.record(Frame::new(index, Message::Deleting));
                Some(index)
            }
            Probe::Vacant { index, .. } | Probe::Exhausted { index, .. } => {
                debug!("delete {} ({}): not found, stopped at {}", key, strategy, index);
                sink.record(Frame::new(index, Message::NotFound));
                None
            }
        }
    }

    /// Silent membership test
    pub fn contains(&self, key: i64, strategy: ProbeStrategy) -> bool {
        self.search_traced(key, strategy, &mut Discard).is_some()
    }

    fn insert_key(&mut self, key: i64, strategy: ProbeStrategy, sink: &mut dyn FrameSink) -> Result<InsertOutcome> {
        let index = match self.probe(key, strategy, sink) {
            Probe::Hit(index) => {
                debug!("insert {} ({}): already present at {}", key, strategy, index);
                sink.record(Frame::new(index, Message::AlreadyPresent));
                return Ok(InsertOutcome::AlreadyPresent { index });
            }
            Probe::Vacant {
                index,
                first_tombstone,
            } => first_tombstone.unwrap_or(index),
            Probe::Exhausted {
                first_tombstone: Some(tombstone),
                ..
            } => tombstone,
            Probe::Exhausted { index, attempts, .. } => {
                warn!(
                    "insert {} ({}): probe bound of {} attempts exhausted at {}",
                    key, strategy, attempts, index
                );
                return Err(ProbeSetError::ProbeExhausted { key, attempts, index });
            }
        };

        let replaced = self.slots[index];
        if replaced == Slot::Tombstone {
            self.tombstones -= 1;
        }
        self.slots[index] = Slot::Occupied(key);
        self.occupied += 1;
        debug!("insert {} ({}): placed at {}", key, strategy, index);
        sink.record(Frame::new(index, Message::Adding));

        let rehash = match self.apply_resize_policy(strategy, sink) {
            Ok(rehash) => rehash,
            Err(err) => {
                // rebuild restored the layout; take the new key back out
                self.slots[index] = replaced;
                self.occupied -= 1;
                if replaced == Slot::Tombstone {
                    self.tombstones += 1;
                }
                return Err(match err {
                    ProbeSetError::ProbeExhausted { attempts, index, .. } => {
                        ProbeSetError::ProbeExhausted { key, attempts, index }
                    }
                    other => other,
                });
            }
        };
        sink.record(Frame::new(index, rehash.message()));

        Ok(InsertOutcome::Added { index, rehash })
    }

    /// Walk the probe sequence for `key`
    ///
    /// Records a `Searching` frame for the start index and for every advance.
    /// Stops on a live match or the first `Empty`; tombstones are passed over,
    /// the first one remembered for reuse by insert.
    fn probe(&self, key: i64, strategy: ProbeStrategy, sink: &mut dyn FrameSink) -> Probe {
        let capacity = self.capacity();
        let start = hash_index(key, capacity);
        let mut index = start;
        let mut first_tombstone = None;
        let mut attempt = 0;

        sink.record(Frame::searching(index));

        loop {
            match self.slots[index] {
                Slot::Occupied(existing) if existing == key => return Probe::Hit(index),
                Slot::Empty => {
                    return Probe::Vacant {
                        index,
                        first_tombstone,
                    }
                }
                Slot::Tombstone => {
                    first_tombstone.get_or_insert(index);
                }
                Slot::Occupied(_) => {}
            }

            if attempt >= self.config.max_probes {
                return Probe::Exhausted {
                    index,
                    attempts: attempt,
                    first_tombstone,
                };
            }

            attempt += 1;
            index = strategy.index_for(start, attempt, capacity);
            trace!("probe {} ({}): attempt {} -> {}", key, strategy, attempt, index);
            sink.record(Frame::searching(index));
        }
    }

    // === Resizing ===

    fn apply_resize_policy(&mut self, strategy: ProbeStrategy, sink: &mut dyn FrameSink) -> Result<Rehash> {
        let threshold = self.config.load_factor_threshold;
        if self.load_factor() <= threshold {
            return Ok(Rehash::NotNeeded);
        }

        let from = self.capacity();
        if self.live_factor() > threshold {
            let to = next_prime_over(from * 2);
            debug!(
                "growing table {} -> {} ({} live, {} tombstones)",
                from, to, self.occupied, self.tombstones
            );
            self.rebuild(to, strategy, sink)?;
            Ok(Rehash::Grown { from, to })
        } else {
            let cleared = self.tombstones;
            debug!("rehashing table of {} in place, clearing {} tombstones", from, cleared);
            self.rebuild(from, strategy, sink)?;
            Ok(Rehash::TombstonesCleared { cleared })
        }
    }

    /// Reinsert every live key, in ascending slot order, into a fresh array
    ///
    /// Reinsertion runs the full insert path, resize policy included.
    /// On failure the previous layout is restored.
    fn rebuild(&mut self, capacity: usize, strategy: ProbeStrategy, sink: &mut dyn FrameSink) -> Result<()> {
        let live: Vec<i64> = self.keys().collect();
        let previous_slots = mem::replace(&mut self.slots, vec![Slot::Empty; capacity]);
        let previous_occupied = mem::replace(&mut self.occupied, 0);
        let previous_tombstones = mem::replace(&mut self.tombstones, 0);

        for key in live {
            let result = if self.config.trace_rehash {
                self.insert_key(key, strategy, sink)
            } else {
                self.insert_key(key, strategy, &mut Discard)
            };

            if let Err(err) = result {
                warn!("rebuild to {} failed, restoring previous layout: {}", capacity, err);
                self.slots = previous_slots;
                self.occupied = previous_occupied;
                self.tombstones = previous_tombstones;
                return Err(err);
            }
        }

        Ok(())
    }

    // === Inspection ===

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.occupied
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Number of tombstones
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// `(live + tombstones) / capacity`
    pub fn load_factor(&self) -> f64 {
        (self.occupied + self.tombstones) as f64 / self.capacity() as f64
    }

    /// `live / capacity`
    pub fn live_factor(&self) -> f64 {
        self.occupied as f64 / self.capacity() as f64
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Live keys in slot order
    pub fn keys(&self) -> impl Iterator<Item = i64> + '_ {
        self.slots.iter().filter_map(Slot::key)
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Independent copy of slots and counters
    pub fn deep_copy(&self) -> Self {
        self.clone()
    }

    /// Reset to an empty table of the configured initial capacity
    pub fn clear(&mut self) {
        self.slots = vec![Slot::Empty; self.config.initial_capacity];
        self.occupied = 0;
        self.tombstones = 0;
    }

    /// Digest of the exact slot layout
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of_slots(&self.slots, self.occupied, self.tombstones)
    }

    /// True if both tables have the same layout and counters
    pub fn is_identical(&self, other: &Self) -> bool {
        self.fingerprint() == other.fingerprint()
    }
}

impl Default for HashTable {
    fn default() -> Self {
        Self::new()
    }
}
