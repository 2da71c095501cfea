//! Draft/commit session over a committed table
//!
//! Every action runs on a deep copy; the committed table only changes when
//! the caller commits the replay, typically after playing its frames back.

use crate::error::{Result, TraceError};
use crate::replay::{Action, Replay};
use log::{debug, info};
use probeset_core::{HashTable, ProbeSetError, ProbeStrategy, TableConfig};
use std::fmt;

/// Committed table plus the strategy used for every action
pub struct Session {
    /// Last committed table
    pub(crate) table: HashTable,

    /// Strategy applied to every action
    pub(crate) strategy: ProbeStrategy,
}

impl Session {
    /// New session with an empty table
    ///
    /// # Arguments
    /// * `config` - Tuning for the table, kept across clears
    /// * `strategy` - Initial probing strategy
    pub fn new(config: TableConfig, strategy: ProbeStrategy) -> Result<Self> {
        Ok(Session {
            table: HashTable::with_config(config)?,
            strategy,
        })
    }

    pub fn strategy(&self) -> ProbeStrategy {
        self.strategy
    }

    /// Switch strategy, clearing the table when it actually changes
    ///
    /// Keys placed by one strategy are not reliably reachable by another.
    /// Returns true if the table was cleared.
    pub fn set_strategy(&mut self, strategy: ProbeStrategy) -> bool {
        if strategy == self.strategy {
            return false;
        }
        info!("switching strategy {} -> {}, clearing table", self.strategy, strategy);
        self.strategy = strategy;
        self.table.clear();
        true
    }

    /// Run `action` on a draft copy of the committed table
    ///
    /// An absent key is rejected for every action.
    pub fn perform(&self, action: Action, key: impl Into<Option<i64>>) -> Result<Replay> {
        let key = key.into().ok_or(ProbeSetError::InvalidKey)?;
        let mut draft = self.table.deep_copy();

        let frames = match action {
            Action::Insert => draft.insert(key, self.strategy)?,
            Action::Search => draft.search(key, self.strategy),
            Action::Delete => draft.delete(key, self.strategy),
        };
        debug!("{} {} ({}): {} frames", action, key, self.strategy, frames.len());

        Ok(Replay {
            action,
            key,
            strategy: self.strategy,
            frames,
            draft,
            base: self.table.fingerprint(),
        })
    }

    /// Install the replay's draft as the committed table
    ///
    /// Fails with `StaleReplay` if the committed table changed since the
    /// replay was produced. Returns true if the table changed.
    pub fn commit(&mut self, replay: Replay) -> Result<bool> {
        if replay.base != self.table.fingerprint() || replay.strategy != self.strategy {
            return Err(TraceError::StaleReplay);
        }

        let changed = replay.changes_table();
        if changed {
            info!(
                "committed {} {}: capacity {}, {} keys, {} tombstones",
                replay.action,
                replay.key,
                replay.draft.capacity(),
                replay.draft.len(),
                replay.draft.tombstones()
            );
            self.table = replay.draft;
        } else {
            debug!("{} {} left the table unchanged", replay.action, replay.key);
        }
        Ok(changed)
    }

    /// Perform and commit in one step
    pub fn apply(&mut self, action: Action, key: impl Into<Option<i64>>) -> Result<Replay> {
        let replay = self.perform(action, key)?;
        self.commit(replay.clone())?;
        Ok(replay)
    }

    /// Drop every key, keeping the configuration and strategy
    pub fn clear(&mut self) {
        info!("clearing table");
        self.table.clear();
    }

    pub fn table(&self) -> &HashTable {
        &self.table
    }

    pub fn stats(&self) -> TableStats {
        TableStats {
            capacity: self.table.capacity(),
            len: self.table.len(),
            tombstones: self.table.tombstones(),
            load_factor: self.table.load_factor(),
            live_factor: self.table.live_factor(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Session {
            table: HashTable::new(),
            strategy: ProbeStrategy::default(),
        }
    }
}

/// Occupancy summary of the committed table
#[derive(Debug, Clone, PartialEq)]
pub struct TableStats {
    pub capacity: usize,
    pub len: usize,
    pub tombstones: usize,
    pub load_factor: f64,
    pub live_factor: f64,
}

impl fmt::Display for TableStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "capacity={} len={} tombstones={} load={:.3} live={:.3}",
            self.capacity, self.len, self.tombstones, self.load_factor, self.live_factor
        )
    }
}
