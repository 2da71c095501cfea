//! Protobuf encoding of traces and table snapshots
//!
//! Lets an out-of-process presentation layer receive frames and the table to
//! render them against.

use crate::error::{Result, TraceError};
use crate::replay::{Action, Replay};
use probeset_core::{Frame, FrameKind, HashTable, Message, ProbeStrategy, Slot, TableConfig};
use prost::Message as _;

/// Wire messages
pub mod proto {
    /// One frame; `text` is the rendered message
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Frame {
        #[prost(uint32, tag = "1")]
        pub kind: u32,
        #[prost(uint64, tag = "2")]
        pub index: u64,
        #[prost(uint32, tag = "3")]
        pub message: u32,
        #[prost(uint64, tag = "4")]
        pub capacity: u64,
        #[prost(string, tag = "5")]
        pub text: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Trace {
        #[prost(uint32, tag = "1")]
        pub action: u32,
        #[prost(sint64, tag = "2")]
        pub key: i64,
        #[prost(uint32, tag = "3")]
        pub strategy: u32,
        #[prost(message, repeated, tag = "4")]
        pub frames: Vec<Frame>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Slot {
        #[prost(uint32, tag = "1")]
        pub state: u32,
        #[prost(sint64, tag = "2")]
        pub key: i64,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct TableSnapshot {
        #[prost(uint64, tag = "1")]
        pub initial_capacity: u64,
        #[prost(double, tag = "2")]
        pub load_factor_threshold: f64,
        #[prost(uint64, tag = "3")]
        pub max_probes: u64,
        #[prost(bool, tag = "4")]
        pub trace_rehash: bool,
        #[prost(message, repeated, tag = "5")]
        pub slots: Vec<Slot>,
        #[prost(uint64, tag = "6")]
        pub occupied: u64,
        #[prost(uint64, tag = "7")]
        pub tombstones: u64,
        #[prost(bytes = "vec", tag = "8")]
        pub fingerprint: Vec<u8>,
    }
}

const SLOT_EMPTY: u32 = 0;
const SLOT_TOMBSTONE: u32 = 1;
const SLOT_OCCUPIED: u32 = 2;

/// Decoded trace, without the draft table
#[derive(Clone, Debug, PartialEq)]
pub struct TraceRecord {
    pub action: Action,
    pub key: i64,
    pub strategy: ProbeStrategy,
    pub frames: Vec<Frame>,
}

impl Replay {
    /// Encode action, key, strategy and frames
    pub fn encode_trace(&self) -> Vec<u8> {
        proto::Trace {
            action: self.action.tag(),
            key: self.key,
            strategy: self.strategy.tag(),
            frames: self.frames.iter().map(frame_to_proto).collect(),
        }
        .encode_to_vec()
    }
}

/// Decode a trace produced by `Replay::encode_trace`
pub fn decode_trace(bytes: &[u8]) -> Result<TraceRecord> {
    let trace = proto::Trace::decode(bytes)?;

    let action = Action::from_tag(trace.action)
        .ok_or_else(|| TraceError::invalid(format!("unknown action tag {}", trace.action)))?;
    let strategy = ProbeStrategy::from_tag(trace.strategy)
        .ok_or_else(|| TraceError::invalid(format!("unknown strategy tag {}", trace.strategy)))?;
    let frames = trace
        .frames
        .iter()
        .map(frame_from_proto)
        .collect::<Result<Vec<_>>>()?;

    Ok(TraceRecord {
        action,
        key: trace.key,
        strategy,
        frames,
    })
}

/// Encode a table's configuration, slots and counters
pub fn encode_snapshot(table: &HashTable) -> Vec<u8> {
    let config = table.config();
    let slots = table
        .slots()
        .iter()
        .map(|slot| match slot {
            Slot::Empty => proto::Slot {
                state: SLOT_EMPTY,
                key: 0,
            },
            Slot::Tombstone => proto::Slot {
                state: SLOT_TOMBSTONE,
                key: 0,
            },
            Slot::Occupied(key) => proto::Slot {
                state: SLOT_OCCUPIED,
                key: *key,
            },
        })
        .collect();

    proto::TableSnapshot {
        initial_capacity: config.initial_capacity as u64,
        load_factor_threshold: config.load_factor_threshold,
        max_probes: config.max_probes as u64,
        trace_rehash: config.trace_rehash,
        slots,
        occupied: table.len() as u64,
        tombstones: table.tombstones() as u64,
        fingerprint: table.fingerprint().digest().to_vec(),
    }
    .encode_to_vec()
}

/// Decode and validate a snapshot
///
/// Counters and fingerprint must agree with the slots.
pub fn decode_snapshot(bytes: &[u8]) -> Result<HashTable> {
    let snapshot = proto::TableSnapshot::decode(bytes)?;

    let config = TableConfig {
        initial_capacity: snapshot.initial_capacity as usize,
        load_factor_threshold: snapshot.load_factor_threshold,
        max_probes: snapshot.max_probes as usize,
        trace_rehash: snapshot.trace_rehash,
    };

    let slots = snapshot
        .slots
        .iter()
        .map(|slot| match slot.state {
            SLOT_EMPTY => Ok(Slot::Empty),
            SLOT_TOMBSTONE => Ok(Slot::Tombstone),
            SLOT_OCCUPIED => Ok(Slot::Occupied(slot.key)),
            other => Err(TraceError::invalid(format!("unknown slot state {}", other))),
        })
        .collect::<Result<Vec<_>>>()?;

    let table = HashTable::from_slots(slots, config)?;

    if table.len() as u64 != snapshot.occupied || table.tombstones() as u64 != snapshot.tombstones {
        return Err(TraceError::invalid(format!(
            "counters ({} live, {} tombstones) disagree with slots ({}, {})",
            snapshot.occupied,
            snapshot.tombstones,
            table.len(),
            table.tombstones()
        )));
    }
    if table.fingerprint().digest()[..] != snapshot.fingerprint[..] {
        return Err(TraceError::invalid("fingerprint mismatch"));
    }

    Ok(table)
}

fn message_tag(message: Message) -> (u32, u64) {
    match message {
        Message::Searching => (0, 0),
        Message::Found => (1, 0),
        Message::NotFound => (2, 0),
        Message::AlreadyPresent => (3, 0),
        Message::Adding => (4, 0),
        Message::Deleting => (5, 0),
        Message::Resized { capacity } => (6, capacity as u64),
        Message::TombstonesCleared => (7, 0),
        Message::NoRehashNeeded => (8, 0),
    }
}

fn message_from_tag(tag: u32, capacity: u64) -> Option<Message> {
    let message = match tag {
        0 => Message::Searching,
        1 => Message::Found,
        2 => Message::NotFound,
        3 => Message::AlreadyPresent,
        4 => Message::Adding,
        5 => Message::Deleting,
        6 => Message::Resized {
            capacity: capacity as usize,
        },
        7 => Message::TombstonesCleared,
        8 => Message::NoRehashNeeded,
        _ => return None,
    };
    Some(message)
}

fn frame_to_proto(frame: &Frame) -> proto::Frame {
    let (message, capacity) = message_tag(frame.message);
    proto::Frame {
        kind: frame.kind.tag(),
        index: frame.index as u64,
        message,
        capacity,
        text: frame.message.to_string(),
    }
}

fn frame_from_proto(frame: &proto::Frame) -> Result<Frame> {
    let message = message_from_tag(frame.message, frame.capacity)
        .ok_or_else(|| TraceError::invalid(format!("unknown message tag {}", frame.message)))?;
    let kind = FrameKind::from_tag(frame.kind)
        .ok_or_else(|| TraceError::invalid(format!("unknown frame kind {}", frame.kind)))?;

    if kind != message.kind() {
        return Err(TraceError::invalid(format!(
            "frame kind {:?} does not match message {:?}",
            kind, message
        )));
    }

    Ok(Frame::new(frame.index as usize, message))
}
