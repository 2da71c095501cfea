//! Trace frames for replaying probe sequences
//!
//! Frames are:
//! - Produced fresh for each operation, in probe order
//! - Owned by the caller, never retained by the table
//! - Tagged with a closed set of messages the presentation layer renders

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a frame shows at its index
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameKind {
    Searching,
    Found,
    NotFound,
}

impl FrameKind {
    /// Stable numeric tag
    pub fn tag(self) -> u32 {
        match self {
            FrameKind::Searching => 0,
            FrameKind::Found => 1,
            FrameKind::NotFound => 2,
        }
    }

    /// Kind for a numeric tag
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            0 => Some(FrameKind::Searching),
            1 => Some(FrameKind::Found),
            2 => Some(FrameKind::NotFound),
            _ => None,
        }
    }
}

/// Message attached to a frame
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Message {
    Searching,
    Found,
    NotFound,
    AlreadyPresent,
    Adding,
    Deleting,
    Resized { capacity: usize },
    TombstonesCleared,
    NoRehashNeeded,
}

impl Message {
    /// Frame kind this message is shown with
    pub fn kind(self) -> FrameKind {
        match self {
            Message::Searching => FrameKind::Searching,
            Message::NotFound => FrameKind::NotFound,
            _ => FrameKind::Found,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Searching => f.write_str("Searching..."),
            Message::Found => f.write_str("Found!"),
            Message::NotFound => f.write_str("Not Found!"),
            Message::AlreadyPresent => f.write_str("Key already in table, don't add!"),
            Message::Adding => f.write_str("Found! Adding item..."),
            Message::Deleting => f.write_str("Found! Deleting Item..."),
            Message::Resized { capacity } => {
                write!(f, "Rehashing... Resizing to length {}", capacity)
            }
            Message::TombstonesCleared => {
                f.write_str("Rehashing... No resizing needed! Only tombstone entries cleared!")
            }
            Message::NoRehashNeeded => f.write_str("Checking for Rehashing... No rehashing needed!"),
        }
    }
}

/// One step of an operation's trace
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Frame {
    pub kind: FrameKind,
    pub index: usize,
    pub message: Message,
}

impl Frame {
    /// Frame whose kind follows from its message
    pub fn new(index: usize, message: Message) -> Self {
        Frame {
            kind: message.kind(),
            index,
            message,
        }
    }

    pub fn searching(index: usize) -> Self {
        Self::new(index, Message::Searching)
    }

    pub fn is_terminal(&self) -> bool {
        self.kind != FrameKind::Searching
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}: {}", self.kind, self.index, self.message)
    }
}

/// Receiver for frames as an operation produces them
pub trait FrameSink {
    fn record(&mut self, frame: Frame);
}

/// Sink that keeps every frame, in order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Trace {
    frames: Vec<Frame>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

impl FrameSink for Trace {
    fn record(&mut self, frame: Frame) {
        self.frames.push(frame);
    }
}

impl From<Trace> for Vec<Frame> {
    fn from(trace: Trace) -> Self {
        trace.frames
    }
}

/// Sink that drops everything
#[derive(Clone, Copy, Debug, Default)]
pub struct Discard;

impl FrameSink for Discard {
    fn record(&mut self, _frame: Frame) {}
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    fn record(&mut self, frame: Frame) {
        (**self).record(frame);
    }
}
