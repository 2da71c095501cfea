//! Replays: the frames of one action plus the draft it produced

use probeset_core::{Fingerprint, Frame, FrameKind, HashTable, ProbeStrategy};
use std::fmt;

/// Operation a caller can perform on a session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Insert,
    Search,
    Delete,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Insert, Action::Search, Action::Delete];

    /// Stable numeric tag
    pub fn tag(self) -> u32 {
        match self {
            Action::Insert => 0,
            Action::Search => 1,
            Action::Delete => 2,
        }
    }

    pub fn from_tag(tag: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.tag() == tag)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Insert => "insert",
            Action::Search => "search",
            Action::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Frames of one action, ready to play back, and the draft to commit after
#[derive(Clone, Debug)]
pub struct Replay {
    pub(crate) action: Action,
    pub(crate) key: i64,
    pub(crate) strategy: ProbeStrategy,
    pub(crate) frames: Vec<Frame>,
    pub(crate) draft: HashTable,

    /// Fingerprint of the committed table the draft was copied from
    pub(crate) base: Fingerprint,
}

impl Replay {
    pub fn action(&self) -> Action {
        self.action
    }

    pub fn key(&self) -> i64 {
        self.key
    }

    pub fn strategy(&self) -> ProbeStrategy {
        self.strategy
    }

    /// Frames in display order
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn final_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// True if the action ended on a `Found` frame
    pub fn is_found(&self) -> bool {
        self.final_frame()
            .map_or(false, |frame| frame.kind == FrameKind::Found)
    }

    /// True if committing would change the table
    pub fn changes_table(&self) -> bool {
        self.draft.fingerprint() != self.base
    }

    pub fn draft(&self) -> &HashTable {
        &self.draft
    }

    pub fn into_draft(self) -> HashTable {
        self.draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_tags() {
        for action in Action::ALL {
            assert_eq!(Action::from_tag(action.tag()), Some(action));
        }
        assert_eq!(Action::from_tag(3), None);
        assert_eq!(Action::Delete.to_string(), "delete");
    }

    #[test]
    fn test_replay_accessors() {
        let table = HashTable::new();
        let base = table.fingerprint();
        let mut draft = table.deep_copy();
        let frames = draft.insert(10, ProbeStrategy::Linear).unwrap();

        let replay = Replay {
            action: Action::Insert,
            key: 10,
            strategy: ProbeStrategy::Linear,
            frames,
            draft,
            base,
        };

        assert!(replay.is_found());
        assert!(replay.changes_table());
        assert_eq!(replay.frames().len(), 3);
        assert_eq!(replay.into_draft().len(), 1);
    }
}
