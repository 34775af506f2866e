//! Scalar values and six-box status tracks.

/// Number of boxes on a status track.
pub const TRACK_LEVELS: usize = 6;

/// The numeric payload of a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    /// A value set directly on the tag.
    Scalar(i32),
    /// A status track whose highest filled box is the value.
    Tracked(StatusTrack),
}

impl TagValue {
    /// The value this payload contributes.
    pub fn resolved(&self) -> i32 {
        match self {
            Self::Scalar(v) => *v,
            Self::Tracked(track) => track.highest().unwrap_or(0),
        }
    }
}

impl std::fmt::Display for TagValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.resolved())
    }
}

/// A status track: one optional entry per level, lowest first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusTrack {
    slots: Vec<Option<i32>>,
}

impl StatusTrack {
    /// Build a track from raw slots, lowest level first.
    pub fn new(slots: Vec<Option<i32>>) -> Self {
        Self { slots }
    }

    /// An empty six-box track.
    pub fn empty() -> Self {
        Self {
            slots: vec![None; TRACK_LEVELS],
        }
    }

    /// A six-box track with only the box for `level` filled.
    pub fn at_level(level: usize) -> Self {
        let mut track = Self::empty();
        track.mark(level);
        track
    }

    /// Fill the box for `level` (1-based). Out-of-range levels are ignored.
    pub fn mark(&mut self, level: usize) {
        if (1..=self.slots.len()).contains(&level) {
            self.slots[level - 1] = Some(level as i32);
        }
    }

    /// Clear the box for `level` (1-based).
    pub fn clear(&mut self, level: usize) {
        if let Some(slot) = level.checked_sub(1).and_then(|i| self.slots.get_mut(i)) {
            *slot = None;
        }
    }

    /// The entry of the highest filled box, scanning from the top.
    pub fn highest(&self) -> Option<i32> {
        self.slots.iter().rev().find_map(|s| *s)
    }

    /// Returns true if no box is filled.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// The raw slots, lowest level first.
    pub fn slots(&self) -> &[Option<i32>] {
        &self.slots
    }
}
