use crate::{PinFrame, ScrollDirection};

/// Which side of the pinned range an unpinned trigger is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PinSide {
    Before,
    Past,
}

/// Pin lifecycle: `Unpinned(Before) → Entering → Pinned → Exiting → Unpinned(Past)`, and the
/// mirror path when scrolling backward.
///
/// `Entering` and `Exiting` last exactly one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PinState {
    Unpinned(PinSide),
    Entering(ScrollDirection),
    Pinned,
    Exiting(ScrollDirection),
}

impl Default for PinState {
    fn default() -> Self {
        Self::Unpinned(PinSide::Before)
    }
}

impl PinState {
    pub fn is_pinned(&self) -> bool {
        matches!(self, Self::Entering(_) | Self::Pinned)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Region {
    Before,
    Within,
    Past,
}

/// Freezes the trigger in the viewport while scroll inside `[entry, entry + distance)` drives
/// timeline progress instead of the page.
///
/// The document is expected to reserve `distance` pixels of blank scroll height ("pin spacing")
/// so the scrollbar stays proportional; [`PinController::document_length`] accounts for it.
#[derive(Clone, Debug)]
pub struct PinController {
    entry: f32,
    distance: f32,
    state: PinState,
    last_offset: f32,
}

impl PinController {
    pub fn new(entry: f32, distance: f32) -> Self {
        Self {
            entry,
            distance,
            state: PinState::default(),
            last_offset: 0.0,
        }
    }

    pub fn state(&self) -> PinState {
        self.state
    }

    pub fn entry(&self) -> f32 {
        self.entry
    }

    pub fn exit(&self) -> f32 {
        self.entry + self.distance.max(0.0)
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Blank scroll height reserved while the trigger is pinned.
    pub fn spacing(&self) -> f32 {
        self.distance.max(0.0)
    }

    pub fn document_length(&self, content_height: f32) -> f32 {
        content_height + self.spacing()
    }

    /// Recomputes the thresholds after a resize or rebuild.
    ///
    /// The current state is kept; the next `update` reconciles it with the new geometry.
    pub fn set_geometry(&mut self, entry: f32, distance: f32) {
        pdebug!(entry, distance, "PinController::set_geometry");
        self.entry = entry;
        self.distance = distance;
    }

    /// Pin-relative progress for a native scroll offset, clamped to `[0, 1]`.
    pub fn progress_at(&self, offset: f32) -> f32 {
        if self.distance <= 0.0 {
            return if offset >= self.entry { 1.0 } else { 0.0 };
        }
        ((offset - self.entry) / self.distance).clamp(0.0, 1.0)
    }

    /// The native scroll offset that corresponds to `progress` while pinned.
    pub fn offset_for_progress(&self, progress: f32) -> f32 {
        self.entry + progress.clamp(0.0, 1.0) * self.spacing()
    }

    /// Where the page scroll resumes when the pin releases in `direction`.
    pub fn resume_offset(&self, direction: ScrollDirection) -> f32 {
        match direction {
            ScrollDirection::Forward => self.exit(),
            ScrollDirection::Backward => self.entry,
        }
    }

    fn region(&self, offset: f32) -> Region {
        if offset < self.entry {
            Region::Before
        } else if offset < self.exit() {
            Region::Within
        } else {
            Region::Past
        }
    }

    /// Advances the state machine with this tick's smoothed offset.
    pub fn update(&mut self, offset: f32) -> PinFrame {
        use ScrollDirection::{Backward, Forward};

        let region = self.region(offset);
        let next = match (self.state, region) {
            (PinState::Unpinned(PinSide::Before), Region::Before) => {
                PinState::Unpinned(PinSide::Before)
            }
            (PinState::Unpinned(PinSide::Before), Region::Within) => PinState::Entering(Forward),
            (PinState::Unpinned(PinSide::Before), Region::Past) => PinState::Exiting(Forward),
            (PinState::Unpinned(PinSide::Past), Region::Past) => PinState::Unpinned(PinSide::Past),
            (PinState::Unpinned(PinSide::Past), Region::Within) => PinState::Entering(Backward),
            (PinState::Unpinned(PinSide::Past), Region::Before) => PinState::Exiting(Backward),
            (PinState::Entering(_) | PinState::Pinned, Region::Within) => PinState::Pinned,
            (PinState::Entering(_) | PinState::Pinned, Region::Past) => PinState::Exiting(Forward),
            (PinState::Entering(_) | PinState::Pinned, Region::Before) => {
                PinState::Exiting(Backward)
            }
            (PinState::Exiting(_), Region::Before) => PinState::Unpinned(PinSide::Before),
            (PinState::Exiting(_), Region::Past) => PinState::Unpinned(PinSide::Past),
            (PinState::Exiting(Forward), Region::Within) => PinState::Entering(Backward),
            (PinState::Exiting(Backward), Region::Within) => PinState::Entering(Forward),
        };

        if next != self.state {
            ptrace!(from = ?self.state, to = ?next, offset, "PinController::update");
        }
        self.state = next;
        self.last_offset = offset;

        PinFrame {
            state: next,
            raw_progress: self.progress_at(offset),
            pin_offset: (offset - self.entry).clamp(0.0, self.spacing()),
        }
    }

    /// Drops any active pin, settling on the side the last offset lies on.
    pub fn release(&mut self) {
        let side = if self.last_offset <= self.entry {
            PinSide::Before
        } else {
            PinSide::Past
        };
        pdebug!(?side, "PinController::release");
        self.state = PinState::Unpinned(side);
    }
}
