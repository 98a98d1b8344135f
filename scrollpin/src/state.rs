use crate::{PinState, ScrollDirection};

/// A lightweight, serializable snapshot of the scroll pipeline.
///
/// The engine keeps one of these across timeline rebuilds; only the pin thresholds are
/// recomputed when the layout changes.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollState {
    /// Last offset reported by the host (or accumulated from deltas).
    pub raw_offset: f32,
    /// Output of the inertial filter.
    pub smoothed_offset: f32,
    /// Last per-tick step of the inertial filter, after clamping.
    pub velocity: f32,
    pub pinned: bool,
    pub pin_entry: f32,
    pub pin_exit: f32,
}

impl ScrollState {
    pub fn direction(&self) -> Option<ScrollDirection> {
        if self.velocity > 0.0 {
            Some(ScrollDirection::Forward)
        } else if self.velocity < 0.0 {
            Some(ScrollDirection::Backward)
        } else {
            None
        }
    }
}

/// The per-tick pin snapshot delivered with every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PinFrame {
    pub state: PinState,
    /// Pin-relative progress before scrub smoothing.
    pub raw_progress: f32,
    /// How far the pinned trigger must be translated to stay fixed in the viewport.
    pub pin_offset: f32,
}
