use scrollpin::{Easing, Measure};

use crate::PointerInteractionState;
use crate::pointer::PointerFollow;

/// Configuration for [`TiltController`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TiltOptions {
    /// Pixels of pointer offset per degree of rotation.
    pub divisor: f32,
    pub follow_duration_ms: u64,
    pub follow_easing: Easing,
    pub return_duration_ms: u64,
    pub return_easing: Easing,
    /// CSS `perspective` the host should apply alongside the rotation.
    pub perspective: f32,
}

impl Default for TiltOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl TiltOptions {
    pub fn new() -> Self {
        Self {
            divisor: 20.0,
            follow_duration_ms: 500,
            follow_easing: Easing::STANDARD_OUT,
            return_duration_ms: 500,
            return_easing: Easing::STANDARD_OUT,
            perspective: 1000.0,
        }
    }

    pub fn with_divisor(mut self, divisor: f32) -> Self {
        self.divisor = divisor;
        self
    }

    pub fn with_follow(mut self, duration_ms: u64, easing: Easing) -> Self {
        self.follow_duration_ms = duration_ms;
        self.follow_easing = easing;
        self
    }

    pub fn with_return(mut self, duration_ms: u64, easing: Easing) -> Self {
        self.return_duration_ms = duration_ms;
        self.return_easing = easing;
        self
    }

    pub fn with_perspective(mut self, perspective: f32) -> Self {
        self.perspective = perspective;
        self
    }

    fn divisor(&self) -> f32 {
        if self.divisor.is_finite() && self.divisor != 0.0 {
            self.divisor
        } else {
            1.0
        }
    }
}

/// A 3D tilt in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TiltTransform {
    pub rotate_x: f32,
    pub rotate_y: f32,
    pub perspective: f32,
}

/// Rotation for a pointer offset from the element center: `(dx / divisor, -dy / divisor)` as
/// `(rotate_y, rotate_x)`.
pub fn tilt_angles(offset: (f32, f32), divisor: f32) -> (f32, f32) {
    (offset.0 / divisor, -offset.1 / divisor)
}

/// Tilts an element toward the pointer while hovered.
///
/// Adapters forward pointer events and call [`TiltController::sample`] each frame to get the
/// transform to render.
#[derive(Debug)]
pub struct TiltController {
    follow: PointerFollow,
    options: TiltOptions,
}

/// Attaches a tilt interaction to `target`. Bounds are read lazily on each move.
pub fn attach_tilt(target: impl Measure + 'static, options: TiltOptions) -> TiltController {
    TiltController {
        follow: PointerFollow::new(target, (0.0, 0.0)),
        options,
    }
}

impl TiltController {
    pub fn options(&self) -> &TiltOptions {
        &self.options
    }

    pub fn state(&self) -> &PointerInteractionState {
        self.follow.state()
    }

    /// Starts easing toward the tilt for this pointer position and returns it.
    ///
    /// Returns `None` (and changes nothing) if the target isn't mounted or the controller was
    /// detached.
    pub fn on_pointer_move(&mut self, x: f32, y: f32, now_ms: u64) -> Option<TiltTransform> {
        let divisor = self.options.divisor();
        let (rotate_y, rotate_x) = self.follow.on_move(
            x,
            y,
            now_ms,
            self.options.follow_duration_ms,
            self.options.follow_easing,
            |offset| tilt_angles(offset, divisor),
        )?;
        Some(self.transform(rotate_y, rotate_x))
    }

    /// Starts easing back to neutral.
    pub fn on_pointer_leave(&mut self, now_ms: u64) {
        self.follow.on_leave(
            now_ms,
            self.options.return_duration_ms,
            self.options.return_easing,
        );
    }

    pub fn sample(&mut self, now_ms: u64) -> TiltTransform {
        let (rotate_y, rotate_x) = self.follow.sample(now_ms);
        self.transform(rotate_y, rotate_x)
    }

    pub fn is_animating(&self, now_ms: u64) -> bool {
        self.follow.is_animating(now_ms)
    }

    pub fn is_detached(&self) -> bool {
        self.follow.is_detached()
    }

    /// Discards all state; later events are ignored.
    pub fn detach(&mut self) {
        self.follow.detach();
    }

    fn transform(&self, rotate_y: f32, rotate_x: f32) -> TiltTransform {
        TiltTransform {
            rotate_x,
            rotate_y,
            perspective: self.options.perspective,
        }
    }
}
