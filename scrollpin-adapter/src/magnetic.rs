use scrollpin::{Easing, Measure};

use crate::PointerInteractionState;
use crate::pointer::PointerFollow;

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MagneticOptions {
    /// Fraction of the pointer offset the element travels, typically below 1.
    pub pull_factor: f32,
    pub follow_duration_ms: u64,
    pub follow_easing: Easing,
    pub return_duration_ms: u64,
    /// Usually an overshooting curve so the element springs back.
    pub return_easing: Easing,
}

impl Default for MagneticOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl MagneticOptions {
    pub fn new() -> Self {
        Self {
            pull_factor: 0.3,
            follow_duration_ms: 1000,
            follow_easing: Easing::PowerOut(3),
            return_duration_ms: 1000,
            return_easing: Easing::ElasticOut {
                amplitude: 1.0,
                period: 0.3,
            },
        }
    }

    pub fn with_pull_factor(mut self, pull_factor: f32) -> Self {
        self.pull_factor = pull_factor;
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
}

/// Pulls an element toward the pointer and springs it back to its origin on leave.
#[derive(Debug)]
pub struct MagneticController {
    follow: PointerFollow,
    options: MagneticOptions,
}

pub fn attach_magnetic(
    target: impl Measure + 'static,
    options: MagneticOptions,
) -> MagneticController {
    MagneticController {
        follow: PointerFollow::new(target, (0.0, 0.0)),
        options,
    }
}

impl MagneticController {
    pub fn options(&self) -> &MagneticOptions {
        &self.options
    }

    pub fn state(&self) -> &PointerInteractionState {
        self.follow.state()
    }

    /// Returns the translation the element is now easing toward.
    pub fn on_pointer_move(&mut self, x: f32, y: f32, now_ms: u64) -> Option<(f32, f32)> {
        let pull = self.options.pull_factor;
        self.follow.on_move(
            x,
            y,
            now_ms,
            self.options.follow_duration_ms,
            self.options.follow_easing,
            |(dx, dy)| (dx * pull, dy * pull),
        )
    }

    pub fn on_pointer_leave(&mut self, now_ms: u64) {
        self.follow.on_leave(
            now_ms,
            self.options.return_duration_ms,
            self.options.return_easing,
        );
    }

    /// The `(x, y)` translation to render at `now_ms`.
    pub fn sample(&mut self, now_ms: u64) -> (f32, f32) {
        self.follow.sample(now_ms)
    }

    pub fn is_animating(&self, now_ms: u64) -> bool {
        self.follow.is_animating(now_ms)
    }

    pub fn is_detached(&self) -> bool {
        self.follow.is_detached()
    }

    pub fn detach(&mut self) {
        self.follow.detach();
    }
}
