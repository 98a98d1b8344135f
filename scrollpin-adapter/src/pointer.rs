use alloc::boxed::Box;

use scrollpin::{Bounds, Easing, Measure, Tween};

/// What a pointer controller knows about the element it is attached to.
///
/// `bounds` and `last_pointer_offset` are refreshed on every move; both are cleared on leave.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointerInteractionState {
    pub bounds: Option<Bounds>,
    /// Pointer position relative to the element center.
    pub last_pointer_offset: Option<(f32, f32)>,
    /// The value the element settles back to on leave.
    pub rest: (f32, f32),
    pub active: bool,
}

/// Pointer offset from the element's center.
pub fn center_offset(bounds: &Bounds, x: f32, y: f32) -> (f32, f32) {
    let (cx, cy) = bounds.center();
    (x - cx, y - cy)
}

/// Shared follow/return machinery: a 2D value that tweens toward a pointer-derived target while
/// hovered and back to `rest` on leave.
pub(crate) struct PointerFollow {
    target: Box<dyn Measure>,
    state: PointerInteractionState,
    current: (f32, f32),
    tween: Option<Tween<(f32, f32)>>,
    detached: bool,
}

impl core::fmt::Debug for PointerFollow {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PointerFollow")
            .field("state", &self.state)
            .field("current", &self.current)
            .field("tween", &self.tween)
            .field("detached", &self.detached)
            .finish_non_exhaustive()
    }
}

impl PointerFollow {
    pub(crate) fn new(target: impl Measure + 'static, rest: (f32, f32)) -> Self {
        Self {
            target: Box::new(target),
            state: PointerInteractionState {
                rest,
                ..PointerInteractionState::default()
            },
            current: rest,
            tween: None,
            detached: false,
        }
    }

    pub(crate) fn state(&self) -> &PointerInteractionState {
        &self.state
    }

    pub(crate) fn is_detached(&self) -> bool {
        self.detached
    }

    pub(crate) fn is_animating(&self, now_ms: u64) -> bool {
        self.tween.is_some_and(|tw| !tw.is_done(now_ms))
    }

    /// Measures the target and starts a tween toward `map(offset)`.
    ///
    /// Returns the new target value, or `None` if detached or the element isn't mounted.
    pub(crate) fn on_move(
        &mut self,
        x: f32,
        y: f32,
        now_ms: u64,
        duration_ms: u64,
        easing: Easing,
        map: impl FnOnce((f32, f32)) -> (f32, f32),
    ) -> Option<(f32, f32)> {
        if self.detached {
            return None;
        }
        let Some(bounds) = self.target.bounds() else {
            atrace!("pointer move ignored: target not mounted");
            return None;
        };

        let offset = center_offset(&bounds, x, y);
        self.state.bounds = Some(bounds);
        self.state.last_pointer_offset = Some(offset);
        self.state.active = true;

        let to = map(offset);
        self.start(now_ms, to, duration_ms, easing);
        Some(to)
    }

    /// Tweens back to rest. A no-op when detached or already at rest.
    pub(crate) fn on_leave(&mut self, now_ms: u64, duration_ms: u64, easing: Easing) {
        if self.detached {
            return;
        }
        self.state.active = false;
        self.state.bounds = None;
        self.state.last_pointer_offset = None;

        let rest = self.state.rest;
        if self.tween.is_none() && self.current == rest {
            return;
        }
        self.start(now_ms, rest, duration_ms, easing);
    }

    /// The value to render at `now_ms`. Finished tweens are dropped.
    pub(crate) fn sample(&mut self, now_ms: u64) -> (f32, f32) {
        if let Some(tw) = self.tween {
            self.current = tw.sample(now_ms);
            if tw.is_done(now_ms) {
                self.tween = None;
            }
        }
        self.current
    }

    pub(crate) fn detach(&mut self) {
        if self.detached {
            return;
        }
        adebug!("pointer controller detached");
        self.detached = true;
        self.tween = None;
        self.current = self.state.rest;
        self.state = PointerInteractionState {
            rest: self.state.rest,
            ..PointerInteractionState::default()
        };
    }

    fn start(&mut self, now_ms: u64, to: (f32, f32), duration_ms: u64, easing: Easing) {
        let from = self.sample(now_ms);
        self.tween = Some(Tween::new(from, to, now_ms, duration_ms, easing));
    }
}
