use alloc::rc::Rc;
use core::cell::Cell;

use crate::{Registry, ScrollInput, SubscriptionId, Viewport};

/// One display-refresh tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame {
    /// Sequence number, starting at 0.
    pub index: u64,
    /// The host timestamp passed to [`EngineContext::tick`].
    pub now_ms: u64,
    /// Time since the previous frame after lag smoothing.
    pub delta_ms: u64,
    /// Accumulated smoothed time since the first frame.
    pub time_ms: u64,
}

/// Caps the frame delta after a stall (e.g. a backgrounded tab) so time-based animations don't
/// leap forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LagSmoothing {
    pub threshold_ms: u64,
    pub adjusted_lag_ms: u64,
}

impl LagSmoothing {
    pub const DISABLED: Self = Self {
        threshold_ms: u64::MAX,
        adjusted_lag_ms: u64::MAX,
    };

    fn apply(&self, delta_ms: u64) -> u64 {
        if delta_ms > self.threshold_ms {
            self.adjusted_lag_ms
        } else {
            delta_ms
        }
    }
}

impl Default for LagSmoothing {
    fn default() -> Self {
        Self {
            threshold_ms: 1000,
            adjusted_lag_ms: 16,
        }
    }
}

#[derive(Debug, Default)]
struct Clock {
    lag: Cell<LagSmoothing>,
    last_ms: Cell<Option<u64>>,
    index: Cell<u64>,
    time_ms: Cell<u64>,
}

/// The engine context: a shared ticker plus the host-event registries every component subscribes
/// to.
///
/// The context is a cheap handle; clones share the same subscriber lists. Nothing in this crate
/// keeps ambient global state, so independent contexts never observe each other.
#[derive(Clone, Debug, Default)]
pub struct EngineContext {
    clock: Rc<Clock>,
    ticker: Registry<Frame>,
    viewport: Registry<Viewport>,
    scroll: Registry<ScrollInput>,
}

impl EngineContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lag_smoothing(self, lag: LagSmoothing) -> Self {
        self.clock.lag.set(lag);
        self
    }

    pub fn set_lag_smoothing(&self, lag: LagSmoothing) {
        self.clock.lag.set(lag);
    }

    pub fn ticker(&self) -> &Registry<Frame> {
        &self.ticker
    }

    pub fn viewport_listeners(&self) -> &Registry<Viewport> {
        &self.viewport
    }

    pub fn scroll_listeners(&self) -> &Registry<ScrollInput> {
        &self.scroll
    }

    pub fn add_ticker(&self, f: impl FnMut(&Frame) + 'static) -> SubscriptionId {
        self.ticker.subscribe(f)
    }

    pub fn remove_ticker(&self, id: SubscriptionId) -> bool {
        self.ticker.unsubscribe(id)
    }

    /// Advances the shared ticker. Call once per display refresh.
    pub fn tick(&self, now_ms: u64) -> Frame {
        let clock = &self.clock;
        let raw_delta = clock
            .last_ms
            .get()
            .map_or(0, |last| now_ms.saturating_sub(last));
        let delta_ms = clock.lag.get().apply(raw_delta);
        clock.last_ms.set(Some(now_ms));

        let frame = Frame {
            index: clock.index.get(),
            now_ms,
            delta_ms,
            time_ms: clock.time_ms.get().saturating_add(delta_ms),
        };
        clock.index.set(frame.index + 1);
        clock.time_ms.set(frame.time_ms);

        ptrace!(index = frame.index, now_ms, delta_ms, "tick");
        self.ticker.emit(&frame);
        frame
    }

    /// Reports viewport geometry (mount, resize, media-query change).
    pub fn resize(&self, viewport: Viewport) {
        pdebug!(width = viewport.width, height = viewport.height, "resize");
        self.viewport.emit(&viewport);
    }

    /// Forwards raw scroll input from the host.
    pub fn scroll(&self, input: ScrollInput) {
        self.scroll.emit(&input);
    }
}
