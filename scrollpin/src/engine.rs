use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::timeline::clamp_progress;
use crate::{
    BreakpointResolver, BreakpointVariant, ConfigError, EngineContext, Frame, InertialScroll,
    Measure, PinController, PinFrame, PinState, PropertyMap, Registry, Scrub, ScrollInput,
    ScrollState, ScrollTimelineOptions, SubscriptionId, Timeline, TimelineSpec, Viewport,
    WidthRange,
};

/// Everything the render layer needs for one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameOutput {
    pub frame: Frame,
    pub scroll: ScrollState,
    pub pin: PinFrame,
    /// Rendered (scrubbed) timeline progress.
    pub progress: f32,
    pub variant: usize,
    pub properties: PropertyMap,
    /// Set once after a breakpoint switch: the host should move its native scroll here.
    pub scroll_restore: Option<f32>,
}

#[derive(Clone, Debug)]
struct CompiledVariant {
    name: String,
    distance: f32,
    timeline: Timeline,
}

struct EngineState {
    variants: Vec<CompiledVariant>,
    resolver: BreakpointResolver,
    active: usize,
    timeline: Option<Timeline>,
    pin_target: Rc<dyn Measure>,
    inertial: InertialScroll,
    pin: PinController,
    scrub: Scrub,
    last_pin: PinFrame,
    viewport: Option<Viewport>,
    applied: PropertyMap,
    scroll_restore: Option<f32>,
}

impl EngineState {
    fn distance(&self) -> f32 {
        self.variants[self.active].distance
    }

    fn scroll_state(&self) -> ScrollState {
        ScrollState {
            raw_offset: self.inertial.raw_offset(),
            smoothed_offset: self.inertial.smoothed_offset(),
            velocity: self.inertial.velocity(),
            pinned: self.pin.state().is_pinned(),
            pin_entry: self.pin.entry(),
            pin_exit: self.pin.exit(),
        }
    }

    /// Re-reads the trigger position and recomputes the pin thresholds and scroll limit.
    fn remeasure(&mut self) {
        let entry = match self.pin_target.bounds() {
            Some(bounds) => bounds.top,
            None => {
                pwarn!("pin target is not mounted; keeping previous pin thresholds");
                self.pin.entry()
            }
        };
        self.pin.set_geometry(entry, self.distance());
        if let Some(vp) = self.viewport {
            let limit = self.pin.document_length(vp.content_height) - vp.height as f32;
            self.inertial.set_limit(limit);
        }
    }

    fn on_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
        match self.resolver.update(viewport.width) {
            Some(change) if change.current != self.active => self.switch_variant(change.current),
            _ => self.remeasure(),
        }
    }

    /// Tears down the active timeline and installs variant `next`, resuming at the same progress
    /// fraction.
    fn switch_variant(&mut self, next: usize) {
        let rendered = self.scrub.value();
        // Region and progress both come from the smoothed offset the pin last saw, so a flick
        // still in flight can't put them on different sides of a threshold.
        let offset = self.inertial.smoothed_offset();
        let raw = self.pin.progress_at(offset);
        let old_entry = self.pin.entry();
        let old_exit = self.pin.exit();

        self.pin.release();
        self.timeline = None;

        pdebug!(
            from = self.variants[self.active].name.as_str(),
            to = self.variants[next].name.as_str(),
            progress = rendered,
            "switching breakpoint variant"
        );
        self.active = next;
        self.timeline = Some(self.variants[next].timeline.clone());
        self.remeasure();

        let restore = if offset < old_entry {
            offset
        } else if offset >= old_exit {
            self.pin.exit() + (offset - old_exit)
        } else {
            self.pin.offset_for_progress(raw)
        };
        self.inertial.jump_to(restore);
        self.scroll_restore = Some(self.inertial.raw_offset());
        self.scrub.reset(rendered);

        if let Some(timeline) = &self.timeline {
            timeline.evaluate_into(rendered, &mut self.applied);
        }
    }

    /// One tick, in fixed order: inertial filter, pin state, scrub, evaluation.
    fn frame(&mut self, frame: &Frame) -> Option<FrameOutput> {
        let timeline = self.timeline.as_ref()?;

        let smoothed = self.inertial.update();
        let pin = self.pin.update(smoothed);
        #[cfg(feature = "tracing")]
        if let PinState::Exiting(direction) = pin.state {
            pdebug!(
                ?direction,
                resume = self.pin.resume_offset(direction),
                "pin released"
            );
        }
        let progress = self.scrub.update(pin.raw_progress);
        timeline.evaluate_into(progress, &mut self.applied);
        self.last_pin = pin;

        ptrace!(
            index = frame.index,
            smoothed,
            raw_progress = pin.raw_progress,
            progress,
            "frame"
        );
        Some(FrameOutput {
            frame: *frame,
            scroll: self.scroll_state(),
            pin,
            progress,
            variant: self.active,
            properties: self.applied.clone(),
            scroll_restore: self.scroll_restore.take(),
        })
    }
}

/// A running scroll-linked timeline bound to an [`EngineContext`].
///
/// The handle owns the engine state. It subscribes to the context's ticker, viewport and scroll
/// registries on build and unsubscribes from all of them in [`TimelineHandle::destroy`] (also run
/// on drop). No callback fires after teardown.
pub struct TimelineHandle {
    ctx: EngineContext,
    state: Rc<RefCell<EngineState>>,
    frames: Registry<FrameOutput>,
    scrolls: Registry<ScrollState>,
    ticker_id: Option<SubscriptionId>,
    viewport_id: Option<SubscriptionId>,
    scroll_id: Option<SubscriptionId>,
}

impl core::fmt::Debug for TimelineHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TimelineHandle")
            .field("destroyed", &self.is_destroyed())
            .field("variant", &self.active_variant())
            .field("progress", &self.progress())
            .finish_non_exhaustive()
    }
}

impl TimelineHandle {
    /// Validates every variant, builds the active timeline and starts listening on `ctx`.
    ///
    /// `pin_target` reports the trigger element; its `top` is read as the trigger's document
    /// offset (layout position with any pin transform removed).
    pub fn build(
        ctx: &EngineContext,
        options: ScrollTimelineOptions,
        pin_target: impl Measure + 'static,
    ) -> Result<Self, ConfigError> {
        let ScrollTimelineOptions {
            spec,
            total_distance,
            variants,
            scrub,
            inertial,
            initial_viewport,
            initial_offset,
        } = options;

        let variants = if variants.is_empty() {
            alloc::vec![BreakpointVariant::new("default", WidthRange::ANY)]
        } else {
            variants
        };
        let resolver =
            BreakpointResolver::new(variants.iter().map(|v| v.predicate).collect())?;
        let compiled = compile_variants(&spec, total_distance, &variants)?;

        let pin_target: Rc<dyn Measure> = Rc::new(pin_target);
        let entry = pin_target.bounds().map_or(0.0, |b| b.top);
        let mut state = EngineState {
            pin: PinController::new(entry, compiled[0].distance),
            variants: compiled,
            resolver,
            active: 0,
            timeline: None,
            pin_target,
            inertial: InertialScroll::new(inertial),
            scrub: Scrub::new(scrub),
            last_pin: PinFrame {
                state: PinState::default(),
                raw_progress: 0.0,
                pin_offset: 0.0,
            },
            viewport: None,
            applied: PropertyMap::new(),
            scroll_restore: None,
        };

        let width = initial_viewport.map_or(0, |vp| vp.width);
        state.viewport = initial_viewport;
        state.active = state
            .resolver
            .update(width)
            .map_or(0, |change| change.current);
        state.timeline = Some(state.variants[state.active].timeline.clone());
        state.remeasure();

        state.inertial.jump_to(initial_offset);
        let pin = state.pin.update(state.inertial.smoothed_offset());
        state.last_pin = pin;
        state.scrub.reset(pin.raw_progress);
        if let Some(timeline) = &state.timeline {
            timeline.evaluate_into(pin.raw_progress, &mut state.applied);
        }

        pdebug!(
            variant = state.variants[state.active].name.as_str(),
            distance = state.distance(),
            entry = state.pin.entry(),
            "TimelineHandle::build"
        );

        let state = Rc::new(RefCell::new(state));
        let frames = Registry::<FrameOutput>::new();
        let scrolls = Registry::<ScrollState>::new();

        let ticker_id = ctx.add_ticker({
            let weak: Weak<RefCell<EngineState>> = Rc::downgrade(&state);
            let frames = frames.clone();
            let scrolls = scrolls.clone();
            move |frame: &Frame| {
                let Some(state) = weak.upgrade() else {
                    return;
                };
                let output = state.borrow_mut().frame(frame);
                if let Some(output) = output {
                    scrolls.emit(&output.scroll);
                    frames.emit(&output);
                }
            }
        });
        let viewport_id = ctx.viewport_listeners().subscribe({
            let weak = Rc::downgrade(&state);
            move |viewport: &Viewport| {
                if let Some(state) = weak.upgrade() {
                    state.borrow_mut().on_viewport(*viewport);
                }
            }
        });
        let scroll_id = ctx.scroll_listeners().subscribe({
            let weak = Rc::downgrade(&state);
            move |input: &ScrollInput| {
                if let Some(state) = weak.upgrade() {
                    state.borrow_mut().inertial.apply(*input);
                }
            }
        });

        Ok(Self {
            ctx: ctx.clone(),
            state,
            frames,
            scrolls,
            ticker_id: Some(ticker_id),
            viewport_id: Some(viewport_id),
            scroll_id: Some(scroll_id),
        })
    }

    /// Subscribes to per-tick output. Fires after the timeline has been evaluated.
    pub fn on_frame(&self, f: impl FnMut(&FrameOutput) + 'static) -> SubscriptionId {
        self.frames.subscribe(f)
    }

    /// Subscribes to the smoothed scroll state, emitted once per tick before `on_frame`.
    pub fn on_scroll(&self, f: impl FnMut(&ScrollState) + 'static) -> SubscriptionId {
        self.scrolls.subscribe(f)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.frames.unsubscribe(id) || self.scrolls.unsubscribe(id)
    }

    /// Evaluates the active timeline at `progress` (clamped) and records the result as the
    /// last-applied values.
    ///
    /// After `destroy` this returns an empty map.
    pub fn on_tick(&self, progress: f32) -> PropertyMap {
        let mut state = self.state.borrow_mut();
        let state = &mut *state;
        let Some(timeline) = &state.timeline else {
            ptrace!("on_tick after destroy");
            return PropertyMap::new();
        };
        timeline.evaluate_into(clamp_progress(progress), &mut state.applied);
        state.applied.clone()
    }

    /// Pure evaluation of the active timeline; doesn't touch the last-applied values.
    pub fn evaluate(&self, progress: f32) -> Option<PropertyMap> {
        self.state
            .borrow()
            .timeline
            .as_ref()
            .map(|t| t.evaluate(progress))
    }

    /// The last values delivered to the render layer.
    pub fn applied(&self) -> PropertyMap {
        self.state.borrow().applied.clone()
    }

    pub fn progress(&self) -> f32 {
        self.state.borrow().scrub.value()
    }

    pub fn scroll_state(&self) -> ScrollState {
        self.state.borrow().scroll_state()
    }

    pub fn pin_state(&self) -> PinState {
        self.state.borrow().pin.state()
    }

    /// The pin snapshot from the last frame.
    pub fn pin_frame(&self) -> PinFrame {
        self.state.borrow().last_pin
    }

    /// Blank scroll height the document must reserve for the pin.
    pub fn pin_spacing(&self) -> f32 {
        self.state.borrow().pin.spacing()
    }

    pub fn active_variant(&self) -> usize {
        self.state.borrow().active
    }

    pub fn variant_name(&self) -> String {
        let state = self.state.borrow();
        state.variants[state.active].name.clone()
    }

    pub fn timeline(&self) -> Option<Timeline> {
        self.state.borrow().timeline.clone()
    }

    /// Takes the pending scroll restore offset, if a breakpoint switch produced one that no frame
    /// has delivered yet.
    pub fn take_scroll_restore(&self) -> Option<f32> {
        self.state.borrow_mut().scroll_restore.take()
    }

    pub fn is_destroyed(&self) -> bool {
        self.ticker_id.is_none()
    }

    /// Unsubscribes from the context, releases the pin and drops the timeline. Idempotent.
    pub fn destroy(&mut self) {
        let Some(ticker_id) = self.ticker_id.take() else {
            return;
        };
        self.ctx.remove_ticker(ticker_id);
        if let Some(id) = self.viewport_id.take() {
            self.ctx.viewport_listeners().unsubscribe(id);
        }
        if let Some(id) = self.scroll_id.take() {
            self.ctx.scroll_listeners().unsubscribe(id);
        }
        self.frames.clear();
        self.scrolls.clear();

        let mut state = self.state.borrow_mut();
        state.pin.release();
        state.timeline = None;
        pdebug!("TimelineHandle::destroy");
    }
}

impl Drop for TimelineHandle {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn compile_variants(
    spec: &TimelineSpec,
    total_distance: f32,
    variants: &[BreakpointVariant],
) -> Result<Vec<CompiledVariant>, ConfigError> {
    variants
        .iter()
        .map(|variant| {
            let distance = variant.total_distance.unwrap_or(total_distance);
            if !distance.is_finite() || distance <= 0.0 {
                return Err(ConfigError::InvalidDistance(distance));
            }
            let timeline = Timeline::build(&variant.apply(spec)?)?;
            Ok(CompiledVariant {
                name: variant.name.clone(),
                distance,
                timeline,
            })
        })
        .collect()
}

/// Builds and starts a scroll-linked timeline.
///
/// Shorthand for [`TimelineHandle::build`] with default scrub and inertial settings.
pub fn build_timeline(
    ctx: &EngineContext,
    spec: TimelineSpec,
    total_distance: f32,
    pin_target: impl Measure + 'static,
    variants: Vec<BreakpointVariant>,
) -> Result<TimelineHandle, ConfigError> {
    TimelineHandle::build(
        ctx,
        ScrollTimelineOptions::new(spec, total_distance).with_variants(variants),
        pin_target,
    )
}
