use alloc::vec::Vec;

use crate::{BreakpointVariant, InertialOptions, TimelineSpec, Viewport};

/// Configuration for [`crate::TimelineHandle`].
///
/// `spec` is the base configuration; each breakpoint variant applies its overrides on top of it.
/// With no variants, a single catch-all variant using `total_distance` is assumed.
#[derive(Clone, Debug)]
pub struct ScrollTimelineOptions {
    pub spec: TimelineSpec,
    /// Pin length in pixels: how much native scroll drives progress from 0 to 1.
    pub total_distance: f32,
    pub variants: Vec<BreakpointVariant>,
    /// Scrub lag factor; `1.0` or less tracks pin progress exactly.
    pub scrub: f32,
    pub inertial: InertialOptions,
    /// Viewport used before the host reports one (aka an initial rect).
    pub initial_viewport: Option<Viewport>,
    /// Native scroll offset at mount.
    pub initial_offset: f32,
}

impl ScrollTimelineOptions {
    pub fn new(spec: TimelineSpec, total_distance: f32) -> Self {
        Self {
            spec,
            total_distance,
            variants: Vec::new(),
            scrub: 1.0,
            inertial: InertialOptions::default(),
            initial_viewport: None,
            initial_offset: 0.0,
        }
    }

    pub fn with_variants(mut self, variants: impl IntoIterator<Item = BreakpointVariant>) -> Self {
        self.variants = variants.into_iter().collect();
        self
    }

    pub fn with_variant(mut self, variant: BreakpointVariant) -> Self {
        self.variants.push(variant);
        self
    }

    pub fn with_scrub(mut self, scrub: f32) -> Self {
        self.scrub = scrub;
        self
    }

    pub fn with_inertial(mut self, inertial: InertialOptions) -> Self {
        self.inertial = inertial;
        self
    }

    pub fn with_initial_viewport(mut self, viewport: Option<Viewport>) -> Self {
        self.initial_viewport = viewport;
        self
    }

    pub fn with_initial_offset(mut self, offset: f32) -> Self {
        self.initial_offset = offset;
        self
    }
}
