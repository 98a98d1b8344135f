//! A headless scroll-linked phase animation engine.
//!
//! For adapter-level utilities (pointer micro-interactions, counters, scene presets), see the
//! `scrollpin-adapter` crate.
//!
//! The engine turns noisy scroll input into a deterministic sequence of visual states:
//! - an inertial filter smooths wheel/touch deltas into a virtual offset;
//! - a pin controller freezes the trigger while scroll drives timeline progress;
//! - a scheduler maps (scrubbed) progress to property values across ordered phases;
//! - breakpoint variants swap configurations while preserving progress.
//!
//! It is UI-agnostic. A host rendering layer is expected to provide:
//! - a frame clock (`EngineContext::tick`)
//! - viewport geometry and scroll input
//! - a way to measure the pinned trigger element
//!
//! and to apply the delivered property maps to its render targets.
#![forbid(unsafe_code)]

extern crate alloc;

#[macro_use]
mod macros;

mod context;
mod easing;
mod emitter;
mod engine;
mod error;
mod inertial;
mod options;
mod phase;
mod pin;
mod state;
mod timeline;
mod tween;
mod types;
mod value;
mod variant;

#[cfg(test)]
mod tests;

pub use context::{EngineContext, Frame, LagSmoothing};
pub use easing::{Easing, ParseEasingError};
pub use emitter::{Registry, SubscriptionId};
pub use engine::{FrameOutput, TimelineHandle, build_timeline};
pub use error::ConfigError;
pub use inertial::{InertialOptions, InertialScroll, InputMode};
pub use options::ScrollTimelineOptions;
pub use phase::{
    Keyframe, KeyframeValue, Phase, PhaseId, TimeAnchor, TimelineSpec, ValueFn, parse_label,
};
pub use pin::{PinController, PinSide, PinState};
pub use state::{PinFrame, ScrollState};
pub use timeline::{PhaseSpan, PropertyMap, Scrub, Timeline};
pub use tween::Tween;
pub use types::{Bounds, Measure, PropertyKey, ScrollDirection, ScrollInput, Viewport};
pub use value::{Lerp, Rgba, Value};
pub use variant::{
    BreakpointChange, BreakpointListener, BreakpointResolver, BreakpointVariant, VariantOverride,
    WidthRange, register_breakpoint_listener, validate_predicates,
};
