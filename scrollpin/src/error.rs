//! Build-time configuration errors.
//!
//! Runtime conditions (an unmeasurable element, a statistic that never arrives) are not errors:
//! they are absorbed and logged so the frame loop keeps running.

use alloc::string::String;

use thiserror::Error;

use crate::PropertyKey;

/// A timeline, pin or breakpoint configuration that cannot be ticked.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("timeline has no phases")]
    NoPhases,

    /// Phase weights must be finite and strictly positive.
    #[error("phase `{phase}` has invalid weight {weight}")]
    InvalidWeight { phase: String, weight: f32 },

    /// Keyframe offsets must be finite, non-negative and not past the end of their phase.
    #[error("keyframe offset {offset} is outside phase `{phase}`")]
    InvalidOffset { phase: String, offset: f32 },

    #[error("keyframe in phase `{phase}` has invalid duration {duration}")]
    InvalidDuration { phase: String, duration: f32 },

    #[error("total distance must be finite and positive, got {0}")]
    InvalidDistance(f32),

    #[error("no phase named `{0}`")]
    UnknownPhase(String),

    #[error("malformed time label `{0}`")]
    MalformedLabel(String),

    /// A `To` or `From` keyframe has no baseline to interpolate against.
    #[error("property {0} is animated before it has a value")]
    MissingInitialValue(PropertyKey),

    #[error("no breakpoint variants")]
    NoVariants,

    #[error("breakpoints {first} and {second} overlap")]
    OverlappingBreakpoints { first: usize, second: usize },

    /// Some viewport widths match no predicate.
    #[error("no breakpoint covers widths from {from}")]
    BreakpointGap { from: u32 },

    #[error("breakpoint {0} matches no width")]
    EmptyBreakpoint(usize),

    /// A variant override names a keyframe that the timeline doesn't declare.
    #[error("no keyframe named `{0}`")]
    UnknownKeyframe(String),
}
