//! Adapter utilities for the `scrollpin` crate.
//!
//! The `scrollpin` crate owns the scroll-linked timeline engine. This crate provides small,
//! framework-neutral pieces adapters commonly need next to it:
//!
//! - Pointer micro-interactions (tilt toward the pointer, magnetic pull) driven by tweens
//! - Ticker-driven time tweens with delay, repeat and yoyo (background floats, intro reveals)
//! - A non-blocking slot for an externally fetched statistic, with a counter keyframe
//! - The portfolio scene preset (`scene::portfolio`)
//!
//! Nothing here holds UI objects: elements are measured through [`scrollpin::Measure`] and
//! controllers return the values to render.
#![forbid(unsafe_code)]

extern crate alloc;

#[macro_use]
mod macros;

mod ambient;
mod magnetic;
mod pointer;
pub mod scene;
mod stat;
mod tilt;


pub use ambient::{AmbientHandle, FloatOptions, LoopTween, Repeat, TweenGroup, float_group};
pub use magnetic::{MagneticController, MagneticOptions, attach_magnetic};
pub use pointer::{PointerInteractionState, center_offset};
pub use stat::{StatSlot, StatStatus, counter_keyframe};
pub use tilt::{TiltController, TiltOptions, TiltTransform, attach_tilt, tilt_angles};
