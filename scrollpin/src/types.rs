use alloc::string::String;
use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    Forward,
    Backward,
}

/// An element rectangle.
///
/// Pointer controllers expect viewport (client) coordinates, the same space as the pointer
/// position. A pin target reports its `top` as a document offset instead, with any pin
/// transform removed, so it compares directly against scroll offsets.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

/// Lazily measures an element owned by the host rendering layer.
///
/// Returns `None` when the element is not mounted. Callers treat that as "skip this update".
pub trait Measure {
    fn bounds(&self) -> Option<Bounds>;
}

impl<F: Fn() -> Option<Bounds>> Measure for F {
    fn bounds(&self) -> Option<Bounds> {
        self()
    }
}

/// Viewport geometry reported by the host on mount and on every resize.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    /// Height of the document content, excluding pin spacing.
    pub content_height: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32, content_height: f32) -> Self {
        Self {
            width,
            height,
            content_height,
        }
    }
}

/// Raw scroll input coming from the host.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollInput {
    Wheel { delta: f32 },
    Touch { delta: f32 },
    /// The host's native scroll position changed (scrollbar, keyboard, programmatic).
    Native { offset: f32 },
}

/// Addresses one animatable property of one render target, e.g. `("mask", "scale")`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertyKey {
    pub target: String,
    pub property: String,
}

impl PropertyKey {
    pub fn new(target: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            property: property.into(),
        }
    }
}

impl From<(&str, &str)> for PropertyKey {
    fn from((target, property): (&str, &str)) -> Self {
        Self::new(target, property)
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.target, self.property)
    }
}
