use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::{
    ConfigError, EngineContext, KeyframeValue, PropertyKey, SubscriptionId, TimelineSpec, Value,
    Viewport,
};

/// A half-open viewport width range `[min, max)` in pixels. `max: None` is unbounded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WidthRange {
    pub min: u32,
    pub max: Option<u32>,
}

impl WidthRange {
    pub const ANY: Self = Self { min: 0, max: None };

    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// `(min-width: min)`.
    pub fn at_least(min: u32) -> Self {
        Self { min, max: None }
    }

    /// `(max-width: max - 1)`.
    pub fn below(max: u32) -> Self {
        Self {
            min: 0,
            max: Some(max),
        }
    }

    pub fn contains(&self, width: u32) -> bool {
        width >= self.min && self.max.is_none_or(|max| width < max)
    }

    pub fn is_empty(&self) -> bool {
        self.max.is_some_and(|max| max <= self.min)
    }
}

/// Checks that the predicates cover every width exactly once.
pub fn validate_predicates(predicates: &[WidthRange]) -> Result<(), ConfigError> {
    if predicates.is_empty() {
        return Err(ConfigError::NoVariants);
    }
    if let Some(i) = predicates.iter().position(WidthRange::is_empty) {
        return Err(ConfigError::EmptyBreakpoint(i));
    }

    let mut order: Vec<usize> = (0..predicates.len()).collect();
    order.sort_by_key(|&i| predicates[i].min);

    let mut cursor: Option<u32> = Some(0);
    let mut prev: Option<usize> = None;
    for &i in &order {
        let range = predicates[i];
        let Some(expected) = cursor else {
            // The previous range was unbounded.
            return Err(ConfigError::OverlappingBreakpoints {
                first: prev.unwrap_or(i),
                second: i,
            });
        };
        if range.min > expected {
            return Err(ConfigError::BreakpointGap { from: expected });
        }
        if range.min < expected {
            return Err(ConfigError::OverlappingBreakpoints {
                first: prev.unwrap_or(i),
                second: i,
            });
        }
        cursor = range.max;
        prev = Some(i);
    }

    match cursor {
        None => Ok(()),
        Some(from) => Err(ConfigError::BreakpointGap { from }),
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VariantOverride {
    /// Replaces the value of every keyframe with this name.
    Keyframe { name: String, value: KeyframeValue },
    Initial { key: PropertyKey, value: Value },
}

/// An alternate configuration selected by viewport width.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BreakpointVariant {
    pub name: String,
    pub predicate: WidthRange,
    /// Overrides the timeline's total virtual distance (pin length in pixels).
    pub total_distance: Option<f32>,
    pub overrides: Vec<VariantOverride>,
}

impl BreakpointVariant {
    pub fn new(name: impl Into<String>, predicate: WidthRange) -> Self {
        Self {
            name: name.into(),
            predicate,
            total_distance: None,
            overrides: Vec::new(),
        }
    }

    pub fn with_total_distance(mut self, total_distance: f32) -> Self {
        self.total_distance = Some(total_distance);
        self
    }

    pub fn with_keyframe_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides.push(VariantOverride::Keyframe {
            name: name.into(),
            value: KeyframeValue::To(value.into()),
        });
        self
    }

    pub fn with_keyframe_override(mut self, name: impl Into<String>, value: KeyframeValue) -> Self {
        self.overrides.push(VariantOverride::Keyframe {
            name: name.into(),
            value,
        });
        self
    }

    pub fn with_initial(mut self, key: impl Into<PropertyKey>, value: impl Into<Value>) -> Self {
        self.overrides.push(VariantOverride::Initial {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Applies this variant's overrides on top of `base`.
    pub fn apply(&self, base: &TimelineSpec) -> Result<TimelineSpec, ConfigError> {
        let mut spec = base.clone();
        for o in &self.overrides {
            match o {
                VariantOverride::Keyframe { name, value } => {
                    spec.set_keyframe_value(name, value.clone())?;
                }
                VariantOverride::Initial { key, value } => spec.set_initial(key.clone(), *value),
            }
        }
        Ok(spec)
    }
}

/// Reported when the active breakpoint changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BreakpointChange {
    pub previous: Option<usize>,
    pub current: usize,
    pub width: u32,
}

/// Tracks which of a validated, exhaustive set of width predicates is active.
#[derive(Clone, Debug)]
pub struct BreakpointResolver {
    predicates: Vec<WidthRange>,
    active: Option<usize>,
}

impl BreakpointResolver {
    pub fn new(predicates: Vec<WidthRange>) -> Result<Self, ConfigError> {
        validate_predicates(&predicates)?;
        Ok(Self {
            predicates,
            active: None,
        })
    }

    pub fn predicates(&self) -> &[WidthRange] {
        &self.predicates
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn resolve(&self, width: u32) -> usize {
        // Validation guarantees exactly one match.
        self.predicates
            .iter()
            .position(|p| p.contains(width))
            .unwrap_or_default()
    }

    /// Re-evaluates for `width`; returns the change if the active predicate moved.
    pub fn update(&mut self, width: u32) -> Option<BreakpointChange> {
        let current = self.resolve(width);
        if self.active == Some(current) {
            return None;
        }
        let change = BreakpointChange {
            previous: self.active,
            current,
            width,
        };
        self.active = Some(current);
        Some(change)
    }
}

/// A media-query style listener registered on an [`EngineContext`].
///
/// Dropping the listener (or calling [`BreakpointListener::remove`]) unsubscribes it.
#[derive(Debug)]
pub struct BreakpointListener {
    ctx: EngineContext,
    id: Option<SubscriptionId>,
    resolver: Rc<RefCell<BreakpointResolver>>,
}

impl BreakpointListener {
    pub fn active(&self) -> Option<usize> {
        self.resolver.borrow().active()
    }

    pub fn is_registered(&self) -> bool {
        self.id.is_some()
    }

    pub fn remove(&mut self) {
        if let Some(id) = self.id.take() {
            self.ctx.viewport_listeners().unsubscribe(id);
        }
    }
}

impl Drop for BreakpointListener {
    fn drop(&mut self) {
        self.remove();
    }
}

/// Subscribes `on_change` to viewport reports on `ctx`.
///
/// `on_change` fires on the first report and then whenever the active predicate changes.
pub fn register_breakpoint_listener(
    ctx: &EngineContext,
    predicates: Vec<WidthRange>,
    mut on_change: impl FnMut(&BreakpointChange) + 'static,
) -> Result<BreakpointListener, ConfigError> {
    let resolver = Rc::new(RefCell::new(BreakpointResolver::new(predicates)?));
    let id = ctx.viewport_listeners().subscribe({
        let resolver = Rc::clone(&resolver);
        move |viewport: &Viewport| {
            let change = resolver.borrow_mut().update(viewport.width);
            if let Some(change) = change {
                pdebug!(
                    previous = ?change.previous,
                    current = change.current,
                    width = change.width,
                    "breakpoint change"
                );
                on_change(&change);
            }
        }
    });
    Ok(BreakpointListener {
        ctx: ctx.clone(),
        id: Some(id),
        resolver,
    })
}
