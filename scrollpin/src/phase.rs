//! Declarative timeline configuration: phases, keyframes and their time anchors.
//!
//! Everything here is plain data. [`crate::Timeline::build`] validates it and resolves anchors to
//! absolute progress windows once, so evaluation never parses labels or walks phases.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::{ConfigError, Easing, PropertyKey, Value};

/// Position of a phase in its timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseId(pub usize);

/// A progress function: receives eased local time in `[0, 1]` and returns the property value.
pub type ValueFn = Arc<dyn Fn(f32) -> Value + Send + Sync>;

/// What a keyframe animates between.
///
/// The *baseline* is the property's value at the keyframe's start, as left by the initial value
/// and every keyframe that starts before this one.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyframeValue {
    /// Baseline → value.
    To(Value),
    /// Value → baseline.
    From(Value),
    FromTo(Value, Value),
    #[cfg_attr(feature = "serde", serde(skip))]
    Computed(ValueFn),
}

impl fmt::Debug for KeyframeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::To(v) => f.debug_tuple("To").field(v).finish(),
            Self::From(v) => f.debug_tuple("From").field(v).finish(),
            Self::FromTo(a, b) => f.debug_tuple("FromTo").field(a).field(b).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// `(phase, offset within phase, optional duration)`, all in virtual-scroll units.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeAnchor {
    pub phase: PhaseId,
    pub offset: f32,
    /// Defaults to the remainder of the phase.
    pub duration: Option<f32>,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Keyframe {
    /// Lets breakpoint variants override this keyframe's value.
    pub name: Option<String>,
    pub target: PropertyKey,
    pub value: KeyframeValue,
    /// Falls back to [`TimelineSpec::default_easing`].
    pub easing: Option<Easing>,
    pub offset: f32,
    pub duration: Option<f32>,
    /// Rounds numeric output to a multiple of this increment.
    pub snap: Option<f32>,
    /// Shows the keyframe's start value before its window opens, as long as nothing else on the
    /// property has started yet.
    #[cfg_attr(feature = "serde", serde(default))]
    pub immediate_render: bool,
}

impl Keyframe {
    pub fn new(target: impl Into<PropertyKey>, value: KeyframeValue) -> Self {
        Self {
            name: None,
            target: target.into(),
            value,
            easing: None,
            offset: 0.0,
            duration: None,
            snap: None,
            immediate_render: false,
        }
    }

    pub fn to(target: impl Into<PropertyKey>, value: impl Into<Value>) -> Self {
        Self::new(target, KeyframeValue::To(value.into()))
    }

    pub fn from(target: impl Into<PropertyKey>, value: impl Into<Value>) -> Self {
        Self::new(target, KeyframeValue::From(value.into()))
    }

    pub fn from_to(
        target: impl Into<PropertyKey>,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> Self {
        Self::new(target, KeyframeValue::FromTo(from.into(), to.into()))
    }

    pub fn computed(
        target: impl Into<PropertyKey>,
        f: impl Fn(f32) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self::new(target, KeyframeValue::Computed(Arc::new(f)))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    pub fn with_offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_snap(mut self, increment: f32) -> Self {
        self.snap = Some(increment);
        self
    }

    pub fn with_immediate_render(mut self, immediate: bool) -> Self {
        self.immediate_render = immediate;
        self
    }

    /// Repeats this keyframe for each target, delaying the i-th copy by `i * each`.
    ///
    /// Named keyframes get an `#i` suffix so every copy stays individually addressable.
    pub fn stagger<I, S>(self, targets: I, each: f32) -> Vec<Keyframe>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        targets
            .into_iter()
            .enumerate()
            .map(|(i, target)| {
                let mut kf = self.clone();
                kf.target.target = target.into();
                kf.offset += each * i as f32;
                kf.name = self.name.as_ref().map(|n| alloc::format!("{n}#{i}"));
                kf
            })
            .collect()
    }

    pub fn anchor(&self, phase: PhaseId) -> TimeAnchor {
        TimeAnchor {
            phase,
            offset: self.offset,
            duration: self.duration,
        }
    }
}

/// A named timeline segment with its own keyframes and duration weight.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Phase {
    pub name: String,
    pub weight: f32,
    pub keyframes: Vec<Keyframe>,
}

impl Phase {
    pub fn new(name: impl Into<String>, weight: f32) -> Self {
        Self {
            name: name.into(),
            weight,
            keyframes: Vec::new(),
        }
    }

    pub fn with_keyframe(mut self, keyframe: Keyframe) -> Self {
        self.keyframes.push(keyframe);
        self
    }

    pub fn with_keyframes(mut self, keyframes: impl IntoIterator<Item = Keyframe>) -> Self {
        self.keyframes.extend(keyframes);
        self
    }
}

/// The full declarative description of a timeline.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimelineSpec {
    pub phases: Vec<Phase>,
    /// Values each property holds before any keyframe touches it.
    pub initial: Vec<(PropertyKey, Value)>,
    pub default_easing: Easing,
}

impl Default for TimelineSpec {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineSpec {
    pub fn new() -> Self {
        Self {
            phases: Vec::new(),
            initial: Vec::new(),
            default_easing: Easing::PowerInOut(2),
        }
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phases.push(phase);
        self
    }

    pub fn with_initial(mut self, target: impl Into<PropertyKey>, value: impl Into<Value>) -> Self {
        self.set_initial(target.into(), value.into());
        self
    }

    pub fn with_default_easing(mut self, easing: Easing) -> Self {
        self.default_easing = easing;
        self
    }

    /// Declares (or replaces) a property's initial value.
    pub fn set_initial(&mut self, key: PropertyKey, value: Value) {
        match self.initial.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.initial.push((key, value)),
        }
    }

    pub fn initial_value(&self, key: &PropertyKey) -> Option<Value> {
        self.initial
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }

    pub fn phase_id(&self, name: &str) -> Option<PhaseId> {
        self.phases.iter().position(|p| p.name == name).map(PhaseId)
    }

    /// Adds a keyframe at a GSAP-style position label: `"name"`, `"name+=0.5"` or `"name-=0.5"`.
    ///
    /// The label is resolved here to an absolute `(phase, offset)` pair. A negative relative
    /// offset lands in whichever earlier phase contains that point.
    pub fn add_at(
        &mut self,
        label: &str,
        mut keyframe: Keyframe,
    ) -> Result<TimeAnchor, ConfigError> {
        let (name, relative) = parse_label(label)?;
        let id = self
            .phase_id(name)
            .ok_or_else(|| ConfigError::UnknownPhase(name.into()))?;

        let phase_start: f32 = self.phases[..id.0].iter().map(|p| p.weight).sum();
        let absolute = phase_start + relative + keyframe.offset;
        if !absolute.is_finite() || absolute < 0.0 {
            return Err(ConfigError::InvalidOffset {
                phase: name.into(),
                offset: relative,
            });
        }

        let last = self.phases.len() - 1;
        let mut owner = last;
        let mut owner_start = self.phases[..last].iter().map(|p| p.weight).sum::<f32>();
        let mut start = 0.0f32;
        for (i, phase) in self.phases.iter().enumerate() {
            if absolute < start + phase.weight {
                owner = i;
                owner_start = start;
                break;
            }
            start += phase.weight;
        }

        keyframe.offset = absolute - owner_start;
        let anchor = keyframe.anchor(PhaseId(owner));
        self.phases[owner].keyframes.push(keyframe);
        Ok(anchor)
    }

    /// Replaces the value of every keyframe named `name`.
    pub fn set_keyframe_value(
        &mut self,
        name: &str,
        value: KeyframeValue,
    ) -> Result<usize, ConfigError> {
        let mut hits = 0usize;
        for kf in self.phases.iter_mut().flat_map(|p| p.keyframes.iter_mut()) {
            if kf.name.as_deref() == Some(name) {
                kf.value = value.clone();
                hits += 1;
            }
        }
        if hits == 0 {
            return Err(ConfigError::UnknownKeyframe(name.into()));
        }
        Ok(hits)
    }
}

/// Splits `"phase2+=0.5"` into `("phase2", 0.5)`.
pub fn parse_label(label: &str) -> Result<(&str, f32), ConfigError> {
    let malformed = || ConfigError::MalformedLabel(label.into());
    let label = label.trim();

    let (name, offset) = if let Some((name, rest)) = label.split_once("+=") {
        (name, rest.trim().parse::<f32>().map_err(|_| malformed())?)
    } else if let Some((name, rest)) = label.split_once("-=") {
        (name, -rest.trim().parse::<f32>().map_err(|_| malformed())?)
    } else {
        (label, 0.0)
    };

    let name = name.trim();
    if name.is_empty() || !offset.is_finite() {
        return Err(malformed());
    }
    Ok((name, offset))
}
