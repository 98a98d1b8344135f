use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::phase::ValueFn;
use crate::{
    ConfigError, Easing, Keyframe, KeyframeValue, Lerp, PhaseId, PropertyKey, TimelineSpec, Value,
};

/// The scheduler's per-tick output: one value per animated property.
pub type PropertyMap = BTreeMap<PropertyKey, Value>;

/// A phase after validation, with its derived `[start, end)` progress boundary.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseSpan {
    pub id: PhaseId,
    pub name: String,
    pub weight: f32,
    pub start: f32,
    pub end: f32,
}

impl PhaseSpan {
    pub fn contains(&self, progress: f32) -> bool {
        progress >= self.start && progress < self.end
    }

    pub fn local_progress(&self, progress: f32) -> f32 {
        let len = self.end - self.start;
        if len <= 0.0 {
            return 1.0;
        }
        ((progress - self.start) / len).clamp(0.0, 1.0)
    }
}

#[derive(Clone)]
enum Interp {
    Lerp { from: Value, to: Value },
    Computed(ValueFn),
}

#[derive(Clone)]
struct ResolvedKeyframe {
    /// Declaration order (phase order, then order within the phase).
    order: usize,
    phase: PhaseId,
    name: Option<String>,
    /// Window `[start, end]` in progress units. An empty window means "set at `start`".
    start: f32,
    end: f32,
    easing: Easing,
    snap: Option<f32>,
    immediate_render: bool,
    interp: Interp,
}

impl ResolvedKeyframe {
    fn local_time(&self, progress: f32) -> f32 {
        if self.end <= self.start {
            return 1.0;
        }
        ((progress - self.start) / (self.end - self.start)).clamp(0.0, 1.0)
    }

    fn is_active(&self, progress: f32) -> bool {
        progress >= self.start && progress <= self.end
    }

    fn sample(&self, progress: f32) -> Value {
        let eased = self.easing.sample(self.local_time(progress));
        let v = match &self.interp {
            Interp::Lerp { from, to } => from.lerp(to, eased),
            Interp::Computed(f) => f(eased),
        };
        v.snapped(self.snap)
    }
}

/// A keyframe's resolved window, before its baseline is known.
struct Window<'a> {
    order: usize,
    phase: PhaseId,
    start: f32,
    end: f32,
    keyframe: &'a Keyframe,
}

#[derive(Clone)]
struct Track {
    key: PropertyKey,
    initial: Value,
    /// Sorted by start, then declaration order.
    keyframes: Vec<ResolvedKeyframe>,
}

impl Track {
    /// Among keyframes whose window covers `progress` the last-declared wins. With none active,
    /// the most recently finished one holds its end value; before anything has started the
    /// initial value holds, unless an immediate-render keyframe is waiting to start.
    fn value_at(&self, progress: f32) -> Value {
        let mut active: Option<&ResolvedKeyframe> = None;
        let mut finished: Option<&ResolvedKeyframe> = None;
        let mut pending: Option<&ResolvedKeyframe> = None;
        for kf in &self.keyframes {
            if kf.start > progress {
                if kf.immediate_render && pending.is_none_or(|p| kf.order > p.order) {
                    pending = Some(kf);
                }
            } else if progress <= kf.end {
                if active.is_none_or(|a| kf.order > a.order) {
                    active = Some(kf);
                }
            } else if finished
                .is_none_or(|f| kf.end > f.end || (kf.end == f.end && kf.order > f.order))
            {
                finished = Some(kf);
            }
        }
        match active.or(finished) {
            Some(kf) => kf.sample(progress),
            None => pending.map_or(self.initial, |kf| kf.sample(kf.start)),
        }
    }
}

/// A validated, immutable timeline.
///
/// Built once from a [`TimelineSpec`]; [`Timeline::evaluate`] is a pure function of progress.
#[derive(Clone)]
pub struct Timeline {
    phases: Vec<PhaseSpan>,
    tracks: Vec<Track>,
    total_weight: f32,
}

impl core::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Timeline")
            .field("phases", &self.phases)
            .field("tracks", &self.tracks.len())
            .field("total_weight", &self.total_weight)
            .finish()
    }
}

impl Timeline {
    pub fn build(spec: &TimelineSpec) -> Result<Self, ConfigError> {
        if spec.phases.is_empty() {
            return Err(ConfigError::NoPhases);
        }
        for phase in &spec.phases {
            if !phase.weight.is_finite() || phase.weight <= 0.0 {
                return Err(ConfigError::InvalidWeight {
                    phase: phase.name.clone(),
                    weight: phase.weight,
                });
            }
        }

        let total_weight: f32 = spec.phases.iter().map(|p| p.weight).sum();
        let last = spec.phases.len() - 1;
        let mut phases = Vec::with_capacity(spec.phases.len());
        let mut cursor = 0.0f32;
        for (i, phase) in spec.phases.iter().enumerate() {
            let start = cursor / total_weight;
            cursor += phase.weight;
            let end = if i == last {
                1.0
            } else {
                cursor / total_weight
            };
            phases.push(PhaseSpan {
                id: PhaseId(i),
                name: phase.name.clone(),
                weight: phase.weight,
                start,
                end,
            });
        }

        let mut tracks: Vec<Track> = Vec::new();
        let mut windows: Vec<Vec<Window<'_>>> = Vec::new();
        let mut order = 0usize;
        let mut phase_start_units = 0.0f32;
        for (i, phase) in spec.phases.iter().enumerate() {
            for kf in &phase.keyframes {
                let offset = kf.offset;
                if !offset.is_finite() || offset < 0.0 || offset > phase.weight {
                    return Err(ConfigError::InvalidOffset {
                        phase: phase.name.clone(),
                        offset,
                    });
                }
                let duration = match kf.duration {
                    Some(d) if !d.is_finite() || d < 0.0 => {
                        return Err(ConfigError::InvalidDuration {
                            phase: phase.name.clone(),
                            duration: d,
                        });
                    }
                    Some(d) => d,
                    None => phase.weight - offset,
                };

                // Anchors on a phase edge reuse the edge itself so windows line up exactly with
                // the phase partition.
                let edge = &phases[i];
                let start_units = phase_start_units + offset;
                let end_units = start_units + duration;
                let start = if offset == 0.0 {
                    edge.start
                } else {
                    start_units / total_weight
                };
                let end = if kf.duration.is_none() {
                    edge.end
                } else if end_units >= total_weight {
                    if end_units > total_weight {
                        pwarn!(
                            phase = phase.name.as_str(),
                            property = %kf.target,
                            "Timeline::build: keyframe runs past the timeline end; clamping"
                        );
                    }
                    1.0
                } else {
                    (end_units / total_weight).max(start)
                };

                let track_idx = match tracks.iter().position(|t| t.key == kf.target) {
                    Some(idx) => idx,
                    None => {
                        let initial = match (spec.initial_value(&kf.target), &kf.value) {
                            (Some(v), _) => v,
                            (None, KeyframeValue::FromTo(from, _)) => *from,
                            (None, KeyframeValue::Computed(f)) => f(0.0),
                            (None, KeyframeValue::To(_) | KeyframeValue::From(_)) => {
                                return Err(ConfigError::MissingInitialValue(kf.target.clone()));
                            }
                        };
                        tracks.push(Track {
                            key: kf.target.clone(),
                            initial,
                            keyframes: Vec::new(),
                        });
                        windows.push(Vec::new());
                        tracks.len() - 1
                    }
                };
                windows[track_idx].push(Window {
                    order,
                    phase: PhaseId(i),
                    start,
                    end,
                    keyframe: kf,
                });
                order += 1;
            }
            phase_start_units += phase.weight;
        }

        // Baselines follow time order: each keyframe starts from whatever the track shows at its
        // start given every keyframe that opened before it.
        for (track, mut pending) in tracks.iter_mut().zip(windows) {
            pending.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.order.cmp(&b.order)));
            for w in pending {
                let kf = w.keyframe;
                let baseline = track.value_at(w.start);
                let interp = match &kf.value {
                    KeyframeValue::To(to) => Interp::Lerp {
                        from: baseline,
                        to: *to,
                    },
                    KeyframeValue::From(from) => Interp::Lerp {
                        from: *from,
                        to: baseline,
                    },
                    KeyframeValue::FromTo(from, to) => Interp::Lerp {
                        from: *from,
                        to: *to,
                    },
                    KeyframeValue::Computed(f) => Interp::Computed(f.clone()),
                };
                track.keyframes.push(ResolvedKeyframe {
                    order: w.order,
                    phase: w.phase,
                    name: kf.name.clone(),
                    start: w.start,
                    end: w.end,
                    easing: kf.easing.unwrap_or(spec.default_easing),
                    snap: kf.snap,
                    immediate_render: kf.immediate_render,
                    interp,
                });
            }
        }

        pdebug!(
            phases = phases.len(),
            tracks = tracks.len(),
            total_weight,
            "Timeline::build"
        );
        Ok(Self {
            phases,
            tracks,
            total_weight,
        })
    }

    pub fn phases(&self) -> &[PhaseSpan] {
        &self.phases
    }

    /// Sum of phase weights, in virtual-scroll units.
    pub fn total_weight(&self) -> f32 {
        self.total_weight
    }

    /// Phase boundaries on the progress axis: `[0, b1, ..., 1]`.
    pub fn boundaries(&self) -> Vec<f32> {
        let mut out: Vec<f32> = self.phases.iter().map(|p| p.start).collect();
        out.push(1.0);
        out
    }

    /// Every property the timeline animates, in order of first appearance.
    pub fn properties(&self) -> impl Iterator<Item = &PropertyKey> {
        self.tracks.iter().map(|t| &t.key)
    }

    pub fn keyframe_names(&self) -> impl Iterator<Item = &str> {
        self.tracks
            .iter()
            .flat_map(|t| t.keyframes.iter())
            .filter_map(|kf| kf.name.as_deref())
    }

    /// The phase owning `progress`. At an exact boundary the incoming phase wins.
    pub fn phase_at(&self, progress: f32) -> &PhaseSpan {
        let p = clamp_progress(progress);
        let idx = self.phases.partition_point(|span| span.start <= p);
        &self.phases[idx.saturating_sub(1)]
    }

    /// `(phase, local progress within it)`.
    pub fn locate(&self, progress: f32) -> (PhaseId, f32) {
        let p = clamp_progress(progress);
        let span = self.phase_at(p);
        (span.id, span.local_progress(p))
    }

    /// Phases with at least one keyframe whose window covers `progress`, plus the phase owning
    /// it. More than one entry means a cross-fade is in flight.
    pub fn active_phases(&self, progress: f32) -> Vec<PhaseId> {
        let p = clamp_progress(progress);
        let mut out: Vec<PhaseId> = self
            .tracks
            .iter()
            .flat_map(|t| t.keyframes.iter())
            .filter(|kf| kf.is_active(p))
            .map(|kf| kf.phase)
            .collect();
        out.push(self.phase_at(p).id);
        out.sort_unstable();
        out.dedup();
        out
    }

    pub fn value_at(&self, key: &PropertyKey, progress: f32) -> Option<Value> {
        let p = clamp_progress(progress);
        self.tracks
            .iter()
            .find(|t| t.key == *key)
            .map(|t| t.value_at(p))
    }

    /// Samples every property at `progress` (clamped to `[0, 1]`).
    pub fn evaluate(&self, progress: f32) -> PropertyMap {
        let p = clamp_progress(progress);
        self.tracks
            .iter()
            .map(|t| (t.key.clone(), t.value_at(p)))
            .collect()
    }

    /// Like [`Timeline::evaluate`], writing into an existing map.
    ///
    /// Keys the timeline doesn't animate are left untouched.
    pub fn evaluate_into(&self, progress: f32, out: &mut PropertyMap) {
        let p = clamp_progress(progress);
        for t in &self.tracks {
            out.insert(t.key.clone(), t.value_at(p));
        }
    }
}

pub(crate) fn clamp_progress(progress: f32) -> f32 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    }
}

/// Deliberate input-to-visual lag between pin progress and rendered progress.
///
/// Each tick: `value += (raw - value) / factor`. A factor of `1.0` or less disables the lag.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scrub {
    factor: f32,
    value: f32,
}

impl Scrub {
    const SNAP_EPSILON: f32 = 1e-4;

    pub fn new(factor: f32) -> Self {
        Self { factor, value: 0.0 }
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_settled(&self, raw: f32) -> bool {
        self.value == clamp_progress(raw)
    }

    /// Jumps to `progress` with no lag.
    pub fn reset(&mut self, progress: f32) {
        self.value = clamp_progress(progress);
    }

    pub fn update(&mut self, raw: f32) -> f32 {
        let raw = clamp_progress(raw);
        if self.factor.is_nan() || self.factor <= 1.0 {
            self.value = raw;
            return raw;
        }
        let next = self.value + (raw - self.value) / self.factor;
        self.value = if (raw - next).abs() < Self::SNAP_EPSILON {
            raw
        } else {
            clamp_progress(next)
        };
        self.value
    }
}
