use crate::ScrollInput;

/// How scroll input reaches the processor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InputMode {
    /// Fine-grained wheel/touch deltas are available and get low-pass filtered.
    #[default]
    Deltas,
    /// Only native scroll positions are available; the output follows them unfiltered.
    Native,
}

/// Configuration for [`InertialScroll`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InertialOptions {
    /// Fraction of the remaining distance covered per tick, in `(0, 1]`.
    pub responsiveness: f32,
    /// Upper bound on the per-tick step, in pixels. Non-positive means unbounded.
    pub max_velocity: f32,
    pub wheel_multiplier: f32,
    pub touch_multiplier: f32,
    /// Below this distance to the target the filter snaps and reports zero velocity.
    pub settle_epsilon: f32,
    pub mode: InputMode,
}

impl Default for InertialOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl InertialOptions {
    pub fn new() -> Self {
        Self {
            responsiveness: 0.1,
            max_velocity: 400.0,
            wheel_multiplier: 1.0,
            touch_multiplier: 1.0,
            settle_epsilon: 0.1,
            mode: InputMode::Deltas,
        }
    }

    pub fn with_responsiveness(mut self, responsiveness: f32) -> Self {
        self.responsiveness = responsiveness;
        self
    }

    pub fn with_max_velocity(mut self, max_velocity: f32) -> Self {
        self.max_velocity = max_velocity;
        self
    }

    pub fn with_multipliers(mut self, wheel: f32, touch: f32) -> Self {
        self.wheel_multiplier = wheel;
        self.touch_multiplier = touch;
        self
    }

    pub fn with_settle_epsilon(mut self, settle_epsilon: f32) -> Self {
        self.settle_epsilon = settle_epsilon;
        self
    }

    pub fn with_mode(mut self, mode: InputMode) -> Self {
        self.mode = mode;
        self
    }

    fn responsiveness(&self) -> f32 {
        if self.responsiveness.is_finite() && self.responsiveness > 0.0 {
            self.responsiveness.min(1.0)
        } else {
            1.0
        }
    }
}

/// Low-pass filters noisy wheel/touch input into a smoothed virtual scroll offset.
///
/// Input handlers only move the target; [`InertialScroll::update`] moves the smoothed offset and
/// must be called exactly once per tick.
#[derive(Clone, Debug)]
pub struct InertialScroll {
    options: InertialOptions,
    target: f32,
    smoothed: f32,
    velocity: f32,
    limit: f32,
}

impl InertialScroll {
    pub fn new(options: InertialOptions) -> Self {
        Self {
            options,
            target: 0.0,
            smoothed: 0.0,
            velocity: 0.0,
            limit: f32::INFINITY,
        }
    }

    pub fn options(&self) -> &InertialOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: InertialOptions) {
        self.options = options;
    }

    pub fn mode(&self) -> InputMode {
        self.options.mode
    }

    /// The largest reachable offset (document length minus viewport).
    pub fn limit(&self) -> f32 {
        self.limit
    }

    pub fn set_limit(&mut self, limit: f32) {
        self.limit = if limit.is_nan() { 0.0 } else { limit.max(0.0) };
        self.target = self.clamp(self.target);
        self.smoothed = self.clamp(self.smoothed);
    }

    pub fn raw_offset(&self) -> f32 {
        self.target
    }

    pub fn smoothed_offset(&self) -> f32 {
        self.smoothed
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn is_settled(&self) -> bool {
        self.smoothed == self.target
    }

    pub fn apply(&mut self, input: ScrollInput) {
        match input {
            ScrollInput::Wheel { delta } => self.on_delta(delta * self.options.wheel_multiplier),
            ScrollInput::Touch { delta } => self.on_delta(delta * self.options.touch_multiplier),
            ScrollInput::Native { offset } => self.on_native_scroll(offset),
        }
    }

    fn on_delta(&mut self, delta: f32) {
        if !delta.is_finite() {
            return;
        }
        self.target = self.clamp(self.target + delta);
        ptrace!(delta, target = self.target, "InertialScroll::on_delta");
    }

    /// A native scroll position reported by the host.
    ///
    /// In `Deltas` mode this comes from a scrollbar drag or a programmatic jump, so the filter
    /// re-syncs immediately instead of easing toward it.
    pub fn on_native_scroll(&mut self, offset: f32) {
        if !offset.is_finite() {
            return;
        }
        let offset = self.clamp(offset);
        self.target = offset;
        if self.options.mode == InputMode::Deltas {
            self.smoothed = offset;
            self.velocity = 0.0;
        }
    }

    /// Moves raw, target and smoothed offsets to `offset` with no easing.
    pub fn jump_to(&mut self, offset: f32) {
        let offset = self.clamp(offset);
        self.target = offset;
        self.smoothed = offset;
        self.velocity = 0.0;
    }

    /// Advances the filter by one tick and returns the smoothed offset.
    pub fn update(&mut self) -> f32 {
        let remaining = self.target - self.smoothed;
        let step = match self.options.mode {
            InputMode::Native => remaining,
            InputMode::Deltas => {
                let max = if self.options.max_velocity > 0.0 {
                    self.options.max_velocity
                } else {
                    f32::INFINITY
                };
                (remaining * self.options.responsiveness()).clamp(-max, max)
            }
        };

        if (remaining - step).abs() < self.options.settle_epsilon {
            self.smoothed = self.target;
        } else {
            self.smoothed += step;
        }
        self.velocity = if remaining.abs() < self.options.settle_epsilon {
            0.0
        } else {
            step
        };
        self.smoothed
    }

    fn clamp(&self, offset: f32) -> f32 {
        offset.clamp(0.0, self.limit)
    }
}
