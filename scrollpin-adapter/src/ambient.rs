//! Time-based motion that runs on the shared ticker rather than on scroll progress: looping
//! background floats and delayed, staggered entrance reveals.

use alloc::vec::Vec;
use core::cell::Cell;

use scrollpin::{Easing, EngineContext, Frame, Lerp, SubscriptionId, Tween};

/// How many times a [`LoopTween`] plays again after its first run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Repeat {
    Times(u32),
    Forever,
}

/// A [`Tween`] with a start delay, repeats and optional yoyo.
///
/// Before the delay elapses the tween shows its `from` value. With `yoyo`, odd cycles play the
/// eased curve backwards, so the value moves continuously between the endpoints.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoopTween<T> {
    pub tween: Tween<T>,
    pub delay_ms: u64,
    pub repeat: Repeat,
    pub yoyo: bool,
}

impl<T: Lerp> LoopTween<T> {
    pub fn new(tween: Tween<T>) -> Self {
        Self {
            tween,
            delay_ms: 0,
            repeat: Repeat::Times(0),
            yoyo: false,
        }
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn with_yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    fn begin_ms(&self) -> u64 {
        self.tween.start_ms.saturating_add(self.delay_ms)
    }

    fn cycles(&self) -> Option<u64> {
        match self.repeat {
            Repeat::Times(n) => Some(u64::from(n) + 1),
            Repeat::Forever => None,
        }
    }

    /// Never true for [`Repeat::Forever`].
    pub fn is_done(&self, now_ms: u64) -> bool {
        let duration = self.tween.duration_ms.max(1);
        self.cycles().is_some_and(|cycles| {
            now_ms.saturating_sub(self.begin_ms()) >= cycles.saturating_mul(duration)
        })
    }

    pub fn sample(&self, now_ms: u64) -> T {
        let start = self.tween.start_ms;
        let begin = self.begin_ms();
        if now_ms < begin {
            return self.tween.sample(start);
        }

        let duration = self.tween.duration_ms.max(1);
        let elapsed = now_ms - begin;
        let (cycle, within) = match self.cycles() {
            Some(cycles) if elapsed / duration >= cycles => (cycles - 1, duration),
            _ => (elapsed / duration, elapsed % duration),
        };

        let local = if self.yoyo && cycle % 2 == 1 {
            duration - within
        } else {
            within
        };
        self.tween.sample(start + local)
    }
}

/// A set of loop tweens authored against the ticker's smoothed clock (`Frame::time_ms`).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TweenGroup<T> {
    tweens: Vec<LoopTween<T>>,
}

impl<T: Lerp> TweenGroup<T> {
    pub fn new(tweens: impl IntoIterator<Item = LoopTween<T>>) -> Self {
        Self {
            tweens: tweens.into_iter().collect(),
        }
    }

    /// Copies `base` once per target, delaying the i-th copy by `i * each_ms`.
    pub fn staggered(base: LoopTween<T>, count: usize, each_ms: u64) -> Self {
        Self::new((0..count as u64).map(|i| {
            let mut tw = base.clone();
            tw.delay_ms = tw.delay_ms.saturating_add(i.saturating_mul(each_ms));
            tw
        }))
    }

    pub fn tweens(&self) -> &[LoopTween<T>] {
        &self.tweens
    }

    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    pub fn is_done(&self, now_ms: u64) -> bool {
        self.tweens.iter().all(|tw| tw.is_done(now_ms))
    }

    pub fn sample(&self, now_ms: u64) -> Vec<T> {
        let mut out = Vec::with_capacity(self.tweens.len());
        self.sample_into(now_ms, &mut out);
        out
    }

    pub fn sample_into(&self, now_ms: u64, out: &mut Vec<T>) {
        out.clear();
        out.extend(self.tweens.iter().map(|tw| tw.sample(now_ms)));
    }
}

impl<T: Lerp + 'static> TweenGroup<T> {
    /// Drives the group from `ctx`'s ticker, calling `on_frame` with one value per tween each
    /// frame. Finished groups keep reporting their final values until detached.
    pub fn attach(
        self,
        ctx: &EngineContext,
        mut on_frame: impl FnMut(&Frame, &[T]) + 'static,
    ) -> AmbientHandle {
        let mut values = Vec::with_capacity(self.tweens.len());
        adebug!(tweens = self.tweens.len(), "TweenGroup::attach");
        let id = ctx.add_ticker(move |frame: &Frame| {
            self.sample_into(frame.time_ms, &mut values);
            on_frame(frame, &values);
        });
        AmbientHandle {
            ctx: ctx.clone(),
            id: Cell::new(Some(id)),
        }
    }
}

/// Keeps a [`TweenGroup`] subscribed to the ticker. Dropping it detaches.
#[derive(Debug)]
pub struct AmbientHandle {
    ctx: EngineContext,
    id: Cell<Option<SubscriptionId>>,
}

impl AmbientHandle {
    pub fn is_attached(&self) -> bool {
        self.id.get().is_some()
    }

    /// Idempotent.
    pub fn detach(&self) {
        if let Some(id) = self.id.take() {
            self.ctx.remove_ticker(id);
            adebug!("ambient motion detached");
        }
    }
}

impl Drop for AmbientHandle {
    fn drop(&mut self) {
        self.detach();
    }
}

/// xorshift64; deterministic for a given seed.
#[derive(Clone, Copy, Debug)]
struct Xorshift(u64);

impl Xorshift {
    fn new(seed: u64) -> Self {
        Self(if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed })
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform in `[0, 1)`.
    fn next_unit(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_unit()
    }
}

/// Configuration for [`float_group`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FloatOptions {
    /// Each axis drifts to a random offset in `[-range, range]`.
    pub range: f32,
    pub min_duration_ms: u64,
    pub max_duration_ms: u64,
    /// Start delay between consecutive elements.
    pub stagger_ms: u64,
    pub easing: Easing,
    pub seed: u64,
}

impl Default for FloatOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl FloatOptions {
    pub fn new() -> Self {
        Self {
            range: 100.0,
            min_duration_ms: 10_000,
            max_duration_ms: 20_000,
            stagger_ms: 2000,
            easing: Easing::SineInOut,
            seed: 1,
        }
    }

    pub fn with_range(mut self, range: f32) -> Self {
        self.range = range;
        self
    }

    pub fn with_duration_range(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.min_duration_ms = min_ms;
        self.max_duration_ms = max_ms;
        self
    }

    pub fn with_stagger(mut self, stagger_ms: u64) -> Self {
        self.stagger_ms = stagger_ms;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Endless yoyo drifts for `count` background elements, each with its own random target and
/// period, starting `stagger_ms` apart.
pub fn float_group(count: usize, options: FloatOptions) -> TweenGroup<(f32, f32)> {
    let mut rng = Xorshift::new(options.seed);
    let range = options.range.abs();
    let (lo, hi) = if options.min_duration_ms <= options.max_duration_ms {
        (options.min_duration_ms, options.max_duration_ms)
    } else {
        (options.max_duration_ms, options.min_duration_ms)
    };

    TweenGroup::new((0..count as u64).map(|i| {
        let to = (rng.range(-range, range), rng.range(-range, range));
        let duration = lo + ((hi - lo) as f32 * rng.next_unit()) as u64;
        LoopTween::new(Tween::new((0.0, 0.0), to, 0, duration, options.easing))
            .with_delay(i.saturating_mul(options.stagger_ms))
            .with_repeat(Repeat::Forever)
            .with_yoyo(true)
    }))
}
