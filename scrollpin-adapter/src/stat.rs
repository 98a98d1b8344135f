use alloc::string::String;
use alloc::sync::Arc;
use core::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use scrollpin::{Easing, Keyframe, PropertyKey, Value};

const PENDING: u8 = 0;
/// Claimed by `fulfil`; the value is being written and readers still see the fallback.
const WRITING: u8 = 1;
const FULFILLED: u8 = 2;
const FAILED: u8 = 3;

#[derive(Debug)]
struct Inner {
    bits: AtomicU64,
    status: AtomicU8,
}

/// Whether a [`StatSlot`] has been resolved yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatStatus {
    Pending,
    Fulfilled,
    Failed,
}

/// A statistic fetched from an external service, shown with a fallback until it arrives.
///
/// The slot resolves at most once: the first `fulfil` or `fail` wins and later calls are
/// ignored. Clones share the same value, so a fetch task can resolve a slot that a timeline is
/// already reading. Reads never block.
#[derive(Clone, Debug)]
pub struct StatSlot {
    inner: Arc<Inner>,
}

impl StatSlot {
    pub fn new(fallback: f64) -> Self {
        Self {
            inner: Arc::new(Inner {
                bits: AtomicU64::new(fallback.to_bits()),
                status: AtomicU8::new(PENDING),
            }),
        }
    }

    /// Stores the fetched value. Returns `false` if the slot was already resolved.
    ///
    /// The value is written before the status flips to `Fulfilled`, so a reader that sees
    /// `Fulfilled` always reads the fetched value.
    pub fn fulfil(&self, value: f64) -> bool {
        if !value.is_finite() {
            awarn!(value, "StatSlot::fulfil: non-finite value; keeping fallback");
            self.fail();
            return false;
        }
        if !self.claim(WRITING) {
            return false;
        }
        self.inner.bits.store(value.to_bits(), Ordering::Release);
        self.inner.status.store(FULFILLED, Ordering::Release);
        adebug!(value, "StatSlot::fulfil");
        true
    }

    /// Marks the fetch as failed; the fallback stays. Returns `false` if already resolved.
    pub fn fail(&self) -> bool {
        let claimed = self.claim(FAILED);
        if claimed {
            awarn!(fallback = self.value(), "statistic unavailable; keeping fallback");
        }
        claimed
    }

    pub fn value(&self) -> f64 {
        f64::from_bits(self.inner.bits.load(Ordering::Acquire))
    }

    pub fn status(&self) -> StatStatus {
        match self.inner.status.load(Ordering::Acquire) {
            FULFILLED => StatStatus::Fulfilled,
            FAILED => StatStatus::Failed,
            // Mid-write counts as pending.
            _ => StatStatus::Pending,
        }
    }

    fn claim(&self, status: u8) -> bool {
        self.inner
            .status
            .compare_exchange(PENDING, status, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// A keyframe counting `target.text` up from 0 to whatever `slot` holds when it is sampled,
/// rounded to whole numbers.
pub fn counter_keyframe(target: impl Into<String>, slot: &StatSlot) -> Keyframe {
    let slot = slot.clone();
    Keyframe::computed(PropertyKey::new(target, "text"), move |t| {
        Value::Number(t * slot.value() as f32)
    })
    .with_easing(Easing::PowerOut(1))
    .with_snap(1.0)
}
