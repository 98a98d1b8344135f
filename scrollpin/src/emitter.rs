use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

/// Identifies a callback registered on a [`Registry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback<E> = Rc<RefCell<dyn FnMut(&E)>>;

struct Inner<E> {
    next_id: u64,
    entries: Vec<(SubscriptionId, Callback<E>)>,
}

/// An ordered list of subscribers for one kind of event.
///
/// Cloning a registry yields another handle to the same list. Dispatch iterates a snapshot, so a
/// callback may subscribe or unsubscribe (itself included) while an event is being emitted:
/// - callbacks removed during dispatch are skipped for the rest of that dispatch;
/// - callbacks added during dispatch first fire on the next emit.
///
/// A callback that re-enters `emit` on its own registry is not invoked recursively.
pub struct Registry<E> {
    inner: Rc<RefCell<Inner<E>>>,
}

impl<E> Clone for Registry<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> Default for Registry<E> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }
}

impl<E> fmt::Debug for Registry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("len", &self.inner.borrow().entries.len())
            .finish_non_exhaustive()
    }
}

impl<E: 'static> Registry<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, callback: impl FnMut(&E) + 'static) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.entries.push((id, Rc::new(RefCell::new(callback))));
        id
    }

    /// Returns `false` if `id` was not (or no longer) subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.entries.len();
        inner.entries.retain(|(entry, _)| *entry != id);
        inner.entries.len() != before
    }

    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.inner
            .borrow()
            .entries
            .iter()
            .any(|(entry, _)| *entry == id)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner.borrow_mut().entries.clear();
    }

    pub fn emit(&self, event: &E) {
        let snapshot: Vec<(SubscriptionId, Callback<E>)> = self
            .inner
            .borrow()
            .entries
            .iter()
            .map(|(id, cb)| (*id, Rc::clone(cb)))
            .collect();

        for (id, cb) in snapshot {
            if !self.contains(id) {
                continue;
            }
            let Ok(mut f) = cb.try_borrow_mut() else {
                pwarn!("Registry::emit: skipping re-entrant callback");
                continue;
            };
            f(event);
        }
    }
}
