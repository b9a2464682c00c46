//! Subscription handles and the ordered listener registry.
//!
//! Every observable in this crate keeps its callbacks in a [`Listeners`]
//! registry. Subscribing hands back a [`SubscriptionId`]; that id is the only
//! way to unsubscribe, which makes removal unambiguous even when the same
//! closure is registered twice.
//!
//! # Notification order
//!
//! Listeners are invoked in subscription order. Each notification round works
//! on a snapshot taken before the first callback runs:
//!
//! - a listener subscribed during a round is not called until the next round;
//! - a listener unsubscribed during a round is still called for that round.
//!
//! No lock is held while callbacks run, so a callback may subscribe,
//! unsubscribe or mutate the observable that is notifying it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use smallvec::SmallVec;

/// Unique identifier for a registered listener.
///
/// Ids are allocated from a process-wide counter and are never reused, so an
/// id obtained from one observable can never remove a listener from another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Allocate a fresh id.
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw id value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Snapshot buffer used for one notification round.
type Snapshot<F> = SmallVec<[Arc<F>; 4]>;

/// Ordered registry of listener callbacks of type `F`.
///
/// `F` is usually an unsized closure type such as `dyn Fn(&T) + Send + Sync`.
pub(crate) struct Listeners<F: ?Sized> {
    entries: RwLock<IndexMap<SubscriptionId, Arc<F>>>,
}

impl<F: ?Sized> Listeners<F> {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(IndexMap::new()),
        }
    }

    /// Register a listener at the end of the invocation order.
    pub(crate) fn add(&self, listener: Arc<F>) -> SubscriptionId {
        let id = SubscriptionId::next();
        self.entries.write().insert(id, listener);
        id
    }

    /// Remove a listener. Returns `false` if the id was not registered.
    pub(crate) fn remove(&self, id: SubscriptionId) -> bool {
        // shift_remove keeps the remaining listeners in subscription order
        self.entries.write().shift_remove(&id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }

    fn snapshot(&self) -> Snapshot<F> {
        self.entries.read().values().cloned().collect()
    }

    /// Run `call` once per listener registered when the round starts.
    ///
    /// Returns the number of listeners invoked.
    pub(crate) fn emit(&self, mut call: impl FnMut(&F)) -> usize {
        let snapshot = self.snapshot();
        for listener in &snapshot {
            call(listener);
        }
        snapshot.len()
    }
}

impl<F: ?Sized> Default for Listeners<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ?Sized> fmt::Debug for Listeners<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners").field("len", &self.len()).finish()
    }
}
