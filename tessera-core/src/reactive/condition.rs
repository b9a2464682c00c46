//! Reactive Condition
//!
//! A `ReactiveCondition` folds many observables into one boolean signal.
//!
//! # How Conditions Work
//!
//! 1. On construction every source is wrapped in a
//!    [`ReactiveFieldWrapper`], the predicate is evaluated on its current
//!    value and the result is cached per source.
//!
//! 2. When a source changes, only that source's predicate is re-evaluated.
//!    If its result equals the cached one, propagation stops there.
//!
//! 3. Otherwise the cache is updated and the aggregate is recomputed over
//!    all cached results (AND for [`ConditionMode::All`], OR for
//!    [`ConditionMode::Any`]) and stored in a derived
//!    [`ReactiveField<bool>`], which notifies only if the aggregate flipped.
//!
//! An empty condition is vacuously true in `All` mode and false in `Any`
//! mode.
//!
//! The aggregate is stored after the result cache is unlocked, so two
//! threads flipping sources at once could store their aggregates out of
//! order. After storing, the aggregate is recomputed from the cache and
//! stored again until the two agree.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace};

use super::field::ReactiveField;
use super::observable::{Listener, ReadOnlyRx};
use super::subscriber::SubscriptionId;
use super::wrapper::{ReactiveFieldWrapper, WrappedSource};
use crate::error::RxError;

/// How per-source results combine into the condition value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ConditionMode {
    /// Met when every source satisfies the predicate.
    All = 1,
    /// Met when at least one source satisfies the predicate.
    Any = 2,
}

impl ConditionMode {
    /// Combine per-source results.
    pub fn aggregate<I>(self, results: I) -> bool
    where
        I: IntoIterator<Item = bool>,
    {
        let mut results = results.into_iter();
        match self {
            ConditionMode::All => results.all(|met| met),
            ConditionMode::Any => results.any(|met| met),
        }
    }
}

impl TryFrom<u8> for ConditionMode {
    type Error = RxError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(ConditionMode::All),
            2 => Ok(ConditionMode::Any),
            other => Err(RxError::UnknownConditionMode(other)),
        }
    }
}

impl FromStr for ConditionMode {
    type Err = RxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(ConditionMode::All)
        } else if s.eq_ignore_ascii_case("any") {
            Ok(ConditionMode::Any)
        } else {
            Err(RxError::UnknownConditionModeName(s.to_string()))
        }
    }
}

impl fmt::Display for ConditionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionMode::All => f.write_str("all"),
            ConditionMode::Any => f.write_str("any"),
        }
    }
}

/// Shared interior of a [`ReactiveCondition`].
struct ConditionInner<P: 'static> {
    predicate: Box<dyn Fn(&P) -> bool + Send + Sync>,
    mode: ConditionMode,

    /// One wrapper per source, in construction order. Never read after
    /// construction, but dropping them detaches us from the sources.
    sources: Vec<ReactiveFieldWrapper<P>>,

    /// Last predicate result per source, indexed like `sources`.
    results: RwLock<SmallVec<[bool; 8]>>,

    /// The aggregate.
    is_met: ReactiveField<bool>,
}

impl<P: 'static> ConditionInner<P> {
    fn on_source_changed(&self, index: usize, source: &WrappedSource<P>) {
        let met = (self.predicate)(&source.value());

        let aggregate = {
            let mut results = self.results.write();
            let Some(cached) = results.get_mut(index) else {
                return;
            };
            if *cached == met {
                trace!(source = index, met, "condition source result unchanged");
                return;
            }
            *cached = met;
            self.mode.aggregate(results.iter().copied())
        };

        trace!(source = index, met, aggregate, "condition source result changed");
        self.store_aggregate(aggregate);
    }

    /// Store `aggregate`, then repeat with the cached results' aggregate until
    /// the derived field matches the cache.
    fn store_aggregate(&self, mut aggregate: bool) {
        loop {
            self.is_met.set(aggregate);
            let settled = self.mode.aggregate(self.results.read().iter().copied());
            if settled == aggregate {
                return;
            }
            trace!(stale = aggregate, settled, "condition aggregate superseded");
            aggregate = settled;
        }
    }
}

/// A boolean derived from many sources through a predicate.
///
/// Cloning yields another handle to the same condition. The condition stays
/// attached to its sources until the last handle is dropped.
///
/// # Example
///
/// ```rust
/// use tessera_core::reactive::{ConditionMode, ReactiveCondition, ReactiveField};
///
/// let levers = [ReactiveField::new(false), ReactiveField::new(false)];
/// let gate = ReactiveCondition::new(levers.iter().cloned(), |down: &bool| *down, ConditionMode::All);
///
/// levers[0].set(true);
/// assert!(!gate.value());
/// levers[1].set(true);
/// assert!(gate.value());
/// ```
pub struct ReactiveCondition<P: 'static> {
    inner: Arc<ConditionInner<P>>,
}

impl<P: 'static> ReactiveCondition<P> {
    /// Build a condition over a fixed set of sources.
    pub fn new<I, S, F>(sources: I, predicate: F, mode: ConditionMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ReadOnlyRx<P> + 'static,
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        let inner = Arc::new_cyclic(|weak: &Weak<ConditionInner<P>>| {
            let mut wrappers = Vec::new();
            let mut results: SmallVec<[bool; 8]> = SmallVec::new();

            for (index, source) in sources.into_iter().enumerate() {
                let wrapper = ReactiveFieldWrapper::new(source);
                results.push(predicate(&wrapper.value()));

                let weak = weak.clone();
                wrapper.subscribe(move |source: &WrappedSource<P>| {
                    if let Some(inner) = weak.upgrade() {
                        inner.on_source_changed(index, source);
                    }
                });
                wrappers.push(wrapper);
            }

            let is_met = ReactiveField::new(mode.aggregate(results.iter().copied()));

            ConditionInner {
                predicate: Box::new(predicate),
                mode,
                sources: wrappers,
                results: RwLock::new(results),
                is_met,
            }
        });

        debug!(
            sources = inner.sources.len(),
            %mode,
            value = inner.is_met.get(),
            "reactive condition created"
        );

        Self { inner }
    }

    /// Build a condition from a raw mode discriminant (1 = all, 2 = any).
    ///
    /// Fails before touching any source if the discriminant is unknown.
    pub fn from_raw_mode<I, S, F>(sources: I, predicate: F, raw_mode: u8) -> Result<Self, RxError>
    where
        I: IntoIterator<Item = S>,
        S: ReadOnlyRx<P> + 'static,
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        let mode = ConditionMode::try_from(raw_mode)?;
        Ok(Self::new(sources, predicate, mode))
    }

    /// Whether the condition is currently met.
    pub fn value(&self) -> bool {
        self.inner.is_met.get()
    }

    /// Register a listener called when the condition flips.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&bool) + Send + Sync + 'static,
    {
        self.inner.is_met.subscribe(listener)
    }

    /// Remove a listener. Removing an unknown id is a no-op returning `false`.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.is_met.unsubscribe(id)
    }

    /// Call every listener with the current value.
    pub fn force_invoke(&self) {
        self.inner.is_met.force_invoke();
    }

    /// The aggregation mode.
    pub fn mode(&self) -> ConditionMode {
        self.inner.mode
    }

    /// Number of sources.
    pub fn source_count(&self) -> usize {
        self.inner.sources.len()
    }

    /// Cached predicate result of the source at `index`.
    pub fn source_result(&self, index: usize) -> Option<bool> {
        self.inner.results.read().get(index).copied()
    }

    /// Get the number of listeners.
    pub fn subscriber_count(&self) -> usize {
        self.inner.is_met.subscriber_count()
    }
}

impl<P: 'static> ReadOnlyRx<bool> for ReactiveCondition<P> {
    fn value(&self) -> bool {
        self.inner.is_met.get()
    }

    fn add_listener(&self, listener: Listener<bool>) -> SubscriptionId {
        self.inner.is_met.add_listener(listener)
    }

    fn remove_listener(&self, id: SubscriptionId) -> bool {
        self.inner.is_met.remove_listener(id)
    }
}

impl<P: 'static> Clone for ReactiveCondition<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: 'static> fmt::Debug for ReactiveCondition<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveCondition")
            .field("mode", &self.inner.mode)
            .field("value", &self.value())
            .field("results", &*self.inner.results.read())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
