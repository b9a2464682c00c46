//! Source-identifying wrapper around an observable.
//!
//! A plain listener on a [`ReactiveField`] only sees the new value. When one
//! callback watches many sources it also needs to know *which* source fired.
//! [`ReactiveFieldWrapper`] subscribes to exactly one source and re-notifies
//! its own listeners with a reference to its shared core, [`WrappedSource`],
//! which carries a unique [`SourceToken`] next to the value.
//!
//! # Ownership
//!
//! The wrapper keeps a handle to its source, so the source state cannot be
//! dropped while the wrapper is alive. The listener it installs on the source
//! holds only a weak reference back to the wrapper, and it is removed when
//! the wrapper is dropped.
//!
//! A listener on the source must not hold a strong handle to something that
//! owns a wrapper of that same source, such as a condition built over it.
//! The source would then keep the wrapper alive through its own listener
//! list, and neither is ever freed. Capture a [`Weak`](std::sync::Weak) or
//! unsubscribe explicitly instead.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::trace;

use super::field::ReactiveField;
use super::observable::ReadOnlyRx;
use super::subscriber::{Listeners, SubscriptionId};

/// Identity of a wrapped source, unique for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceToken(u64);

impl SourceToken {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw token value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// The shared core of a [`ReactiveFieldWrapper`], handed to its listeners.
pub struct WrappedSource<T: 'static> {
    token: SourceToken,
    source: Box<dyn ReadOnlyRx<T>>,
    listeners: Listeners<dyn Fn(&WrappedSource<T>) + Send + Sync>,
}

impl<T: 'static> WrappedSource<T> {
    /// Token identifying this source.
    pub fn token(&self) -> SourceToken {
        self.token
    }

    /// Current value of the wrapped source.
    pub fn value(&self) -> T {
        self.source.value()
    }

    /// The wrapped source itself.
    pub fn source(&self) -> &dyn ReadOnlyRx<T> {
        self.source.as_ref()
    }

    fn notify(&self) {
        let notified = self.listeners.emit(|listener| listener(self));
        trace!(source = self.token.0, listeners = notified, "wrapped source notified");
    }
}

impl<T: 'static> fmt::Debug for WrappedSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrappedSource")
            .field("token", &self.token)
            .field("subscriber_count", &self.listeners.len())
            .finish()
    }
}

/// Re-publishes changes of one observable, identifying itself to listeners.
///
/// # Example
///
/// ```rust
/// use tessera_core::reactive::{ReactiveField, ReactiveFieldWrapper};
///
/// let door = ReactiveField::new(false);
/// let wrapper = ReactiveFieldWrapper::new(door.clone());
/// let token = wrapper.token();
///
/// wrapper.subscribe(move |source| {
///     assert_eq!(source.token(), token);
///     assert!(source.value());
/// });
/// door.set(true);
/// ```
pub struct ReactiveFieldWrapper<T: 'static> {
    inner: Arc<WrappedSource<T>>,

    /// Our listener on the source, removed on drop.
    source_subscription: SubscriptionId,
}

impl<T: 'static> ReactiveFieldWrapper<T> {
    /// Wrap `source` and start listening to it.
    pub fn new<S>(source: S) -> Self
    where
        S: ReadOnlyRx<T> + 'static,
    {
        let inner = Arc::new(WrappedSource {
            token: SourceToken::next(),
            source: Box::new(source),
            listeners: Listeners::new(),
        });

        let weak = Arc::downgrade(&inner);
        let source_subscription = inner.source.add_listener(Arc::new(move |_: &T| {
            if let Some(inner) = weak.upgrade() {
                inner.notify();
            }
        }));

        Self {
            inner,
            source_subscription,
        }
    }

    /// Token identifying the wrapped source in notifications.
    pub fn token(&self) -> SourceToken {
        self.inner.token
    }

    /// Current value of the wrapped source.
    pub fn value(&self) -> T {
        self.inner.value()
    }

    /// The wrapped source itself.
    pub fn source(&self) -> &dyn ReadOnlyRx<T> {
        self.inner.source()
    }

    /// Register a listener called with the wrapper core on every source change.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&WrappedSource<T>) + Send + Sync + 'static,
    {
        self.inner.listeners.add(Arc::new(listener))
    }

    /// Remove a listener. Removing an unknown id is a no-op returning `false`.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.listeners.remove(id)
    }

    /// Get the number of listeners on this wrapper (not on the source).
    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.len()
    }
}

impl<T> Default for ReactiveFieldWrapper<T>
where
    T: Clone + PartialEq + Default + Send + Sync + 'static,
{
    /// Wrap a fresh field holding `T::default()`.
    fn default() -> Self {
        Self::new(ReactiveField::<T>::default())
    }
}

impl<T: 'static> Drop for ReactiveFieldWrapper<T> {
    fn drop(&mut self) {
        self.inner.source.remove_listener(self.source_subscription);
    }
}

impl<T: 'static> fmt::Debug for ReactiveFieldWrapper<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveFieldWrapper")
            .field("token", &self.inner.token)
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
