//! The read-only observable seam.
//!
//! [`ReadOnlyRx`] is what aggregating components depend on: something that
//! has a current value and can be listened to. It deliberately exposes no
//! setter, so a component handed a `ReadOnlyRx` can observe a source but
//! never drive it.

use std::sync::Arc;

use super::subscriber::SubscriptionId;

/// A listener callback receiving the new value of an observable.
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A value that can be read and observed, but not written.
///
/// Implementations must notify listeners synchronously, in subscription
/// order, each time the observable's value changes (and on any explicit
/// forced re-notification the implementation offers).
pub trait ReadOnlyRx<T>: Send + Sync {
    /// Current value.
    fn value(&self) -> T;

    /// Register a listener. The returned id removes it again.
    fn add_listener(&self, listener: Listener<T>) -> SubscriptionId;

    /// Remove a listener. Returns `false` if the id is not registered here.
    fn remove_listener(&self, id: SubscriptionId) -> bool;

    /// Register a closure as a listener.
    fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
        Self: Sized,
    {
        self.add_listener(Arc::new(listener))
    }

    /// Alias of [`remove_listener`](ReadOnlyRx::remove_listener).
    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.remove_listener(id)
    }
}

impl<T> ReadOnlyRx<T> for Box<dyn ReadOnlyRx<T>> {
    fn value(&self) -> T {
        (**self).value()
    }

    fn add_listener(&self, listener: Listener<T>) -> SubscriptionId {
        (**self).add_listener(listener)
    }

    fn remove_listener(&self, id: SubscriptionId) -> bool {
        (**self).remove_listener(id)
    }
}

impl<T, R> ReadOnlyRx<T> for Arc<R>
where
    R: ReadOnlyRx<T> + ?Sized,
{
    fn value(&self) -> T {
        (**self).value()
    }

    fn add_listener(&self, listener: Listener<T>) -> SubscriptionId {
        (**self).add_listener(listener)
    }

    fn remove_listener(&self, id: SubscriptionId) -> bool {
        (**self).remove_listener(id)
    }
}
