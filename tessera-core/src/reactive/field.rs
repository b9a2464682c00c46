//! Reactive Field
//!
//! A `ReactiveField` is the leaf reactive primitive: a mutable cell that
//! notifies its listeners whenever its value changes.
//!
//! # How Fields Work
//!
//! 1. Listeners subscribe with a closure and get back a [`SubscriptionId`].
//!
//! 2. `set` compares the new value against the stored one. Equal values are
//!    ignored; anything else is stored and every listener is called with the
//!    new value, synchronously, in subscription order.
//!
//! 3. `force_invoke` re-delivers the current value without touching it,
//!    which is how late subscribers catch up.
//!
//! # Reentrancy
//!
//! Listeners run after the value lock is released, against a snapshot of the
//! listener list (see [`subscriber`](super::subscriber)). A listener may call
//! `set` on the field notifying it; that starts a nested, complete
//! notification round with the newer value before the outer round resumes,
//! so later listeners of the outer round observe the older value last.
//!
//! # Memory Layout
//!
//! Each field consists of:
//! - A unique ID (8 bytes)
//! - The value, behind `Arc<RwLock<_>>`
//! - The listener registry, behind `Arc`

use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::trace;

use super::observable::{Listener, ReadOnlyRx};
use super::subscriber::{Listeners, SubscriptionId};

/// Counter for generating unique field IDs.
static FIELD_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_field_id() -> u64 {
    FIELD_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A mutable value that notifies listeners when it changes.
///
/// Change detection uses `PartialEq`, so a type whose values are never equal
/// to themselves (a float `NaN`) notifies on every `set`.
///
/// Cloning a field yields another handle to the **same** value and listeners.
///
/// # Example
///
/// ```rust
/// use tessera_core::reactive::ReactiveField;
///
/// let health = ReactiveField::new(100);
/// health.subscribe(|hp| println!("health is now {hp}"));
///
/// health.set(80); // prints
/// health.set(80); // equal value, nothing happens
/// ```
pub struct ReactiveField<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Unique identifier for this field.
    id: u64,

    /// The current value.
    value: Arc<RwLock<T>>,

    /// Registered listeners, in subscription order.
    listeners: Arc<Listeners<dyn Fn(&T) + Send + Sync>>,
}

impl<T> ReactiveField<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Create a new field holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            id: next_field_id(),
            value: Arc::new(RwLock::new(value)),
            listeners: Arc::new(Listeners::new()),
        }
    }

    /// Get the field's unique ID.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Store `value` and notify listeners, unless it equals the current value.
    ///
    /// Returns `true` when the value changed.
    pub fn set(&self, value: T) -> bool {
        {
            let mut guard = self.value.write();
            if *guard == value {
                return false;
            }
            *guard = value.clone();
        }

        self.notify(&value);
        true
    }

    /// Set the value computed from the current one.
    ///
    /// Same change semantics as [`set`](Self::set). `f` runs on a copy with
    /// no lock held, so it may read or set this field itself.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&T) -> T,
    {
        let current = self.get();
        self.set(f(&current))
    }

    /// Call every listener with the current value, changed or not.
    pub fn force_invoke(&self) {
        let value = self.get();
        self.notify(&value);
    }

    /// Register a listener called with each new value.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.listeners.add(Arc::new(listener))
    }

    /// Remove a listener. Removing an unknown id is a no-op returning `false`.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }

    /// Get the number of listeners.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    fn notify(&self, value: &T) {
        let notified = self.listeners.emit(|listener| listener(value));
        trace!(field = self.id, listeners = notified, "reactive field notified");
    }
}

impl<T> ReadOnlyRx<T> for ReactiveField<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn value(&self) -> T {
        self.get()
    }

    fn add_listener(&self, listener: Listener<T>) -> SubscriptionId {
        self.listeners.add(listener)
    }

    fn remove_listener(&self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }
}

impl<T> Default for ReactiveField<T>
where
    T: Clone + PartialEq + Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Clone for ReactiveField<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            value: Arc::clone(&self.value),
            listeners: Arc::clone(&self.listeners),
        }
    }
}

impl<T> Debug for ReactiveField<T>
where
    T: Clone + PartialEq + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveField")
            .field("id", &self.id)
            .field("value", &*self.value.read())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// Only the value is persisted; listeners are runtime wiring.
impl<T> Serialize for ReactiveField<T>
where
    T: Clone + PartialEq + Send + Sync + Serialize + 'static,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (*self.value.read()).serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for ReactiveField<T>
where
    T: Clone + PartialEq + Send + Sync + Deserialize<'de> + 'static,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Self::new)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
