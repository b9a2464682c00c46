//! Reactive Primitives
//!
//! This module implements push-based reactive values: fields that notify on
//! change, wrappers that identify which source fired, and conditions that
//! aggregate many sources into one boolean.
//!
//! # Concepts
//!
//! ## Fields
//!
//! A [`ReactiveField`] holds a value and a list of listeners. Assigning a
//! different value notifies every listener synchronously, in subscription
//! order. Assigning an equal value does nothing.
//!
//! ## Wrappers
//!
//! A [`ReactiveFieldWrapper`] listens to one source and re-notifies its own
//! listeners with a [`WrappedSource`] carrying a [`SourceToken`], so a single
//! callback observing many sources can tell them apart.
//!
//! ## Conditions
//!
//! A [`ReactiveCondition`] evaluates a predicate on every source and combines
//! the results with [`ConditionMode::All`] or [`ConditionMode::Any`]. Results
//! are cached per source: a change that does not flip its source's result
//! stops there.
//!
//! # Implementation Notes
//!
//! There is no scheduler and no batching. All propagation happens on the
//! caller's stack, inside the `set` that caused it. Every observable exposes
//! the same read-only surface, [`ReadOnlyRx`], which is also what conditions
//! accept as sources (a condition is itself a `ReadOnlyRx<bool>`).

mod condition;
mod field;
mod observable;
pub(crate) mod subscriber;
mod wrapper;

pub use condition::{ConditionMode, ReactiveCondition};
pub use field::ReactiveField;
pub use observable::{Listener, ReadOnlyRx};
pub use subscriber::SubscriptionId;
pub use wrapper::{ReactiveFieldWrapper, SourceToken, WrappedSource};
