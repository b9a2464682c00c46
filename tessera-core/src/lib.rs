//! Tessera Core
//!
//! This crate provides the gameplay-agnostic building blocks of the Tessera
//! toolkit. It implements:
//!
//! - Reactive primitives (fields, source wrappers, aggregate conditions)
//! - Fixed-size grids with cell change notification
//! - World-space placement of grids
//!
//! Everything runs synchronously on the caller's thread: setting a value
//! notifies its listeners before `set` returns.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: Observable fields, wrappers and conditions
//! - `grid`: Grids, cell factories and world-position mapping
//! - `error`: Construction errors
//!
//! # Example
//!
//! ```rust
//! use tessera_core::grid::{Grid, Vec2Int};
//! use tessera_core::reactive::{ConditionMode, ReactiveCondition, ReactiveField};
//!
//! // One field per pressure plate
//! let plates: Vec<ReactiveField<bool>> = (0..3).map(|_| ReactiveField::new(false)).collect();
//!
//! // The door opens once every plate is pressed
//! let door = ReactiveCondition::new(plates.clone(), |pressed: &bool| *pressed, ConditionMode::All);
//!
//! // Plates live on a grid; writing a cell presses the matching plate
//! let mut floor: Grid<bool> = Grid::new(Vec2Int::new(3, 1)).unwrap();
//! let wired = plates.clone();
//! floor.subscribe(move |coord: Vec2Int, pressed: &bool| {
//!     wired[coord.x as usize].set(*pressed);
//! });
//!
//! for x in 0..3 {
//!     floor.set_cell(Vec2Int::new(x, 0), true);
//! }
//! assert!(door.value());
//! ```

pub mod error;
pub mod grid;
pub mod reactive;

pub use error::{GridError, RxError};
