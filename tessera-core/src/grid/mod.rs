//! Rectangular Grids
//!
//! A [`Grid`] is a fixed-size rectangle of cells addressed by [`Vec2Int`]
//! coordinates. Cells are produced once at construction by a
//! [`CellFactory`], then read and replaced through bounds-checked accessors.
//! Writes notify subscribers with the coordinate and the new value.
//!
//! # How Traversal Works
//!
//! 1. Cells are stored x-major: every `y` of column 0, then column 1, ...
//! 2. [`Grid::traverse_cells`] and [`Grid::iter`] walk storage in order
//! 3. [`Grid::try_traverse_cells`] stops at the first callback that returns
//!    `false`
//!
//! [`GridWorldPosition`] places a grid in world space with a cell size and
//! an anchor, and maps between world positions and coordinates.

mod config;
mod coord;
mod factory;
mod matrix;
mod world;

pub use config::GridWorldConfig;
pub use coord::{Vec2Int, Vec3};
pub use factory::{CellFactory, GridShape};
pub use matrix::Grid;
pub use world::GridWorldPosition;
