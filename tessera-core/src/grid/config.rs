//! World grid configuration.
//!
//! Level data usually describes grids as plain data. `GridWorldConfig` is
//! that description, parsed from JSON:
//!
//! ```json
//! { "size": { "x": 16, "y": 9 }, "cell_size": 1.0, "anchor": { "x": 0.0, "y": 0.0, "z": 0.0 } }
//! ```
//!
//! `anchor` may be omitted and defaults to the origin.

use serde::{Deserialize, Serialize};

use super::coord::{Vec2Int, Vec3};
use super::factory::GridShape;
use super::world::{validate_anchor, validate_cell_size};
use crate::error::GridError;

/// Construction parameters of a [`GridWorldPosition`](super::GridWorldPosition).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridWorldConfig {
    /// Width and height in cells.
    pub size: Vec2Int,
    /// Edge length of one cell in world units.
    pub cell_size: f32,
    /// World position of the minimum corner of cell `(0, 0)`.
    #[serde(default)]
    pub anchor: Vec3,
}

impl GridWorldConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, GridError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the size, cell size and anchor without building a grid.
    pub fn validate(&self) -> Result<(), GridError> {
        GridShape::new(self.size)?;
        validate_cell_size(self.cell_size)?;
        validate_anchor(self.anchor)?;
        Ok(())
    }
}
