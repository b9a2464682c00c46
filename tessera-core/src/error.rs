//! Error types.
//!
//! Almost every operation in this crate is total: out-of-range coordinates
//! degrade to no-ops or default values instead of failing. Errors only arise
//! while constructing something from invalid arguments.

use thiserror::Error;

use crate::grid::{Vec2Int, Vec3};

/// Errors raised by the reactive primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RxError {
    /// A raw discriminant did not match any [`ConditionMode`](crate::reactive::ConditionMode).
    #[error("unknown condition mode discriminant {0} (expected 1 = all, 2 = any)")]
    UnknownConditionMode(u8),

    /// A textual mode name did not match any condition mode.
    #[error("unknown condition mode {0:?} (expected \"all\" or \"any\")")]
    UnknownConditionModeName(String),
}

/// Errors raised while building a grid.
#[derive(Debug, Error)]
pub enum GridError {
    /// Width and height must both be strictly positive.
    #[error("invalid grid size {0}: width and height must be positive")]
    InvalidSize(Vec2Int),

    /// Cell size must be finite and strictly positive.
    #[error("invalid cell size {0}: must be finite and greater than zero")]
    InvalidCellSize(f32),

    /// Every anchor component must be finite.
    #[error("invalid anchor {0:?}: components must be finite")]
    InvalidAnchor(Vec3),

    /// The grid configuration could not be parsed.
    #[error("invalid grid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
