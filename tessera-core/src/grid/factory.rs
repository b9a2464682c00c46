//! Grid extent and cell factories.

use super::coord::Vec2Int;
use crate::error::GridError;

/// The validated extent of a grid.
///
/// This is what a [`CellFactory`] sees of the grid under construction: the
/// size and the coordinate rules, but none of the cells, so a factory can
/// never observe a half-built grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridShape {
    size: Vec2Int,
}

impl GridShape {
    /// Validate a width/height pair. Both must be strictly positive.
    pub fn new(size: Vec2Int) -> Result<Self, GridError> {
        if size.x <= 0 || size.y <= 0 {
            return Err(GridError::InvalidSize(size));
        }
        Ok(Self { size })
    }

    pub fn size(&self) -> Vec2Int {
        self.size
    }

    pub fn width(&self) -> i32 {
        self.size.x
    }

    pub fn height(&self) -> i32 {
        self.size.y
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.size.x as usize * self.size.y as usize
    }

    /// A validated shape always has at least one cell.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `coord` lies inside `[0, width) x [0, height)`.
    pub fn is_valid_coordinate(&self, coord: Vec2Int) -> bool {
        coord.x >= 0 && coord.y >= 0 && coord.x < self.size.x && coord.y < self.size.y
    }

    /// Storage index of `coord`, x-major so that storage order equals
    /// traversal order.
    pub(crate) fn index(&self, coord: Vec2Int) -> Option<usize> {
        self.is_valid_coordinate(coord)
            .then(|| coord.x as usize * self.size.y as usize + coord.y as usize)
    }

    /// Coordinate stored at `index`. Inverse of [`index`](Self::index).
    pub(crate) fn coordinate(&self, index: usize) -> Vec2Int {
        let height = self.size.y as usize;
        Vec2Int::new((index / height) as i32, (index % height) as i32)
    }

    /// Every coordinate in traversal order: x outer, y inner.
    pub fn coordinates(&self) -> impl Iterator<Item = Vec2Int> {
        let height = self.size.y;
        (0..self.size.x).flat_map(move |x| (0..height).map(move |y| Vec2Int::new(x, y)))
    }
}

/// Produces the initial value of each cell.
///
/// Called once per coordinate, in traversal order, while the grid is being
/// built. Any `FnMut(&GridShape, Vec2Int) -> C` closure is a factory.
pub trait CellFactory<C> {
    fn create(&mut self, shape: &GridShape, coord: Vec2Int) -> C;
}

impl<C, F> CellFactory<C> for F
where
    F: FnMut(&GridShape, Vec2Int) -> C,
{
    fn create(&mut self, shape: &GridShape, coord: Vec2Int) -> C {
        self(shape, coord)
    }
}
