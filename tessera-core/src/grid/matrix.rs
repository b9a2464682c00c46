//! Fixed-size grid with cell change notification.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use super::coord::Vec2Int;
use super::factory::{CellFactory, GridShape};
use crate::error::GridError;
use crate::reactive::subscriber::{Listeners, SubscriptionId};

/// A `width x height` grid of cells of type `C`.
///
/// Invalid coordinates never fail: writes to them are ignored and reads
/// return `C::default()`.
///
/// Traversal order is x outer, y inner: `(0,0), (0,1), .., (1,0), ..`. The
/// same order is used for factory calls, [`iter`](Self::iter) and
/// [`cells`](Self::cells).
pub struct Grid<C> {
    shape: GridShape,

    /// Cells in traversal order.
    cells: Vec<C>,

    /// Listeners for cell changes, called with the coordinate and new value.
    listeners: Listeners<dyn Fn(Vec2Int, &C) + Send + Sync>,
}

impl<C: Default> Grid<C> {
    /// Create a grid with every cell set to `C::default()`.
    pub fn new(size: Vec2Int) -> Result<Self, GridError> {
        Self::with_cell_factory(size, |_: &GridShape, _: Vec2Int| C::default())
    }
}

impl<C> Grid<C> {
    /// Create a grid whose cells are produced by `factory`.
    ///
    /// The factory is called once per coordinate, in traversal order.
    pub fn with_factory<F>(size: Vec2Int, factory: F) -> Result<Self, GridError>
    where
        F: FnMut(&GridShape, Vec2Int) -> C,
    {
        Self::with_cell_factory(size, factory)
    }

    /// Create a grid whose cells are produced by a [`CellFactory`].
    pub fn with_cell_factory<F>(size: Vec2Int, mut factory: F) -> Result<Self, GridError>
    where
        F: CellFactory<C>,
    {
        let shape = GridShape::new(size)?;
        let cells = shape
            .coordinates()
            .map(|coord| factory.create(&shape, coord))
            .collect();

        debug!(width = size.x, height = size.y, "grid created");

        Ok(Self {
            shape,
            cells,
            listeners: Listeners::new(),
        })
    }

    pub fn shape(&self) -> &GridShape {
        &self.shape
    }

    pub fn size(&self) -> Vec2Int {
        self.shape.size()
    }

    pub fn width(&self) -> i32 {
        self.shape.width()
    }

    pub fn height(&self) -> i32 {
        self.shape.height()
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `coord` lies inside the grid.
    pub fn is_valid_coordinate(&self, coord: Vec2Int) -> bool {
        self.shape.is_valid_coordinate(coord)
    }

    /// The cell at `coord`, if valid.
    pub fn cell(&self, coord: Vec2Int) -> Option<&C> {
        self.shape.index(coord).map(|index| &self.cells[index])
    }

    /// All cells in traversal order.
    pub fn cells(&self) -> &[C] {
        &self.cells
    }

    /// Store `value` at `coord` and notify listeners.
    ///
    /// Out-of-bounds writes are ignored and return `false`; nothing is
    /// stored and no listener runs. A valid write always notifies, even if
    /// the new value equals the old one.
    pub fn set_cell(&mut self, coord: Vec2Int, value: C) -> bool {
        let Some(index) = self.shape.index(coord) else {
            trace!(x = coord.x, y = coord.y, "ignored out-of-bounds cell write");
            return false;
        };

        self.cells[index] = value;
        self.notify(coord, index);
        true
    }

    /// Re-notify listeners with the current value at `coord`, without
    /// changing it. Returns `false` (and notifies nobody) for an invalid
    /// coordinate.
    pub fn set_dirty_cell(&self, coord: Vec2Int) -> bool {
        match self.shape.index(coord) {
            Some(index) => {
                self.notify(coord, index);
                true
            }
            None => false,
        }
    }

    /// Every `(coordinate, cell)` pair in traversal order.
    pub fn iter(&self) -> impl Iterator<Item = (Vec2Int, &C)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, cell)| (self.shape.coordinate(index), cell))
    }

    /// Visit every cell in traversal order.
    pub fn traverse_cells<F>(&self, mut visit: F)
    where
        F: FnMut(Vec2Int, &C),
    {
        for (coord, cell) in self.iter() {
            visit(coord, cell);
        }
    }

    /// Visit cells in traversal order until `visit` returns `false`.
    ///
    /// Returns `true` if every cell was visited.
    pub fn try_traverse_cells<F>(&self, mut visit: F) -> bool
    where
        F: FnMut(Vec2Int, &C) -> bool,
    {
        for (coord, cell) in self.iter() {
            if !visit(coord, cell) {
                return false;
            }
        }
        true
    }

    /// Register a listener for cell changes.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(Vec2Int, &C) + Send + Sync + 'static,
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

    fn notify(&self, coord: Vec2Int, index: usize) {
        let cell = &self.cells[index];
        let notified = self.listeners.emit(|listener| listener(coord, cell));
        trace!(x = coord.x, y = coord.y, listeners = notified, "grid cell changed");
    }
}

impl<C: Clone + Default> Grid<C> {
    /// A copy of the cell at `coord`, or `C::default()` if out of bounds.
    pub fn get_cell(&self, coord: Vec2Int) -> C {
        self.cell(coord).cloned().unwrap_or_default()
    }
}

impl<C: fmt::Debug> fmt::Debug for Grid<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("size", &self.size())
            .field("cells", &self.cells)
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
