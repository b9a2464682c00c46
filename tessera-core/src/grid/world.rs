//! A grid placed in world space.
//!
//! Cell `(x, y)` covers the square whose minimum corner is
//! `anchor + (x, y, 0) * cell_size`. World positions map back to cells by
//! flooring, so points left of or below the anchor land on negative
//! coordinates rather than collapsing onto row or column zero. A position
//! with a NaN or infinite component maps to `i32::MIN` on that axis, which no
//! grid contains.

use tracing::debug;

use super::config::GridWorldConfig;
use super::coord::{Vec2Int, Vec3};
use super::factory::{CellFactory, GridShape};
use super::matrix::Grid;
use crate::error::GridError;

/// A [`Grid`] with a cell size and a world-space anchor.
///
/// Coordinate-based operations live on the inner grid (see
/// [`grid`](Self::grid) and [`grid_mut`](Self::grid_mut)); this type adds the
/// world-position mapping and world-position overloads of the cell accessors.
#[derive(Debug)]
pub struct GridWorldPosition<C> {
    grid: Grid<C>,
    cell_size: f32,
    anchor: Vec3,
}

pub(crate) fn validate_cell_size(cell_size: f32) -> Result<f32, GridError> {
    if cell_size.is_finite() && cell_size > 0.0 {
        Ok(cell_size)
    } else {
        Err(GridError::InvalidCellSize(cell_size))
    }
}

pub(crate) fn validate_anchor(anchor: Vec3) -> Result<Vec3, GridError> {
    if anchor.x.is_finite() && anchor.y.is_finite() && anchor.z.is_finite() {
        Ok(anchor)
    } else {
        Err(GridError::InvalidAnchor(anchor))
    }
}

/// Cell index along one axis. Non-finite quotients land outside every grid.
fn axis_cell(offset: f32, cell_size: f32) -> i32 {
    let cells = (offset / cell_size).floor();
    if cells.is_finite() {
        cells as i32
    } else {
        i32::MIN
    }
}

impl<C: Default> GridWorldPosition<C> {
    /// Create a world grid with every cell set to `C::default()`.
    pub fn new(cell_size: f32, anchor: Vec3, size: Vec2Int) -> Result<Self, GridError> {
        Self::with_cell_factory(cell_size, anchor, size, |_: &GridShape, _: Vec2Int| C::default())
    }

    /// Create a world grid from a validated configuration.
    pub fn from_config(config: &GridWorldConfig) -> Result<Self, GridError> {
        Self::new(config.cell_size, config.anchor, config.size)
    }
}

impl<C> GridWorldPosition<C> {
    /// Create a world grid whose cells are produced by `factory`.
    pub fn with_factory<F>(
        cell_size: f32,
        anchor: Vec3,
        size: Vec2Int,
        factory: F,
    ) -> Result<Self, GridError>
    where
        F: FnMut(&GridShape, Vec2Int) -> C,
    {
        Self::with_cell_factory(cell_size, anchor, size, factory)
    }

    /// Create a world grid whose cells are produced by a [`CellFactory`].
    pub fn with_cell_factory<F>(
        cell_size: f32,
        anchor: Vec3,
        size: Vec2Int,
        factory: F,
    ) -> Result<Self, GridError>
    where
        F: CellFactory<C>,
    {
        let cell_size = validate_cell_size(cell_size)?;
        let anchor = validate_anchor(anchor)?;
        let grid = Grid::with_cell_factory(size, factory)?;

        debug!(
            cell_size,
            anchor_x = anchor.x,
            anchor_y = anchor.y,
            anchor_z = anchor.z,
            "world grid created"
        );

        Ok(Self {
            grid,
            cell_size,
            anchor,
        })
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    pub fn grid(&self) -> &Grid<C> {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid<C> {
        &mut self.grid
    }

    pub fn into_grid(self) -> Grid<C> {
        self.grid
    }

    /// World position of the minimum corner of `coord`.
    ///
    /// Defined for any coordinate, including ones outside the grid.
    pub fn cell_world_position(&self, coord: Vec2Int) -> Vec3 {
        self.anchor + Vec3::from(coord) * self.cell_size
    }

    /// Cell containing `position`, flooring each axis. `z` is ignored.
    ///
    /// The result may lie outside the grid. Non-finite axes map to
    /// `i32::MIN`, so the world accessors treat them as out of bounds.
    pub fn cell_coordinate(&self, position: Vec3) -> Vec2Int {
        let local = position - self.anchor;
        Vec2Int::new(
            axis_cell(local.x, self.cell_size),
            axis_cell(local.y, self.cell_size),
        )
    }

    /// Store `value` in the cell containing `position`.
    ///
    /// Same semantics as [`Grid::set_cell`].
    pub fn set_cell_at(&mut self, position: Vec3, value: C) -> bool {
        let coord = self.cell_coordinate(position);
        self.grid.set_cell(coord, value)
    }

    /// The cell containing `position`, if it lies inside the grid.
    pub fn cell_at(&self, position: Vec3) -> Option<&C> {
        self.grid.cell(self.cell_coordinate(position))
    }
}

impl<C: Clone + Default> GridWorldPosition<C> {
    /// A copy of the cell containing `position`, or `C::default()`.
    pub fn get_cell_at(&self, position: Vec3) -> C {
        self.grid.get_cell(self.cell_coordinate(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn world_position_round_trips() {
        let world: GridWorldPosition<i32> =
            GridWorldPosition::new(2.0, Vec3::ZERO, Vec2Int::new(10, 10)).unwrap();

        let position = world.cell_world_position(Vec2Int::new(3, 4));
        assert_eq!(position, Vec3::new(6.0, 8.0, 0.0));
        assert_eq!(world.cell_coordinate(position), Vec2Int::new(3, 4));
    }

    #[test]
    fn negative_positions_floor_instead_of_truncating() {
        let world: GridWorldPosition<i32> =
            GridWorldPosition::new(2.0, Vec3::ZERO, Vec2Int::new(4, 4)).unwrap();

        assert_eq!(world.cell_coordinate(Vec3::new(-0.5, -0.5, 0.0)), Vec2Int::new(-1, -1));
        assert_eq!(world.cell_coordinate(Vec3::new(-2.0, 3.9, 0.0)), Vec2Int::new(-1, 1));
    }

    #[test]
    fn anchor_offsets_the_mapping() {
        let anchor = Vec3::new(10.0, -4.0, 1.5);
        let world: GridWorldPosition<i32> =
            GridWorldPosition::new(0.5, anchor, Vec2Int::new(4, 4)).unwrap();

        assert_eq!(world.cell_world_position(Vec2Int::ZERO), anchor);
        assert_eq!(world.cell_world_position(Vec2Int::new(2, 1)), Vec3::new(11.0, -3.5, 1.5));
        assert_eq!(world.cell_coordinate(Vec3::new(10.74, -3.01, 99.0)), Vec2Int::new(1, 1));
        assert_eq!(world.cell_coordinate(Vec3::new(9.9, -4.0, 0.0)), Vec2Int::new(-1, 0));
    }

    #[test]
    fn every_point_inside_a_cell_maps_back_to_it() {
        let world: GridWorldPosition<u8> =
            GridWorldPosition::new(1.5, Vec3::new(-3.0, 2.0, 0.0), Vec2Int::new(5, 5)).unwrap();

        for coord in world.grid().shape().coordinates() {
            let corner = world.cell_world_position(coord);
            for (dx, dy) in [(0.0, 0.0), (0.7, 0.2), (1.4, 1.4)] {
                let inside = corner + Vec3::new(dx, dy, 0.0);
                assert_eq!(world.cell_coordinate(inside), coord, "point {inside:?}");
            }
        }
    }

    #[test]
    fn world_overloads_delegate_to_bounds_checked_grid() {
        let mut world: GridWorldPosition<char> =
            GridWorldPosition::new(1.0, Vec3::ZERO, Vec2Int::new(3, 3)).unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        world
            .grid()
            .subscribe(move |coord, value: &char| sink.lock().push((coord, *value)));

        assert!(world.set_cell_at(Vec3::new(2.5, 0.1, 0.0), 'x'));
        assert!(!world.set_cell_at(Vec3::new(-0.1, 0.0, 0.0), 'y'));

        assert_eq!(world.get_cell_at(Vec3::new(2.9, 0.9, 5.0)), 'x');
        assert_eq!(world.get_cell_at(Vec3::new(-0.1, 0.0, 0.0)), char::default());
        assert_eq!(world.cell_at(Vec3::new(3.0, 0.0, 0.0)), None);
        assert_eq!(*log.lock(), vec![(Vec2Int::new(2, 0), 'x')]);
    }

    #[test]
    fn factory_sees_grid_shape() {
        let world = GridWorldPosition::with_factory(
            1.0,
            Vec3::ZERO,
            Vec2Int::new(2, 3),
            |shape, coord| shape.len() as i32 * 100 + coord.x * 10 + coord.y,
        )
        .unwrap();

        assert_eq!(world.grid().get_cell(Vec2Int::new(1, 2)), 612);
        assert_eq!(world.into_grid().len(), 6);
    }

    #[test]
    fn invalid_cell_size_is_rejected() {
        for size in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let result = GridWorldPosition::<i32>::new(size, Vec3::ZERO, Vec2Int::new(2, 2));
            assert!(matches!(result, Err(GridError::InvalidCellSize(_))));
        }
        let result = GridWorldPosition::<i32>::new(1.0, Vec3::ZERO, Vec2Int::new(2, 0));
        assert!(matches!(result, Err(GridError::InvalidSize(_))));
    }

    #[test]
    fn non_finite_anchor_is_rejected() {
        for anchor in [
            Vec3::new(f32::NAN, 0.0, 0.0),
            Vec3::new(0.0, f32::INFINITY, 0.0),
            Vec3::new(0.0, 0.0, f32::NEG_INFINITY),
        ] {
            let result = GridWorldPosition::<i32>::new(1.0, anchor, Vec2Int::new(2, 2));
            assert!(matches!(result, Err(GridError::InvalidAnchor(_))));
        }
    }

    #[test]
    fn non_finite_positions_are_out_of_bounds() {
        let mut world: GridWorldPosition<i32> =
            GridWorldPosition::new(1.0, Vec3::ZERO, Vec2Int::new(4, 4)).unwrap();
        let writes = Arc::new(Mutex::new(0));
        let sink = writes.clone();
        world.grid().subscribe(move |_, _: &i32| *sink.lock() += 1);

        for position in [
            Vec3::new(f32::NAN, f32::NAN, 0.0),
            Vec3::new(f32::NAN, 1.0, 0.0),
            Vec3::new(1.0, f32::INFINITY, 0.0),
            Vec3::new(f32::NEG_INFINITY, 0.5, 0.0),
        ] {
            let coord = world.cell_coordinate(position);
            assert!(!world.grid().is_valid_coordinate(coord), "{position:?} -> {coord}");
            assert!(!world.set_cell_at(position, 7));
            assert_eq!(world.cell_at(position), None);
            assert_eq!(world.get_cell_at(position), 0);
        }

        assert_eq!(world.cell_coordinate(Vec3::new(f32::NAN, 2.5, 0.0)), Vec2Int::new(i32::MIN, 2));
        assert!(world.grid().cells().iter().all(|cell| *cell == 0));
        assert_eq!(*writes.lock(), 0);
    }
}
