//! Dense occupancy grid for neighbor queries.
//!
//! The playfield is discretized into unit cells. Each cell remembers the id of
//! the boid currently standing in it, or nothing. A neighbor query then only
//! has to walk the cells inside a square window instead of testing every boid
//! in the flock.
//!
//! The grid does no locking of its own. It lives inside [`Flock`], and the
//! flock's lock covers every read and write.
//!
//! [`Flock`]: crate::Flock

use crate::boid::BoidId;
use crate::vector::Vector2D;

/// Integer cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    #[inline]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Grid of `(width + 1) × (height + 1)` cells mapping to an occupant id.
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    width: usize,
    height: usize,
    cells: Vec<Option<BoidId>>,
}

impl SpatialGrid {
    /// Create an empty grid covering `[0, width] × [0, height]`.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; (width + 1) * (height + 1)],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    fn index(&self, cell: Cell) -> usize {
        debug_assert!(cell.x <= self.width && cell.y <= self.height, "cell {:?} outside grid", cell);
        cell.x * (self.height + 1) + cell.y
    }

    /// Overwrite the occupant of `cell`.
    #[inline]
    pub fn set(&mut self, cell: Cell, id: BoidId) {
        let idx = self.index(cell);
        self.cells[idx] = Some(id);
    }

    /// Occupant of `cell`, if any.
    #[inline]
    pub fn get(&self, cell: Cell) -> Option<BoidId> {
        self.cells[self.index(cell)]
    }

    /// Mark `cell` empty.
    #[inline]
    pub fn clear(&mut self, cell: Cell) {
        let idx = self.index(cell);
        self.cells[idx] = None;
    }

    /// Mark `cell` empty only if `id` still occupies it.
    ///
    /// Returns whether the cell was cleared.
    #[inline]
    pub fn clear_if(&mut self, cell: Cell, id: BoidId) -> bool {
        let idx = self.index(cell);
        if self.cells[idx] == Some(id) {
            self.cells[idx] = None;
            true
        } else {
            false
        }
    }

    /// Cell containing `position`.
    ///
    /// Coordinates are truncated toward zero and then clamped onto the grid,
    /// so a position that overshot a wall by less than a tick still maps to a
    /// valid edge cell.
    #[inline]
    pub fn cell_of(&self, position: Vector2D) -> Cell {
        Cell::new(
            (position.x as i64).clamp(0, self.width as i64) as usize,
            (position.y as i64).clamp(0, self.height as i64) as usize,
        )
    }

    /// Cells inside the square window of half-width `radius` around `center`,
    /// clamped to the grid.
    ///
    /// The window is walked with a floating-point cursor that starts at the
    /// clamped lower corner and advances one unit at a time, each step
    /// truncated to a cell. A fractional lower corner therefore shifts which
    /// cells are visited at the far edge.
    pub fn window(&self, center: Vector2D, radius: f64) -> impl Iterator<Item = Cell> {
        let lower = center.add_scalar(-radius);
        let upper = center.add_scalar(radius);
        let (x_start, x_end) = (lower.x.max(0.0), upper.x.min(self.width as f64));
        let (y_start, y_end) = (lower.y.max(0.0), upper.y.min(self.height as f64));

        unit_steps(x_start, x_end).flat_map(move |i| {
            unit_steps(y_start, y_end).map(move |j| Cell::new(i as usize, j as usize))
        })
    }

    /// Every occupied cell with its occupant.
    pub fn occupied(&self) -> impl Iterator<Item = (Cell, BoidId)> + '_ {
        let rows = self.height + 1;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(idx, slot)| slot.map(|id| (Cell::new(idx / rows, idx % rows), id)))
    }
}

fn unit_steps(start: f64, end: f64) -> impl Iterator<Item = f64> {
    std::iter::successors(Some(start), |v| Some(v + 1.0)).take_while(move |v| *v <= end)
}
