//! Spatial partitioning of the terrain into coloured cells.
//!
//! [`SpatialGrid`] splits the terrain rectangle into an arena of [`Cell`]s
//! addressed by index. Each cell knows its (up to eight) neighbours by index,
//! carries a colour in `0..8` such that same-coloured cells are never adjacent,
//! and owns the candidate [`Coordinate`]s sampled inside it.
use std::fmt;

use glam::Vec2;
use rand::RngCore;
use tracing::debug;

use crate::error::{Error, Result};

mod budget;
mod index;

use index::CellIndex;

/// Number of colour classes.
pub const COLORS: usize = 8;

/// Canopy/undergrowth budget perturbations are `base / 20` and `base / 40`.
const CANOPY_VARIANCE_DIVISOR: usize = 20;
const UNDERGROWTH_VARIANCE_DIVISOR: usize = 40;

/// Which of the two dependent point sets a value belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PointPass {
    Canopy,
    Undergrowth,
}

impl PointPass {
    /// Both passes in the order they must run.
    pub const ORDERED: [PointPass; 2] = [PointPass::Canopy, PointPass::Undergrowth];
}

impl fmt::Display for PointPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointPass::Canopy => f.write_str("canopy"),
            PointPass::Undergrowth => f.write_str("undergrowth"),
        }
    }
}

/// Position of a neighbour relative to a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    TopLeft,
    Top,
    TopRight,
    Left,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::TopLeft,
        Direction::Top,
        Direction::TopRight,
        Direction::Left,
        Direction::Right,
        Direction::BottomLeft,
        Direction::Bottom,
        Direction::BottomRight,
    ];

    /// `(row, col)` offset of the neighbour.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::TopLeft => (-1, -1),
            Direction::Top => (-1, 0),
            Direction::TopRight => (-1, 1),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
            Direction::BottomLeft => (1, -1),
            Direction::Bottom => (1, 0),
            Direction::BottomRight => (1, 1),
        }
    }
}

/// Closed axis-aligned rectangle in grid space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl CellBounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Whether `p` lies inside the rectangle, boundaries included.
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

/// A sampled candidate position.
#[derive(Clone, Debug, PartialEq)]
pub struct Coordinate {
    /// Grid-space position.
    pub position: Vec2,
    viabilities: Option<Vec<f64>>,
}

impl Coordinate {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            viabilities: None,
        }
    }

    /// Per-species average viability, once the coordinate has been scored.
    pub fn viabilities(&self) -> Option<&[f64]> {
        self.viabilities.as_deref()
    }

    pub(crate) fn set_viabilities(&mut self, viabilities: Vec<f64>) {
        debug_assert!(self.viabilities.is_none(), "viabilities are written once");
        self.viabilities = Some(viabilities);
    }

    pub(crate) fn clear_viabilities(&mut self) {
        self.viabilities = None;
    }

    #[inline]
    pub fn distance(&self, other: Vec2) -> f32 {
        self.position.distance(other)
    }
}

/// One rectangle of the partition.
#[derive(Clone, Debug)]
pub struct Cell {
    pub bounds: CellBounds,
    row: usize,
    col: usize,
    color: u8,
    neighbors: Vec<(Direction, usize)>,
    canopy: Vec<Coordinate>,
    undergrowth: Vec<Coordinate>,
    canopy_target: usize,
    undergrowth_target: usize,
}

impl Cell {
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn color(&self) -> u8 {
        self.color
    }

    /// Neighbour relations as `(direction, cell index)`.
    pub fn neighbors(&self) -> &[(Direction, usize)] {
        &self.neighbors
    }

    /// Index of the neighbour in `direction`, if the cell has one there.
    pub fn neighbor(&self, direction: Direction) -> Option<usize> {
        self.neighbors
            .iter()
            .find(|(d, _)| *d == direction)
            .map(|(_, i)| *i)
    }

    pub fn points(&self, pass: PointPass) -> &[Coordinate] {
        match pass {
            PointPass::Canopy => &self.canopy,
            PointPass::Undergrowth => &self.undergrowth,
        }
    }

    pub(crate) fn points_mut(&mut self, pass: PointPass) -> &mut Vec<Coordinate> {
        match pass {
            PointPass::Canopy => &mut self.canopy,
            PointPass::Undergrowth => &mut self.undergrowth,
        }
    }

    /// Number of points this cell should receive in `pass`.
    pub fn target(&self, pass: PointPass) -> usize {
        match pass {
            PointPass::Canopy => self.canopy_target,
            PointPass::Undergrowth => self.undergrowth_target,
        }
    }

    /// All canopy and undergrowth points of the cell.
    pub fn all_points(&self) -> impl Iterator<Item = &Coordinate> {
        self.canopy.iter().chain(self.undergrowth.iter())
    }
}

/// Arena of cells covering `[0, width] x [0, height]` in grid space.
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    width: f32,
    height: f32,
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    index: CellIndex,
    by_color: [Vec<usize>; COLORS],
}

impl SpatialGrid {
    /// Grid covering a terrain of `dim_x` x `dim_y` pixels (extent `dim - 1` per axis).
    pub fn for_terrain(dims: (usize, usize), cell_size: f32) -> Result<Self> {
        let width = dims.0.saturating_sub(1) as f32;
        let height = dims.1.saturating_sub(1) as f32;
        Self::partition(width, height, cell_size)
    }

    /// Divide `width` x `height` into row-major cells of `cell_size`.
    ///
    /// The last row and column absorb the remainder, so edge cells may be
    /// larger than `cell_size` but never smaller. A `cell_size` at least as
    /// large as an extent yields a single cell along that axis.
    pub fn partition(width: f32, height: f32, cell_size: f32) -> Result<Self> {
        if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
            return Err(Error::InvalidConfig(
                "grid extent must be > 0 in both components".into(),
            ));
        }
        if !cell_size.is_finite() || cell_size < 1.0 {
            return Err(Error::InvalidConfig("cell_size must be >= 1".into()));
        }

        let x_bounds = axis_bounds(width, cell_size);
        let y_bounds = axis_bounds(height, cell_size);
        let cols = x_bounds.len();
        let rows = y_bounds.len();

        let mut cells = Vec::with_capacity(rows * cols);
        let mut index = CellIndex::new();
        let mut by_color: [Vec<usize>; COLORS] = Default::default();

        for (row, &(y0, y1)) in y_bounds.iter().enumerate() {
            for (col, &(x0, x1)) in x_bounds.iter().enumerate() {
                let i = cells.len();
                let bounds = CellBounds::new(Vec2::new(x0, y0), Vec2::new(x1, y1));
                let color = Self::color_of(row, col);
                index.insert(i, &bounds);
                by_color[color as usize].push(i);
                cells.push(Cell {
                    bounds,
                    row,
                    col,
                    color,
                    neighbors: Vec::new(),
                    canopy: Vec::new(),
                    undergrowth: Vec::new(),
                    canopy_target: 0,
                    undergrowth_target: 0,
                });
            }
        }

        let mut grid = Self {
            width,
            height,
            rows,
            cols,
            cells,
            index,
            by_color,
        };
        for i in 0..grid.cells.len() {
            let neighbors = grid.neighbors_by_position(grid.cells[i].row, grid.cells[i].col);
            grid.cells[i].neighbors = neighbors;
        }

        debug!(
            "Partitioned {}x{} into {} rows x {} cols ({} buckets).",
            width,
            height,
            rows,
            cols,
            grid.index.bucket_count()
        );
        Ok(grid)
    }

    /// Checkerboard colour in `0..8`; equal colours are never adjacent.
    #[inline]
    pub fn color_of(row: usize, col: usize) -> u8 {
        ((row % 2) * 4 + (col % 2) * 2 + (row + col) % 2) as u8
    }

    fn neighbors_by_position(&self, row: usize, col: usize) -> Vec<(Direction, usize)> {
        Direction::ALL
            .iter()
            .filter_map(|&d| {
                let (dr, dc) = d.offset();
                let r = row.checked_add_signed(dr)?;
                let c = col.checked_add_signed(dc)?;
                self.cell_at(r, c).map(|i| (d, i))
            })
            .collect()
    }

    /// Assign seeded per-cell point budgets that sum exactly to the requested totals.
    pub fn allocate_points(
        &mut self,
        canopy_total: usize,
        undergrowth_total: usize,
        rng: &mut dyn RngCore,
    ) {
        let n = self.cells.len();
        let canopy = budget::distribute(canopy_total, n, CANOPY_VARIANCE_DIVISOR, rng);
        let undergrowth =
            budget::distribute(undergrowth_total, n, UNDERGROWTH_VARIANCE_DIVISOR, rng);
        for ((cell, c), u) in self.cells.iter_mut().zip(canopy).zip(undergrowth) {
            cell.canopy_target = c;
            cell.undergrowth_target = u;
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell by arena index. Panics if out of range.
    pub fn cell(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    pub(crate) fn cell_mut(&mut self, index: usize) -> &mut Cell {
        &mut self.cells[index]
    }

    /// Arena index of the cell at `(row, col)`.
    pub fn cell_at(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    /// Arena indices of the neighbours of `cell`.
    pub fn neighbors_of(&self, cell: usize) -> impl Iterator<Item = usize> + '_ {
        self.cells[cell].neighbors.iter().map(|(_, i)| *i)
    }

    /// `cell` followed by its neighbours.
    pub fn neighborhood(&self, cell: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::once(cell).chain(self.neighbors_of(cell))
    }

    /// Index of a cell whose closed rectangle contains `(x, y)`.
    ///
    /// Points on a shared boundary resolve to the lowest-indexed cell.
    pub fn cell_containing(&self, x: f32, y: f32) -> Option<usize> {
        let p = Vec2::new(x, y);
        self.index
            .candidates(p)
            .iter()
            .copied()
            .find(|&i| self.cells[i].bounds.contains(p))
    }

    /// Cells of one colour class, in arena order.
    pub fn cells_of_color(&self, color: usize) -> &[usize] {
        self.by_color.get(color).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every point of `pass` across the grid, in cell order.
    pub fn points(&self, pass: PointPass) -> impl Iterator<Item = &Coordinate> {
        self.cells.iter().flat_map(move |c| c.points(pass).iter())
    }

    /// Total number of points of `pass`.
    pub fn point_count(&self, pass: PointPass) -> usize {
        self.cells.iter().map(|c| c.points(pass).len()).sum()
    }

    /// Forget the viability vectors of every coordinate.
    pub(crate) fn clear_viabilities(&mut self) {
        for cell in &mut self.cells {
            for coord in cell.canopy.iter_mut().chain(cell.undergrowth.iter_mut()) {
                coord.clear_viabilities();
            }
        }
    }

    /// Drop all sampled points, keeping the partition and budgets.
    pub fn clear_points(&mut self) {
        for cell in &mut self.cells {
            cell.canopy.clear();
            cell.undergrowth.clear();
        }
    }
}

/// Closed `(start, end)` intervals along one axis.
fn axis_bounds(extent: f32, cell_size: f32) -> Vec<(f32, f32)> {
    let n = ((extent / cell_size).floor() as usize).max(1);
    let mut bounds = Vec::with_capacity(n);
    let mut start = 0.0f32;
    for i in 0..n {
        let end = if i == n - 1 {
            extent
        } else {
            (i + 1) as f32 * cell_size
        };
        bounds.push((start, end));
        start = end;
    }
    bounds
}
