//! Occupancy grid that maps continuous world positions onto placement cells.

use glam::Vec2;
use lawn_defence_core::{CellIndex, GridLayout, WorldRect};

/// Placement grid combining immutable geometry with a dense occupancy table.
///
/// Queries never fault: out-of-range indices report "not free" and mutations
/// on them are ignored.
#[derive(Clone, Debug)]
pub struct Grid {
    layout: GridLayout,
    occupied: Vec<bool>,
}

impl Grid {
    /// Creates a grid with every cell free.
    #[must_use]
    pub fn new(layout: GridLayout) -> Self {
        let capacity_u64 = u64::from(layout.columns()) * u64::from(layout.rows());
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            layout,
            occupied: vec![false; capacity],
        }
    }

    /// Immutable geometry backing the grid.
    #[must_use]
    pub const fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Converts a world position into the cell beneath it.
    ///
    /// Both axes are clamped into range, so points outside the grid map onto
    /// the nearest edge cell. Pair with [`Grid::is_point_in_grid_area`] when
    /// that distinction matters.
    #[must_use]
    pub fn world_to_cell(&self, position: Vec2) -> CellIndex {
        let relative = position - self.layout.origin();
        let cell_size = self.layout.cell_size();
        CellIndex::new(
            clamp_axis(relative.x / cell_size.x, self.layout.columns()),
            clamp_axis(relative.y / cell_size.y, self.layout.rows()),
        )
    }

    /// World-space centre of the provided cell.
    #[must_use]
    pub fn cell_to_world(&self, cell: CellIndex) -> Vec2 {
        let index = Vec2::new(cell.column() as f32, cell.row() as f32);
        self.layout.origin() + (index + Vec2::splat(0.5)) * self.layout.cell_size()
    }

    /// World-space bounds of the provided cell.
    #[must_use]
    pub fn cell_rect(&self, cell: CellIndex) -> WorldRect {
        let index = Vec2::new(cell.column() as f32, cell.row() as f32);
        let cell_size = self.layout.cell_size();
        WorldRect::from_min_size(self.layout.origin() + index * cell_size, cell_size)
    }

    /// Reports whether the index addresses a cell of this grid.
    #[must_use]
    pub fn contains_cell(&self, cell: CellIndex) -> bool {
        cell.column() < self.layout.columns() && cell.row() < self.layout.rows()
    }

    /// Reports whether the cell exists and is unclaimed.
    #[must_use]
    pub fn is_cell_free(&self, cell: CellIndex) -> bool {
        self.index(cell)
            .and_then(|index| self.occupied.get(index))
            .map_or(false, |occupied| !occupied)
    }

    /// Reports whether the point lies inside the grid's closed world-space area.
    #[must_use]
    pub fn is_point_in_grid_area(&self, position: Vec2) -> bool {
        self.layout.area().contains_inclusive(position)
    }

    /// Claims the cell. Idempotent; out-of-range indices are ignored.
    pub fn mark_occupied(&mut self, cell: CellIndex) {
        self.set(cell, true);
    }

    /// Releases the cell. Idempotent; out-of-range indices are ignored.
    pub fn mark_free(&mut self, cell: CellIndex) {
        self.set(cell, false);
    }

    /// Releases every cell.
    pub fn reset_all(&mut self) {
        self.occupied.fill(false);
    }

    /// Finds the free cell closest to `position` in Chebyshev distance.
    ///
    /// The cell directly under the position is tried first. Rings of growing
    /// radius up to the layout's maximum search radius follow, each scanned
    /// row-major (rows top to bottom, columns left to right), so ties at equal
    /// distance resolve to the first cell in that order. Returns `None` when
    /// every cell within the radius is claimed.
    #[must_use]
    pub fn find_nearest_free_cell(&self, position: Vec2) -> Option<CellIndex> {
        let center = self.world_to_cell(position);
        if self.is_cell_free(center) {
            return Some(center);
        }

        // Rings wider than the grid only contain off-grid cells.
        let reach = self.layout.columns().max(self.layout.rows());
        let max_radius = i64::from(self.layout.max_search_radius().min(reach));

        for radius in 1..=max_radius {
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    if dx.abs() < radius && dy.abs() < radius {
                        continue;
                    }
                    let Some(cell) = self.offset(center, dx, dy) else {
                        continue;
                    };
                    if self.is_cell_free(cell) {
                        return Some(cell);
                    }
                }
            }
        }

        None
    }

    /// Claimed cells in row-major order.
    #[must_use]
    pub fn occupied_cells(&self) -> Vec<CellIndex> {
        let columns = self.layout.columns();
        (0..self.layout.rows())
            .flat_map(|row| (0..columns).map(move |column| CellIndex::new(column, row)))
            .filter(|cell| !self.is_cell_free(*cell))
            .collect()
    }

    fn set(&mut self, cell: CellIndex, occupied: bool) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.occupied.get_mut(index) {
                *slot = occupied;
            }
        }
    }

    fn offset(&self, center: CellIndex, dx: i64, dy: i64) -> Option<CellIndex> {
        let column = i64::from(center.column()) + dx;
        let row = i64::from(center.row()) + dy;
        if column < 0
            || row < 0
            || column >= i64::from(self.layout.columns())
            || row >= i64::from(self.layout.rows())
        {
            return None;
        }
        Some(CellIndex::new(
            u32::try_from(column).ok()?,
            u32::try_from(row).ok()?,
        ))
    }

    fn index(&self, cell: CellIndex) -> Option<usize> {
        if self.contains_cell(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.layout.columns()).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

fn clamp_axis(value_in_cells: f32, count: u32) -> u32 {
    let last = count.saturating_sub(1);
    let floored = value_in_cells.floor();
    if floored.is_nan() || floored <= 0.0 {
        0
    } else if floored >= last as f32 {
        last
    } else {
        floored as u32
    }
}
