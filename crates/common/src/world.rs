use std::{convert::TryFrom, fmt};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Error, Result};

/// Generation counter. Wraps rather than overflowing on very long runs.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Tick(pub u32);

impl Tick {
    pub fn zero() -> Self {
        Self(0)
    }

    pub fn increment_self(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Cell {
    Dead,
    Alive,
}

impl Cell {
    pub fn is_alive(self) -> bool {
        matches!(self, Cell::Alive)
    }

    pub fn toggled(self) -> Self {
        match self {
            Cell::Dead => Cell::Alive,
            Cell::Alive => Cell::Dead,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Dead
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> u8 {
        match cell {
            Cell::Dead => 0,
            Cell::Alive => 1,
        }
    }
}

impl TryFrom<u8> for Cell {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, u8> {
        match value {
            0 => Ok(Cell::Dead),
            1 => Ok(Cell::Alive),
            other => Err(other),
        }
    }
}

/// Why a matrix could not become a [`Grid`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("grid has no rows")]
    NoRows,
    #[error("grid has no columns")]
    NoColumns,
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("cell ({row}, {col}) has value {value}, expected 0 or 1")]
    NotBinary { row: usize, col: usize, value: u8 },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Dimensions {
    pub rows: usize,
    pub cols: usize,
}

/// Largest accepted row or column count.
pub const MAX_DIMENSION: usize = 1024;

impl Dimensions {
    /// Builds dimensions from raw user input, clamping each side into
    /// `1..=MAX_DIMENSION`.
    pub fn clamped(rows: i64, cols: i64) -> Self {
        Self {
            rows: clamp_dimension("rows", rows),
            cols: clamp_dimension("cols", cols),
        }
    }

    /// Applies the same clamp to dimensions that did not come through
    /// [`Dimensions::clamped`], such as a deserialized config.
    pub fn bounded(self) -> Self {
        let widen = |value: usize| i64::try_from(value).unwrap_or(i64::MAX);
        Self::clamped(widen(self.rows), widen(self.cols))
    }

    pub fn area(&self) -> usize {
        self.rows.saturating_mul(self.cols)
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

fn clamp_dimension(name: &str, requested: i64) -> usize {
    if requested < 1 {
        warn!("requested {} = {}, clamping to 1", name, requested);
        1
    } else if requested > MAX_DIMENSION as i64 {
        warn!(
            "requested {} = {}, clamping to {}",
            name, requested, MAX_DIMENSION
        );
        MAX_DIMENSION
    } else {
        requested as usize
    }
}

// [nw, n, ne, w, e, sw, s, se] as (row, col) offsets
pub(crate) const NEIGHBORHOOD: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// A bounded, rectangular grid of cells stored row-major.
///
/// Construction guarantees `rows >= 1`, `cols >= 1` and that every row has
/// the same width, so code holding a `Grid` never has to re-check its shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(dimensions: Dimensions) -> Self {
        let dimensions = dimensions.bounded();
        Self {
            rows: dimensions.rows,
            cols: dimensions.cols,
            cells: vec![Cell::Dead; dimensions.area()],
        }
    }

    /// Builds a grid from a matrix of 0/1 values, rejecting empty, ragged or
    /// non-binary input.
    pub fn from_rows<R>(rows: &[R]) -> std::result::Result<Self, ShapeError>
    where
        R: AsRef<[u8]>,
    {
        let first = rows.first().ok_or(ShapeError::NoRows)?;
        let cols = first.as_ref().len();
        if cols == 0 {
            return Err(ShapeError::NoColumns);
        }

        let mut cells = Vec::with_capacity(rows.len() * cols);
        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(ShapeError::Ragged {
                    row: row_index,
                    expected: cols,
                    found: row.len(),
                });
            }
            for (col_index, &value) in row.iter().enumerate() {
                let cell = Cell::try_from(value).map_err(|value| ShapeError::NotBinary {
                    row: row_index,
                    col: col_index,
                    value,
                })?;
                cells.push(cell);
            }
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            cells,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            rows: self.rows,
            cols: self.cols,
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell_at(&self, row: usize, col: usize) -> Option<Cell> {
        let index = self.cell_index(row, col)?;
        self.cells.get(index).copied()
    }

    pub fn set_at(&mut self, row: usize, col: usize, cell: Cell) -> Result<()> {
        let index = self.checked_index(row, col)?;
        self.cells[index] = cell;
        Ok(())
    }

    pub fn toggle_at(&mut self, row: usize, col: usize) -> Result<Cell> {
        let index = self.checked_index(row, col)?;
        let cell = self.cells[index].toggled();
        self.cells[index] = cell;
        Ok(cell)
    }

    /// Number of alive neighbors of `(row, col)`. Positions off the edge count
    /// as dead.
    pub fn alive_neighbors(&self, row: usize, col: usize) -> usize {
        NEIGHBORHOOD
            .iter()
            .filter_map(|&(d_row, d_col)| {
                let r = offset(row, d_row, self.rows)?;
                let c = offset(col, d_col, self.cols)?;
                self.cell_at(r, c)
            })
            .filter(|cell| cell.is_alive())
            .count()
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_alive()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.population() == 0
    }

    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(self.cols)
            .map(|row| row.iter().map(|&cell| u8::from(cell)).collect())
            .collect()
    }

    /// Row-major 0/1 bytes, the layout handed to renderers.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.cells.iter().map(|&cell| u8::from(cell)).collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_rows())?)
    }

    pub(crate) fn from_cells(dimensions: Dimensions, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(cells.len(), dimensions.area());
        Self {
            rows: dimensions.rows,
            cols: dimensions.cols,
            cells,
        }
    }

    fn cell_index(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        let row_index = self.cols.checked_mul(row)?;
        row_index
            .checked_add(col)
            .filter(|&index| index < self.cells.len())
    }

    fn checked_index(&self, row: usize, col: usize) -> Result<usize> {
        self.cell_index(row, col).ok_or(Error::CellOutOfBounds {
            row,
            col,
            rows: self.rows,
            cols: self.cols,
        })
    }
}

fn offset(position: usize, delta: i64, limit: usize) -> Option<usize> {
    let shifted = (position as i64).checked_add(delta)?;
    if shifted < 0 || shifted as usize >= limit {
        None
    } else {
        Some(shifted as usize)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            for cell in row {
                let glyph = if cell.is_alive() { '#' } else { '.' };
                write!(f, "{}", glyph)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_all_dead() {
        let grid = Grid::new(Dimensions { rows: 3, cols: 4 });
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 4);
        assert_eq!(grid.population(), 0);
        assert_eq!(grid.cells().len(), 12);
    }

    #[test]
    fn clamps_non_positive_dimensions() {
        assert_eq!(Dimensions::clamped(0, 5), Dimensions { rows: 1, cols: 5 });
        assert_eq!(Dimensions::clamped(-3, -1), Dimensions { rows: 1, cols: 1 });
        assert_eq!(Dimensions::clamped(7, 2), Dimensions { rows: 7, cols: 2 });
    }

    #[test]
    fn clamps_oversized_dimensions() {
        assert_eq!(
            Dimensions::clamped(1 << 32, 1 << 32),
            Dimensions {
                rows: MAX_DIMENSION,
                cols: MAX_DIMENSION
            }
        );
        assert_eq!(
            Dimensions::clamped(i64::MAX, 3),
            Dimensions {
                rows: MAX_DIMENSION,
                cols: 3
            }
        );
    }

    #[test]
    fn new_grid_bounds_unchecked_dimensions() {
        let mut grid = Grid::new(Dimensions {
            rows: usize::MAX,
            cols: 0,
        });
        assert_eq!(grid.rows(), MAX_DIMENSION);
        assert_eq!(grid.cols(), 1);
        assert_eq!(grid.cells().len(), MAX_DIMENSION);
        assert_eq!(grid.toggle_at(MAX_DIMENSION - 1, 0).unwrap(), Cell::Alive);
    }

    #[test]
    fn from_rows_rejects_bad_shapes() {
        let empty: Vec<Vec<u8>> = vec![];
        assert!(matches!(
            Grid::from_rows(&empty),
            Err(ShapeError::NoRows)
        ));
        assert!(matches!(
            Grid::from_rows(&[Vec::<u8>::new()]),
            Err(ShapeError::NoColumns)
        ));
        assert!(matches!(
            Grid::from_rows(&[vec![1, 0], vec![1]]),
            Err(ShapeError::Ragged {
                row: 1,
                expected: 2,
                found: 1
            })
        ));
        assert!(matches!(
            Grid::from_rows(&[vec![0, 2]]),
            Err(ShapeError::NotBinary {
                row: 0,
                col: 1,
                value: 2
            })
        ));
    }

    #[test]
    fn from_rows_keeps_row_major_order() {
        let grid = Grid::from_rows(&[vec![1, 0, 0], vec![0, 0, 1]]).unwrap();
        assert_eq!(grid.cell_at(0, 0), Some(Cell::Alive));
        assert_eq!(grid.cell_at(1, 2), Some(Cell::Alive));
        assert_eq!(grid.cell_at(1, 0), Some(Cell::Dead));
        assert_eq!(grid.cell_at(2, 0), None);
        assert_eq!(grid.to_rows(), vec![vec![1, 0, 0], vec![0, 0, 1]]);
        assert_eq!(grid.to_bytes(), vec![1, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn toggle_flips_and_checks_bounds() {
        let mut grid = Grid::new(Dimensions { rows: 2, cols: 2 });
        assert_eq!(grid.toggle_at(1, 1).unwrap(), Cell::Alive);
        assert_eq!(grid.toggle_at(1, 1).unwrap(), Cell::Dead);
        assert!(matches!(
            grid.toggle_at(2, 0),
            Err(Error::CellOutOfBounds {
                row: 2,
                col: 0,
                rows: 2,
                cols: 2
            })
        ));
    }

    #[test]
    fn neighbors_off_the_edge_count_as_dead() {
        let grid = Grid::from_rows(&[vec![1, 1], vec![1, 0]]).unwrap();
        assert_eq!(grid.alive_neighbors(0, 0), 2);
        assert_eq!(grid.alive_neighbors(1, 1), 3);
    }

    #[test]
    fn renders_as_text() {
        let grid = Grid::from_rows(&[vec![1, 0], vec![0, 1]]).unwrap();
        assert_eq!(grid.to_string(), "#.\n.#\n");
    }

    #[test]
    fn tick_wraps() {
        let mut tick = Tick(u32::MAX);
        tick.increment_self();
        assert_eq!(tick, Tick::zero());
    }
}
