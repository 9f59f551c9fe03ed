//! Classic Life rules (B3/S23) on a bounded grid.

use tracing::trace;

use crate::{
    world::{Cell, Grid},
    Result,
};

/// Fate of a single cell given how many of its neighbors are alive.
pub fn next_cell(cell: Cell, alive_neighbors: usize) -> Cell {
    match (cell, alive_neighbors) {
        (Cell::Alive, 2) | (Cell::Alive, 3) => Cell::Alive, // survival
        (Cell::Dead, 3) => Cell::Alive,                     // birth
        _ => Cell::Dead,
    }
}

/// Computes the following generation. The input is left untouched and the
/// result always has the same dimensions.
pub fn next_generation(grid: &Grid) -> Grid {
    let cols = grid.cols();
    let cells = grid
        .cells()
        .iter()
        .enumerate()
        .map(|(index, &cell)| {
            let (row, col) = (index / cols, index % cols);
            next_cell(cell, grid.alive_neighbors(row, col))
        })
        .collect();
    let next = Grid::from_cells(grid.dimensions(), cells);
    trace!(
        "generation computed: {} -> {} alive",
        grid.population(),
        next.population()
    );
    next
}

/// [`next_generation`] over a raw 0/1 matrix. Empty or ragged input fails
/// with `InvalidGridShape` instead of producing wrong neighbor counts.
pub fn next_generation_of_rows<R>(rows: &[R]) -> Result<Vec<Vec<u8>>>
where
    R: AsRef<[u8]>,
{
    let grid = Grid::from_rows(rows)?;
    Ok(next_generation(&grid).to_rows())
}
