//! Grid edits coming from the user: cell toggles, resizing and imports.
//!
//! Resize and import replace the whole grid, so both force the simulation
//! idle before touching it. Imports are validated first and leave everything
//! untouched when they fail.

use tracing::{info, trace, warn};

use crate::{
    import,
    simulation::{Simulation, SimulationState},
    world::{Cell, Dimensions, Grid},
    Result,
};

impl Simulation {
    /// Flips one cell and returns its new value.
    pub fn toggle_cell(&mut self, row: usize, col: usize) -> Result<Cell> {
        let cell = self.edit_grid(|grid| grid.toggle_at(row, col))?;
        trace!("toggled ({}, {}) to {:?}", row, col, cell);
        Ok(cell)
    }

    /// Replaces the grid with an all-dead one of the requested size. Each side
    /// is clamped into `1..=MAX_DIMENSION`.
    pub fn resize(&mut self, rows: i64, cols: i64) -> Dimensions {
        let dimensions = Dimensions::clamped(rows, cols);
        self.replace_grid(Grid::new(dimensions), SimulationState::Stopped);
        info!("resized to {}", dimensions);
        dimensions
    }

    pub fn set_rows(&mut self, rows: i64) -> Dimensions {
        let cols = self.dimensions().cols as i64;
        self.resize(rows, cols)
    }

    pub fn set_cols(&mut self, cols: i64) -> Dimensions {
        let rows = self.dimensions().rows as i64;
        self.resize(rows, cols)
    }

    /// Loads an externally supplied 0/1 matrix. On success the grid and its
    /// dimensions are replaced and the simulation is left paused.
    pub fn import_grid<R>(&mut self, rows: &[R]) -> Result<Dimensions>
    where
        R: AsRef<[u8]>,
    {
        let grid = import::grid_from_rows(rows).map_err(|e| {
            warn!("import rejected: {}", e);
            e
        })?;
        Ok(self.load(grid))
    }

    /// [`Simulation::import_grid`] from the JSON setup format.
    pub fn import_json(&mut self, text: &str) -> Result<Dimensions> {
        let grid = import::grid_from_json(text).map_err(|e| {
            warn!("import rejected: {}", e);
            e
        })?;
        Ok(self.load(grid))
    }

    fn load(&mut self, grid: Grid) -> Dimensions {
        let dimensions = grid.dimensions();
        let population = grid.population();
        self.replace_grid(grid, SimulationState::Paused);
        info!("imported {} grid with {} alive", dimensions, population);
        dimensions
    }
}
