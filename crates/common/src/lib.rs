//! Conway's Game of Life: a bounded grid, the rule engine, and the
//! timer-driven simulation that advances it.

pub mod editor;
pub mod gameloop;
pub mod import;
pub mod rules;
pub mod simulation;
pub mod speed;
pub mod world;

pub use import::ImportError;
pub use simulation::{Simulation, SimulationConfig, SimulationState, Update};
pub use speed::Speed;
pub use world::{Cell, Dimensions, Grid, ShapeError, Tick, MAX_DIMENSION};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid import format: {0}")]
    InvalidImportFormat(#[from] ImportError),
    #[error("invalid grid shape: {0}")]
    InvalidGridShape(#[from] ShapeError),
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    CellOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("unsupported speed {0:?}, expected one of 0.5x, 1x, 2x, 4x")]
    InvalidSpeed(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
