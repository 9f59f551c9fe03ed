//! Loading grids from the JSON setup format: a root array of equally long
//! arrays of `0` / `1`. There is no metadata or versioning.

use crate::world::{Grid, ShapeError};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("expected a JSON array of arrays of 0/1: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

pub fn parse_rows(text: &str) -> Result<Vec<Vec<u8>>, ImportError> {
    Ok(serde_json::from_str(text)?)
}

pub fn grid_from_rows<R>(rows: &[R]) -> Result<Grid, ImportError>
where
    R: AsRef<[u8]>,
{
    Ok(Grid::from_rows(rows)?)
}

pub fn grid_from_json(text: &str) -> Result<Grid, ImportError> {
    grid_from_rows(&parse_rows(text)?)
}
