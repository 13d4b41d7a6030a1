use thiserror::Error;

use crate::model::{CatalogError, ScoreError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Score(#[from] ScoreError),
}
