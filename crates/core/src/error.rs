use thiserror::Error;

use crate::metrics::WeightsError;
use crate::model::CatalogError;

/// Any failure raised while setting up the domain layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Weights(#[from] WeightsError),
}
