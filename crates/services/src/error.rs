//! Shared error types for the services crate.

use thiserror::Error;

use prep_core::model::{AttemptError, CatalogError, ModuleId, QuizId};

/// Errors emitted by the module, quiz and dashboard services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServiceError {
    #[error("unknown module: {0}")]
    UnknownModule(ModuleId),
    #[error("unknown quiz: {0}")]
    UnknownQuiz(QuizId),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
