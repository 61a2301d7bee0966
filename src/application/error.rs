//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::{DefinitionError, DispatchError};

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Dispatch(#[from] DispatchError),

    #[error("invalid command tree: {0}")]
    Definition(#[from] DefinitionError),

    #[error("cannot encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
