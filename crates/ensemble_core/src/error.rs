use thiserror::Error;

use crate::model::ResultAddress;

/// Structural errors in correlation matrix handling.
///
/// These indicate caller bugs, not data problems: missing or degenerate data is
/// never an error and is filtered out instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    #[error(
        "cannot transpose ragged matrix: column {column} has {found} entries, expected {expected}"
    )]
    RaggedMatrix {
        expected: usize,
        found: usize,
        column: usize,
    },
}

/// Errors from explicit lookups into an ensemble
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnsembleError {
    #[error("ensemble parameter '{0}' not found")]
    UnknownParameter(String),
    #[error("result vector '{0}' not found in any case")]
    UnknownAddress(ResultAddress),
    #[error("ensemble '{0}' has no cases")]
    EmptyEnsemble(String),
}

pub type Result<T> = std::result::Result<T, EnsembleError>;
