use std::collections::TryReserveError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DtpsError {
    #[error("Memory allocation error: {0}")]
    MemoryAllocationError(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Invalid dimension: expected {expected}, got {got}")]
    InvalidDimension {
        expected: usize,
        got: usize,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DtpsError>;

impl DtpsError {
    /// True for the allocation failure kind, the only one the harness
    /// treats as fatal for a context.
    pub fn is_allocation(&self) -> bool {
        matches!(self, Self::MemoryAllocationError(_))
    }
}

impl From<TryReserveError> for DtpsError {
    fn from(err: TryReserveError) -> Self {
        Self::MemoryAllocationError(format!("{}", err))
    }
}
