//! Error types for tr-core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Arithmetic overflow in {0}")]
    Overflow(&'static str),
}

/// Result type alias
pub type CoreResult<T> = Result<T, CoreError>;
