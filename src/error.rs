//! Error types for the store
//!
//! Only construction can fail; every runtime operation is total.

use thiserror::Error;

// == Store Error Enum ==
/// Unified error type for the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Configuration rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == Result Type Alias ==
/// Convenience Result type for the store.
pub type Result<T> = std::result::Result<T, StoreError>;
