//! Error types for casevault
//!
//! Provides a unified error type for all operations. Capacity exhaustion
//! (`MDB_MAP_FULL`) is recovered internally by the store and never appears
//! here; everything else propagates to the direct caller.

use thiserror::Error;

use crate::array::DataType;

/// Result type alias using VaultError
pub type Result<T> = std::result::Result<T, VaultError>;

/// Unified error type for casevault operations
#[derive(Debug, Error)]
pub enum VaultError {
    // -------------------------------------------------------------------------
    // I/O and Engine Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] heed::Error),

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("metadata encoding error: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("format error: {0}")]
    Format(String),

    #[error("dtype mismatch: expected {expected}, got {actual}")]
    DtypeMismatch {
        expected: DataType,
        actual: DataType,
    },

    #[error("unknown dtype name: {0:?}")]
    UnknownDtype(String),

    // -------------------------------------------------------------------------
    // Dataset Errors
    // -------------------------------------------------------------------------
    #[error("key not found: {0:?}")]
    KeyNotFound(String),

    #[error("invalid case key: {0}")]
    InvalidKey(String),

    #[error("store corruption: {0}")]
    Corruption(String),

    #[error("case {key:?} has {actual} arrays, expected {expected}")]
    NonUniformCase {
        key: String,
        expected: usize,
        actual: usize,
    },

    #[error("loader failed for case {key:?}: {source}")]
    Loader {
        key: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // -------------------------------------------------------------------------
    // Capacity Errors
    // -------------------------------------------------------------------------
    #[error("map growth to {requested} bytes exceeds the configured limit of {max}")]
    CapacityLimit { requested: usize, max: usize },
}
