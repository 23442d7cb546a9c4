//! # casevault
//!
//! An LMDB-backed dataset store for ordered collections of typed
//! n-dimensional arrays, with:
//! - A raw byte codec for array payloads plus JSON shape/dtype metadata
//! - Transparent map-size growth on capacity exhaustion during writes
//! - A flat, O(1)-constructible key scheme per case
//! - Zero-copy array view reconstruction on read
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     DatasetWriter                         │
//! │        (cases × loader → per-case key records)            │
//! └───────────────┬──────────────────────────────────────────┘
//!                 │ encode_array / encode_metadata
//! ┌───────────────▼──────────────────────────────────────────┐
//! │                     GrowableStore                         │
//! │      (txn put, MapFull → double map size, retry)          │
//! └───────────────┬──────────────────────────────────────────┘
//!                 │
//!          ┌──────▼──────┐        ┌──────────────────┐
//!          │    LMDB     │◄───────┤  DatasetReader   │
//!          │  (1 dir +   │  get/  │ (read-only, key  │
//!          │  _keys.lst) │ cursor │  list + lookups) │
//!          └─────────────┘        └──────────────────┘
//! ```
//!
//! ## Key Namespace
//!
//! For a case `K` holding `n` arrays:
//! - `K_len`         → JSON integer `n`
//! - `K_<i>`         → raw row-major array bytes, `i` in `[0, n)`
//! - `K_<i>_metadata`→ JSON `{"shape": [...], "dtype": "..."}`

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod array;
pub mod codec;
pub mod keys;
pub mod store;
pub mod dataset;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, VaultError};
pub use config::Config;
pub use array::{DataType, Element, TypedArray};
pub use codec::ArrayMeta;
pub use store::{GrowableStore, ReadOnlyStore};
pub use dataset::{build, DatasetReader, DatasetWriter, LoaderResult};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of casevault
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
