//! Dataset build and query layer
//!
//! [`DatasetWriter`] turns case identifiers plus a caller-supplied loader
//! into per-case key records; [`DatasetReader`] opens the finished store
//! read-only and reconstructs the ordered array list for a case.

mod reader;
mod writer;

pub use reader::DatasetReader;
pub use writer::{DatasetWriter, LoaderResult};

use std::path::Path;

use crate::array::TypedArray;
use crate::error::Result;

/// Build a dataset with the default configuration.
///
/// Each identifier in `cases` becomes a case key and is passed to `loader`
/// to obtain that case's ordered array list. See [`DatasetWriter`] for
/// `(key, payload)` pairs and configuration.
pub fn build<F>(root_path: &Path, store_name: &str, cases: &[String], loader: F) -> Result<()>
where
    F: FnMut(&str) -> LoaderResult<Vec<TypedArray>>,
{
    DatasetWriter::new(root_path, store_name).build(cases, loader)
}
