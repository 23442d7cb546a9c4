//! Dataset build path
//!
//! Iterates cases in order, loads each case's arrays through the
//! caller-supplied loader, and writes them under the per-case key scheme.
//! The store's map grows transparently; the case-key list is persisted to
//! the side file once every case is written.

use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use crate::array::TypedArray;
use crate::codec::{self, ArrayMeta};
use crate::config::Config;
use crate::error::{Result, VaultError};
use crate::keys;
use crate::store::GrowableStore;

/// What a loader returns: the ordered array list for one case, or any error,
/// which aborts the build wrapped in `VaultError::Loader`.
pub type LoaderResult<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Builds a dataset store under `<root>/<name>` plus the sibling
/// `<name>_keys.lst` side file.
///
/// The writer assumes exclusive ownership of the store for the whole build;
/// a failed build leaves a prefix of cases written and no updated key list,
/// and is meant to be rerun from scratch.
pub struct DatasetWriter {
    root: PathBuf,
    name: String,
    config: Config,
}

impl DatasetWriter {
    /// Writer with the default [`Config`]
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self::with_config(root, name, Config::default())
    }

    /// Writer with an explicit configuration
    pub fn with_config(root: impl Into<PathBuf>, name: impl Into<String>, config: Config) -> Self {
        Self {
            root: root.into(),
            name: name.into(),
            config,
        }
    }

    /// Directory the store lives in
    pub fn store_path(&self) -> PathBuf {
        self.root.join(&self.name)
    }

    /// Build from bare identifiers: each identifier is both the case key and
    /// the loader payload.
    pub fn build<F>(&self, cases: &[String], mut loader: F) -> Result<()>
    where
        F: FnMut(&str) -> LoaderResult<Vec<TypedArray>>,
    {
        let pairs: Vec<(String, String)> =
            cases.iter().map(|key| (key.clone(), key.clone())).collect();
        self.build_pairs(&pairs, |payload: &String| loader(payload))
    }

    /// Build from `(key, payload)` pairs: the key addresses the case, the
    /// payload is handed to the loader.
    ///
    /// The loader is invoked exactly once per case, in input order. Every
    /// case must yield the same number of arrays; the first case fixes the
    /// count and a mismatch fails the build with `NonUniformCase` (the
    /// reader's length computation depends on a uniform count).
    pub fn build_pairs<P, F>(&self, cases: &[(String, P)], mut loader: F) -> Result<()>
    where
        F: FnMut(&P) -> LoaderResult<Vec<TypedArray>>,
    {
        // Side-file representability is checked before anything is written.
        for (key, _) in cases {
            keys::validate_case_key(key)?;
        }

        let store = GrowableStore::create(&self.store_path(), &self.config)?;
        let bar = if self.config.progress {
            progress_bar(cases.len() as u64)
        } else {
            ProgressBar::hidden()
        };

        let mut uniform_count: Option<usize> = None;
        for (key, payload) in cases {
            let arrays = loader(payload).map_err(|source| VaultError::Loader {
                key: key.clone(),
                source,
            })?;
            let n = arrays.len();
            match uniform_count {
                None => uniform_count = Some(n),
                Some(expected) if expected != n => {
                    return Err(VaultError::NonUniformCase {
                        key: key.clone(),
                        expected,
                        actual: n,
                    });
                }
                Some(_) => {}
            }

            debug!(key = key.as_str(), arrays = n, "writing case");
            store.put(keys::len_key(key).as_bytes(), &serde_json::to_vec(&n)?)?;
            for (i, array) in arrays.iter().enumerate() {
                let data = codec::encode_array(array);
                store.put(keys::data_key(key, i).as_bytes(), &data)?;
                let meta = codec::encode_metadata(&ArrayMeta::of(array))?;
                store.put(keys::meta_key(key, i).as_bytes(), &meta)?;
            }
            bar.inc(1);
        }
        bar.finish_and_clear();

        // Close the store before the key list goes down, so a reader that
        // sees the side file sees a complete store.
        drop(store);

        let key_list: Vec<String> = cases.iter().map(|(key, _)| key.clone()).collect();
        keys::write_key_list(&key_list, &keys::keys_file_path(&self.root, &self.name))
    }
}

fn progress_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {wide_bar} {pos}/{len} ({eta})",
        )
        .unwrap(),
    );
    bar
}
