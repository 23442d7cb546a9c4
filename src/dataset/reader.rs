//! Dataset query path
//!
//! Opens a built store read-only, loads (or derives and persists) the
//! case-key list, and reconstructs the ordered array list for a case on
//! lookup.

use std::fmt;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use heed::RoTxn;
use tracing::info;

use crate::array::TypedArray;
use crate::codec;
use crate::error::{Result, VaultError};
use crate::keys;
use crate::store::ReadOnlyStore;

/// Read-only view of a built dataset.
///
/// Multiple readers may be open against the same store concurrently; the
/// store is never mutated after a build, so opening is non-locking.
pub struct DatasetReader {
    store: ReadOnlyStore,
    store_path: PathBuf,
    case_keys: Vec<String>,
    length: usize,
}

impl DatasetReader {
    /// Open the dataset at `<root>/<store_name>`.
    ///
    /// Loads `<store_name>_keys.lst` if present; otherwise derives the key
    /// list by scanning the store for `_len` entries and persists the result
    /// for future opens.
    pub fn open(root_path: &Path, store_name: &str) -> Result<Self> {
        let store_path = root_path.join(store_name);
        let store = ReadOnlyStore::open(&store_path)?;

        let keys_path = keys::keys_file_path(root_path, store_name);
        let case_keys = if keys_path.is_file() {
            keys::read_key_list(&keys_path)?
        } else {
            // Full key-space scan; can take a while on large stores.
            info!(path = %keys_path.display(), "key list missing, deriving from store scan");
            let derived = store.case_keys()?;
            keys::write_key_list(&derived, &keys_path)?;
            derived
        };

        let length = compute_length(&store, &case_keys)?;

        Ok(Self {
            store,
            store_path,
            case_keys,
            length,
        })
    }

    /// The ordered array list for a case.
    ///
    /// Fails with `KeyNotFound` for keys outside the case-key list, and with
    /// `Corruption` if any `K_i` or `K_i_metadata` entry promised by `K_len`
    /// is missing.
    pub fn get(&self, key: &str) -> Result<Vec<TypedArray>> {
        if !self.has_key(key) {
            return Err(VaultError::KeyNotFound(key.to_string()));
        }

        let rtxn = self.store.read_txn()?;
        let n = read_case_len(&self.store, &rtxn, key)?;
        let mut arrays = Vec::with_capacity(n);
        for i in 0..n {
            arrays.push(self.read_array(&rtxn, key, i)?);
        }
        Ok(arrays)
    }

    /// Whether `key` is in the case-key list
    pub fn has_key(&self, key: &str) -> bool {
        self.case_keys.iter().any(|k| k == key)
    }

    /// The case-key list, in dataset order
    pub fn keys(&self) -> &[String] {
        &self.case_keys
    }

    /// Number of cases in the dataset
    pub fn len(&self) -> usize {
        self.length
    }

    /// Whether the dataset holds no cases
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Directory the store lives in
    pub fn path(&self) -> &Path {
        &self.store_path
    }

    /// Drop `key` from this reader's in-memory case-key list only.
    ///
    /// The store entries and the side file are untouched, and [`len`] still
    /// reflects the store contents; subsequent [`get`] calls for the key
    /// fail with `KeyNotFound` on this handle.
    ///
    /// [`len`]: Self::len
    /// [`get`]: Self::get
    pub fn forget_key(&mut self, key: &str) -> bool {
        match self.case_keys.iter().position(|k| k == key) {
            Some(idx) => {
                self.case_keys.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Release the store handle
    pub fn close(self) {}

    fn read_array(&self, rtxn: &RoTxn, case: &str, index: usize) -> Result<TypedArray> {
        let data_key = keys::data_key(case, index);
        let data = self
            .store
            .get_in(rtxn, data_key.as_bytes())?
            .ok_or_else(|| VaultError::Corruption(format!("missing entry {data_key:?}")))?;

        let meta_key = keys::meta_key(case, index);
        let meta_buf = self
            .store
            .get_in(rtxn, meta_key.as_bytes())?
            .ok_or_else(|| VaultError::Corruption(format!("missing entry {meta_key:?}")))?;

        let meta = codec::decode_metadata(meta_buf)?;
        // One copy out of the memory map; the array owns its payload once
        // the transaction ends.
        codec::decode_array(Bytes::copy_from_slice(data), &meta)
    }
}

impl fmt::Display for DatasetReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DatasetReader ({})", self.store_path.display())
    }
}

/// Dataset length from store statistics: each case contributes `m` data
/// keys, `m` metadata keys and one length key, so `entries / (2m + 1)`.
///
/// The format does not enforce a uniform per-case array count by itself, so
/// non-divisibility is reported as corruption rather than a silently wrong
/// length.
fn compute_length(store: &ReadOnlyStore, case_keys: &[String]) -> Result<usize> {
    let Some(first) = case_keys.first() else {
        return Ok(0);
    };

    let entries = store.entries()? as usize;
    let rtxn = store.read_txn()?;
    let m = read_case_len(store, &rtxn, first)?;

    let per_case = 2 * m + 1;
    if entries % per_case != 0 {
        return Err(VaultError::Corruption(format!(
            "{entries} entries is not a multiple of {per_case}; cases have differing array counts"
        )));
    }
    Ok(entries / per_case)
}

fn read_case_len(store: &ReadOnlyStore, rtxn: &RoTxn, case: &str) -> Result<usize> {
    let len_key = keys::len_key(case);
    let buf = store
        .get_in(rtxn, len_key.as_bytes())?
        .ok_or_else(|| VaultError::Corruption(format!("missing entry {len_key:?}")))?;
    Ok(serde_json::from_slice(buf)?)
}
