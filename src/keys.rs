//! Key scheme and case-key list
//!
//! A case `K` with `n` arrays occupies keys `K_len`, `K_<i>` and
//! `K_<i>_metadata`. Key construction is pure string formatting, O(1) per
//! key. The ordered list of all case keys is kept in a sibling side file
//! `<store_name>_keys.lst`, one key per line.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, VaultError};

/// Suffix of the per-case length key
pub const LEN_SUFFIX: &str = "_len";

/// Suffix of the per-array metadata key
pub const META_SUFFIX: &str = "_metadata";

/// `K_len` for case `K`
pub fn len_key(case: &str) -> String {
    format!("{case}{LEN_SUFFIX}")
}

/// `K_<i>` for case `K`, array index `i`
pub fn data_key(case: &str, index: usize) -> String {
    format!("{case}_{index}")
}

/// `K_<i>_metadata` for case `K`, array index `i`
pub fn meta_key(case: &str, index: usize) -> String {
    format!("{case}_{index}{META_SUFFIX}")
}

/// Recover the case key from a `K_len` store key, if it is one.
pub fn case_from_len_key(key: &[u8]) -> Option<&str> {
    std::str::from_utf8(key).ok()?.strip_suffix(LEN_SUFFIX)
}

/// Path of the case-key list side file for a store
pub fn keys_file_path(root: &Path, store_name: &str) -> PathBuf {
    root.join(format!("{store_name}_keys.lst"))
}

/// Reject keys the side-file format cannot represent.
pub fn validate_case_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(VaultError::InvalidKey("empty key".to_string()));
    }
    if key.contains('\n') {
        return Err(VaultError::InvalidKey(format!(
            "key {key:?} contains a newline"
        )));
    }
    Ok(())
}

/// Read a key list file, one key per line.
pub fn read_key_list(path: &Path) -> Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut keys = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            keys.push(trimmed.to_string());
        }
    }
    Ok(keys)
}

/// Write a key list file, one key per line, replacing any existing file.
pub fn write_key_list(keys: &[String], path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for key in keys {
        writeln!(writer, "{}", key.trim())?;
    }
    writer.flush()?;
    Ok(())
}
