//! Store handles
//!
//! Two views of the same LMDB directory:
//! - [`GrowableStore`]: the exclusive writer handle used during a build. It
//!   owns capacity-growth authority — a `put` that hits `MDB_MAP_FULL`
//!   aborts its transaction, doubles the map size and retries.
//! - [`ReadOnlyStore`]: a non-locking read handle used during query. Any
//!   number may be open against the same store, since nothing mutates it
//!   after the build.

use std::path::Path;

use heed::types::Bytes as RawBytes;
use heed::{Database, Env, EnvFlags, EnvOpenOptions, MdbError, RoTxn};
use tracing::info;

use crate::config::Config;
use crate::error::{Result, VaultError};
use crate::keys;

/// Exclusive writer handle with automatic map growth
pub struct GrowableStore {
    env: Env,
    db: Database<RawBytes, RawBytes>,
    max_map_size: usize,
}

impl GrowableStore {
    /// Create (or reopen for writing) the store directory at `path`.
    ///
    /// Opens with `WRITE_MAP | MAP_ASYNC`: values are written straight into
    /// the map and flushed asynchronously, which is the fast path for bulk
    /// builds. Durability is settled by the env closing at the end of the
    /// build.
    pub fn create(path: &Path, config: &Config) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let mut options = EnvOpenOptions::new();
        options.map_size(config.map_size).max_dbs(0);
        let env = unsafe {
            options.flags(EnvFlags::WRITE_MAP | EnvFlags::MAP_ASYNC);
            options.open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let db = env.create_database::<RawBytes, RawBytes>(&mut wtxn, None)?;
        wtxn.commit()?;

        Ok(Self {
            env,
            db,
            max_map_size: config.max_map_size,
        })
    }

    /// Write one key/value pair, growing the map as needed.
    ///
    /// Each call is independently transactional:
    /// 1. Begin a write transaction and stage the put.
    /// 2. On success, commit and return.
    /// 3. On `MDB_MAP_FULL` (from the put or the commit), abort — the
    ///    attempted write is fully discarded — then double the map size and
    ///    retry from step 1.
    ///
    /// Growth stops at `Config::max_map_size`; a write that would need more
    /// fails with `VaultError::CapacityLimit`.
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        loop {
            let mut wtxn = self.env.write_txn()?;
            match self.db.put(&mut wtxn, key, value) {
                Ok(()) => match wtxn.commit() {
                    Ok(()) => return Ok(()),
                    Err(e) if is_map_full(&e) => self.grow()?,
                    Err(e) => return Err(e.into()),
                },
                Err(e) if is_map_full(&e) => {
                    wtxn.abort();
                    self.grow()?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Current map size in bytes
    pub fn map_size(&self) -> usize {
        self.env.info().map_size
    }

    /// Double the map size, within the configured bound.
    fn grow(&self) -> Result<()> {
        let current = self.env.info().map_size;
        let requested = current.saturating_mul(2);
        if requested > self.max_map_size {
            return Err(VaultError::CapacityLimit {
                requested,
                max: self.max_map_size,
            });
        }
        info!(current, requested, "map full, doubling map size");
        // The caller aborted its transaction before getting here, and this
        // handle is the only one open against the env.
        unsafe { self.env.resize(requested)? };
        Ok(())
    }
}

fn is_map_full(err: &heed::Error) -> bool {
    matches!(err, heed::Error::Mdb(MdbError::MapFull))
}

/// Non-locking read-only handle
pub struct ReadOnlyStore {
    env: Env,
    db: Database<RawBytes, RawBytes>,
}

impl ReadOnlyStore {
    /// Open an existing store directory read-only.
    ///
    /// `NO_LOCK | NO_READ_AHEAD` matches the query-time access pattern:
    /// no writer is active once a build has finished, and dataset reads are
    /// random access.
    pub fn open(path: &Path) -> Result<Self> {
        let mut options = EnvOpenOptions::new();
        options.max_dbs(0);
        let env = unsafe {
            options.flags(EnvFlags::READ_ONLY | EnvFlags::NO_LOCK | EnvFlags::NO_READ_AHEAD);
            options.open(path)?
        };

        let rtxn = env.read_txn()?;
        let db = env
            .open_database::<RawBytes, RawBytes>(&rtxn, None)?
            .ok_or_else(|| VaultError::Corruption("main database missing".to_string()))?;
        drop(rtxn);

        Ok(Self { env, db })
    }

    /// Begin a read transaction
    pub fn read_txn(&self) -> Result<RoTxn<'_>> {
        Ok(self.env.read_txn()?)
    }

    /// Look up a key within a transaction; the returned slice borrows the
    /// memory map directly (zero-copy, valid while `rtxn` lives).
    pub fn get_in<'t>(&self, rtxn: &'t RoTxn, key: &[u8]) -> Result<Option<&'t [u8]>> {
        Ok(self.db.get(rtxn, key)?)
    }

    /// Store-wide entry count
    pub fn entries(&self) -> Result<u64> {
        let rtxn = self.env.read_txn()?;
        Ok(self.db.len(&rtxn)?)
    }

    /// Scan the full key space and collect every case key that has a
    /// `_len` entry, in store (lexicographic) order.
    pub fn case_keys(&self) -> Result<Vec<String>> {
        let rtxn = self.env.read_txn()?;
        let mut cases = Vec::new();
        for item in self.db.iter(&rtxn)? {
            let (key, _value) = item?;
            if let Some(case) = keys::case_from_len_key(key) {
                cases.push(case.to_string());
            }
        }
        Ok(cases)
    }
}
