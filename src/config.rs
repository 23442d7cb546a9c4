//! Configuration for casevault
//!
//! Centralized configuration with sensible defaults.

/// Configuration for building and growing a store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Capacity Configuration
    // -------------------------------------------------------------------------
    /// Initial LMDB map size in bytes. Grows by doubling whenever a write
    /// hits `MDB_MAP_FULL`, so a small initial value only costs a few remaps.
    pub map_size: usize,

    /// Upper bound for map growth. A write that would require doubling past
    /// this limit fails with `VaultError::CapacityLimit` instead of claiming
    /// unbounded address space.
    pub max_map_size: usize,

    // -------------------------------------------------------------------------
    // Build Configuration
    // -------------------------------------------------------------------------
    /// Draw a progress bar while building a dataset
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            map_size: 10 * 1024 * 1024,            // 10 MB, LMDB's own default
            max_map_size: 1024 * 1024 * 1024 * 1024, // 1 TB
            progress: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the initial map size (in bytes)
    pub fn map_size(mut self, size: usize) -> Self {
        self.config.map_size = size;
        self
    }

    /// Set the maximum map size the store may grow to (in bytes)
    pub fn max_map_size(mut self, size: usize) -> Self {
        self.config.max_map_size = size;
        self
    }

    /// Enable or disable the build progress bar
    pub fn progress(mut self, enabled: bool) -> Self {
        self.config.progress = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
