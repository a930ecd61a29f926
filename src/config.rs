use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Static settings of a decode call
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Max number of bytes pulled from the source per refill
    pub buffer_size: usize,
    /// Max size of a part header block, blank line included
    pub max_header_size: usize,
    /// Remaining body length above which a part is spilled to disk
    pub spill_threshold: u64,
    /// Directory for spilled parts, the OS temp directory when unset
    pub temp_dir: Option<PathBuf>,
    /// File name prefix of spilled parts
    pub temp_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            buffer_size: Self::DEFAULT_BUFFER_SIZE,
            max_header_size: Self::DEFAULT_MAX_HEADER_SIZE,
            spill_threshold: Self::DEFAULT_SPILL_THRESHOLD,
            temp_dir: None,
            temp_prefix: Self::DEFAULT_TEMP_PREFIX.to_string(),
        }
    }
}

impl Config {
    /// Refill chunk size, defaults to 8KB.
    pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

    /// Max header block size, defaults to 8KB.
    pub const DEFAULT_MAX_HEADER_SIZE: usize = 8 * 1024;

    /// Disk-spill threshold, defaults to 1MB.
    pub const DEFAULT_SPILL_THRESHOLD: u64 = 1024 * 1024;

    /// Spilled file prefix.
    pub const DEFAULT_TEMP_PREFIX: &'static str = "form-parts-";

    /// Refill chunk size
    ///
    /// # Panics
    ///
    /// If `max` is zero.
    #[must_use]
    pub fn buffer_size(mut self, max: usize) -> Self {
        assert!(max > 0, "The buffer_size cannot be zero.");

        self.buffer_size = max;
        self
    }

    /// Max header block size
    #[must_use]
    pub fn max_header_size(mut self, max: usize) -> Self {
        self.max_header_size = max;
        self
    }

    /// Disk-spill threshold
    #[must_use]
    pub fn spill_threshold(mut self, max: u64) -> Self {
        self.spill_threshold = max;
        self
    }

    /// Directory for spilled parts
    #[must_use]
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir.replace(dir.into());
        self
    }

    /// File name prefix of spilled parts
    #[must_use]
    pub fn temp_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.temp_prefix = prefix.into();
        self
    }

    /// Resolved directory for spilled parts
    #[must_use]
    pub fn spill_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Refill chunk size, never zero
    #[must_use]
    pub fn checked_buffer_size(&self) -> usize {
        self.buffer_size.max(1)
    }

    /// Check whether a header block of `len` bytes is too large
    #[must_use]
    pub fn checked_header_size(&self, len: usize) -> bool {
        len > self.max_header_size
    }

    /// Check whether a part starting with `remaining` body bytes left must spill
    #[must_use]
    pub fn checked_spill(&self, remaining: u64) -> bool {
        remaining > self.spill_threshold
    }
}
