//! Configuration for atomstore
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::atom::StrandsPolicy;
use crate::error::{AtomError, Result};
use crate::storage::check_extent;

/// Bytes per megabyte, used to convert `size_mb` into an extent size
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Default geo hash stamped on atoms when the caller does not supply one
pub const DEFAULT_GEO_HASH: u64 = 0xCAFE_BABE;

/// Default flags stamped on atoms when the caller does not supply them
pub const DEFAULT_FLAGS: u16 = 0b10_1010;

/// Main configuration for an atomstore instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Backing file holding the concatenated atoms
    pub path: PathBuf,

    /// Requested extent size (must come to a positive multiple of 64 bytes)
    pub size: ExtentSize,

    /// How to treat an existing file whose size differs from `size`
    pub size_policy: SizePolicy,

    // -------------------------------------------------------------------------
    // Record Defaults
    // -------------------------------------------------------------------------
    /// What goes into the trailing strands field
    pub strands_policy: StrandsPolicy,

    /// geo_hash written when the caller gives none
    pub default_geo_hash: u64,

    /// flags written when the caller gives none
    pub default_flags: u16,
}

/// Requested extent size, kept in the unit the caller gave it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtentSize {
    Bytes(u64),
    Megabytes(u64),
}

/// Size handling for pre-existing backing files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizePolicy {
    /// Map the file at its on-disk size, warning on mismatch
    UseExisting,

    /// Fail construction if the on-disk size differs from the requested one
    Exact,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./atoms.zpa"),
            size: ExtentSize::Megabytes(100),
            size_policy: SizePolicy::UseExisting,
            strands_policy: StrandsPolicy::default(),
            default_geo_hash: DEFAULT_GEO_HASH,
            default_flags: DEFAULT_FLAGS,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Requested size in bytes
    ///
    /// Fails with `StorageInit` if a megabyte count does not fit in `u64`.
    pub fn size_bytes(&self) -> Result<u64> {
        match self.size {
            ExtentSize::Bytes(bytes) => Ok(bytes),
            ExtentSize::Megabytes(mb) => mb.checked_mul(BYTES_PER_MB).ok_or_else(|| {
                AtomError::storage_init(
                    &self.path,
                    format!("size of {} MB overflows a 64-bit byte count", mb),
                )
            }),
        }
    }

    /// Check the requested size before touching the filesystem
    ///
    /// Returns the size in bytes on success.
    pub fn validate(&self) -> Result<u64> {
        let size_bytes = self.size_bytes()?;
        check_extent(&self.path, size_bytes)?;
        Ok(size_bytes)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the backing file path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the extent size in bytes
    pub fn size_bytes(mut self, size: u64) -> Self {
        self.config.size = ExtentSize::Bytes(size);
        self
    }

    /// Set the extent size in megabytes
    pub fn size_mb(mut self, mb: u64) -> Self {
        self.config.size = ExtentSize::Megabytes(mb);
        self
    }

    /// Set the size policy for existing files
    pub fn size_policy(mut self, policy: SizePolicy) -> Self {
        self.config.size_policy = policy;
        self
    }

    /// Set the strands policy
    pub fn strands_policy(mut self, policy: StrandsPolicy) -> Self {
        self.config.strands_policy = policy;
        self
    }

    /// Set the default geo hash
    pub fn default_geo_hash(mut self, geo_hash: u64) -> Self {
        self.config.default_geo_hash = geo_hash;
        self
    }

    /// Set the default flags
    pub fn default_flags(mut self, flags: u16) -> Self {
        self.config.default_flags = flags;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
