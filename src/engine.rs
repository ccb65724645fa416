//! Engine Module
//!
//! The atom record engine layered over a mapped region.
//!
//! ## Responsibilities
//! - Translate slot indexes into byte offsets and bounds-check them
//! - Run the admission filter before every write
//! - Encode atoms in place in the mapped extent
//! - Hand out borrowed views for reads, treating bad magic as absence
//! - Refuse every operation after close

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::admission::{encode_score, AdmissionFilter, HarmonyFilter};
use crate::atom::{
    checksum, put_u64, Atom, AtomView, StrandsPolicy, WriteOptions, ATOM_SIZE, MAGIC,
    STRANDS_OFFSET,
};
use crate::config::Config;
use crate::error::{AtomError, Result};
use crate::storage::MappedRegion;

/// The atom record engine
///
/// ## Access Model
///
/// - **Writes** (`write_atom`, `close`) take `&mut self`
/// - **Reads** (`read_atom`, `iter_occupied`) take `&self` and return views
///   that borrow the mapping, so no view can outlive a write or a close
///
/// Cross-thread use goes through [`crate::SharedAtomEngine`].
pub struct AtomEngine {
    /// Engine configuration
    config: Config,

    /// Backing mapped extent
    region: MappedRegion,

    /// Number of 64-byte slots (fixed at open)
    capacity: u64,

    /// Admission policy applied to every write
    filter: Box<dyn AdmissionFilter>,
}

impl AtomEngine {
    /// Open or create an engine with the default harmony filter
    pub fn open(config: Config) -> Result<Self> {
        Self::open_with_filter(config, Box::new(HarmonyFilter))
    }

    /// Open or create an engine with a custom admission filter
    ///
    /// On startup:
    /// 1. Validate the requested size
    /// 2. Open/create and map the backing file
    /// 3. Derive capacity from the mapped length
    pub fn open_with_filter(config: Config, filter: Box<dyn AdmissionFilter>) -> Result<Self> {
        let size_bytes = config.validate()?;

        let region = MappedRegion::open_with_policy(&config.path, size_bytes, config.size_policy)?;
        let capacity = region.len() / ATOM_SIZE as u64;

        tracing::debug!(
            "Atom engine ready: path={}, capacity={}, strands={:?}",
            config.path.display(),
            capacity,
            config.strands_policy
        );

        Ok(Self {
            config,
            region,
            capacity,
            filter,
        })
    }

    /// Open with a path and a size in megabytes (convenience method)
    pub fn open_path(path: &Path, size_mb: u64) -> Result<Self> {
        let config = Config::builder().path(path).size_mb(size_mb).build();
        Self::open(config)
    }

    // =========================================================================
    // Record Operations
    // =========================================================================

    /// Write `payload` into slot `index` tagged with `schema`
    ///
    /// Returns `Ok(false)` if the admission filter rejects the payload; the
    /// slot is left untouched in that case.
    pub fn write_atom(&mut self, index: i64, payload: &[u8], schema: u16) -> Result<bool> {
        self.write_atom_with(index, payload, WriteOptions::new(schema))
    }

    /// Write with caller-supplied geo_hash/flags/strands
    ///
    /// Steps:
    /// 1. Bounds check
    /// 2. Admission filter
    /// 3. Encode all fields at `index * 64`
    /// 4. Seal strands (checksum policy only)
    pub fn write_atom_with(
        &mut self,
        index: i64,
        payload: &[u8],
        options: WriteOptions,
    ) -> Result<bool> {
        // Step 1: Bounds
        let offset = self.slot_offset(index)?;

        // Step 2: Admission
        let score = self.filter.score(payload);
        if !self.filter.admits(score) {
            tracing::debug!(
                "Rejected atom {}: score {:.3} < threshold {:.3}",
                index,
                score,
                self.filter.threshold()
            );
            return Ok(false);
        }

        let strands = match self.config.strands_policy {
            StrandsPolicy::Tag(tag) => options.strands.unwrap_or(tag),
            StrandsPolicy::Crc32 => 0,
        };

        let atom = Atom {
            magic: MAGIC,
            sequence_stamp: now_millis(),
            geo_hash: options.geo_hash.unwrap_or(self.config.default_geo_hash),
            schema: options.schema,
            harmony_score: encode_score(score),
            flags: options.flags.unwrap_or(self.config.default_flags),
            payload: Atom::fit_payload(payload),
            strands,
        };

        // Step 3: Encode in place
        let checksummed = self.config.strands_policy == StrandsPolicy::Crc32;
        let capacity = self.capacity;
        let slot = self
            .region
            .byte_range_mut()?
            .get_mut(offset..offset + ATOM_SIZE)
            .and_then(|bytes| <&mut [u8; ATOM_SIZE]>::try_from(bytes).ok())
            .ok_or(AtomError::IndexOutOfRange { index, capacity })?;
        atom.encode_into(slot);

        // Step 4: Seal
        if checksummed {
            let crc = checksum(slot);
            put_u64(slot, STRANDS_OFFSET, crc);
        }

        Ok(true)
    }

    /// Read slot `index`
    ///
    /// Returns:
    /// - `Ok(Some(view))`: occupied slot, view aliases the mapping
    /// - `Ok(None)`: empty slot, or corrupted (bad magic / bad checksum)
    pub fn read_atom(&self, index: i64) -> Result<Option<AtomView<'_>>> {
        let offset = self.slot_offset(index)?;
        let bytes = self
            .region
            .byte_range()?
            .get(offset..offset + ATOM_SIZE)
            .and_then(|bytes| <&[u8; ATOM_SIZE]>::try_from(bytes).ok())
            .ok_or(AtomError::IndexOutOfRange {
                index,
                capacity: self.capacity,
            })?;
        let view = AtomView::new(index as u64, bytes);

        if !self.is_valid(&view) {
            return Ok(None);
        }
        Ok(Some(view))
    }

    /// Whether slot `index` currently holds a valid atom
    pub fn is_occupied(&self, index: i64) -> Result<bool> {
        Ok(self.read_atom(index)?.is_some())
    }

    /// Iterate every valid atom in index order
    pub fn iter_occupied(&self) -> Result<impl Iterator<Item = AtomView<'_>> + '_> {
        let bytes = self.region.byte_range()?;
        Ok(bytes
            .chunks_exact(ATOM_SIZE)
            .filter_map(|slot| <&[u8; ATOM_SIZE]>::try_from(slot).ok())
            .enumerate()
            .map(|(i, slot)| AtomView::new(i as u64, slot))
            .filter(move |view| self.is_valid(view)))
    }

    /// Count valid atoms (full scan)
    pub fn occupied_count(&self) -> Result<u64> {
        Ok(self.iter_occupied()?.count() as u64)
    }

    /// Best-effort flush of dirty pages to the backing file
    pub fn flush(&self) -> Result<()> {
        self.region.flush()
    }

    /// Close the engine
    ///
    /// Releases the mapping and file handle. Idempotent; afterwards every
    /// other operation returns `EngineClosed`.
    pub fn close(&mut self) -> Result<()> {
        self.region.close()
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    /// Bounds-check `index` and return its byte offset
    fn slot_offset(&self, index: i64) -> Result<usize> {
        if self.region.is_closed() {
            return Err(AtomError::EngineClosed);
        }
        if index < 0 || index as u64 >= self.capacity {
            return Err(AtomError::IndexOutOfRange {
                index,
                capacity: self.capacity,
            });
        }
        Ok(index as usize * ATOM_SIZE)
    }

    fn is_valid(&self, view: &AtomView<'_>) -> bool {
        if !view.has_magic() {
            return false;
        }
        if self.config.strands_policy == StrandsPolicy::Crc32 && !view.checksum_matches() {
            tracing::warn!(
                "Atom {} in {} failed checksum, treating as absent",
                view.index(),
                self.config.path.display()
            );
            return false;
        }
        true
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of slots
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn is_closed(&self) -> bool {
        self.region.is_closed()
    }

    /// Get the backing file path
    pub fn path(&self) -> &Path {
        self.region.path()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the admission filter
    pub fn filter(&self) -> &dyn AdmissionFilter {
        self.filter.as_ref()
    }
}

/// Unix time in milliseconds (0 if the clock is before the epoch)
fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
